//! The probes that each find one kind of image usage.
//!
//! Every probe is read-only and independent of the others; the collector
//! unions their results.

use crate::client::{CloudQuery, QueryError};
use crate::model::{resolve_versions, AutoscalingGroup, ImageId, InstanceState};
use futures::future::try_join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Instances,
    LaunchConfigs,
    LaunchTemplates,
    ZeroCapacityConfigs,
    ZeroCapacityTemplates,
}

impl Probe {
    pub async fn collect<C: CloudQuery + ?Sized>(
        &self,
        client: &C,
    ) -> Result<BTreeSet<ImageId>, QueryError> {
        match self {
            Probe::Instances => instance_images(client).await,
            Probe::LaunchConfigs => launch_config_images(client).await,
            Probe::LaunchTemplates => launch_template_images(client).await,
            Probe::ZeroCapacityConfigs => zero_capacity_config_images(client).await,
            Probe::ZeroCapacityTemplates => zero_capacity_template_images(client).await,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Probe::Instances => "instances",
            Probe::LaunchConfigs => "launch configurations",
            Probe::LaunchTemplates => "launch templates",
            Probe::ZeroCapacityConfigs => "zero-capacity launch configurations",
            Probe::ZeroCapacityTemplates => "zero-capacity launch templates",
        };
        f.write_str(name)
    }
}

/// Images of every instance that is not terminated.
pub async fn instance_images<C: CloudQuery + ?Sized>(
    client: &C,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let instances = client
        .list_instances(&InstanceState::NOT_TERMINATED)
        .await?;

    let images: BTreeSet<ImageId> = instances
        .into_iter()
        .filter(|inst| inst.state != InstanceState::Terminated)
        .filter_map(|inst| inst.image_id)
        .collect();

    Ok(images)
}

/// Images of launch configurations attached to autoscaling groups.
pub async fn launch_config_images<C: CloudQuery + ?Sized>(
    client: &C,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let groups = client.list_autoscaling_groups().await?;
    images_for_configs(client, groups.iter()).await
}

/// Same as [`launch_config_images`], restricted to groups scaled to zero.
pub async fn zero_capacity_config_images<C: CloudQuery + ?Sized>(
    client: &C,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let groups = client.list_autoscaling_groups().await?;
    images_for_configs(client, groups.iter().filter(|g| g.is_zero_capacity())).await
}

async fn images_for_configs<'a, C: CloudQuery + ?Sized>(
    client: &C,
    groups: impl Iterator<Item = &'a AutoscalingGroup>,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let names: BTreeSet<String> = groups
        .filter_map(|g| g.launch_config_name())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Ok(BTreeSet::new());
    }

    let names: Vec<String> = names.into_iter().collect();
    let configs = client.list_launch_configurations(&names).await?;

    Ok(configs.into_iter().filter_map(|lc| lc.image_id).collect())
}

/// Images of the default and latest versions of every launch template
/// attached to a group, directly or through a mixed instances policy.
pub async fn launch_template_images<C: CloudQuery + ?Sized>(
    client: &C,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let groups = client.list_autoscaling_groups().await?;
    let names: BTreeSet<&str> = groups
        .iter()
        .flat_map(|g| g.template_refs())
        .map(|r| r.name.as_str())
        .collect();

    let per_template = try_join_all(
        names
            .into_iter()
            .map(|name| default_and_latest_images(client, name)),
    )
    .await?;

    Ok(per_template.into_iter().flatten().collect())
}

/// Images of every version of the templates referenced by groups scaled to
/// zero. Such a group may pin an old version that is neither default nor
/// latest, and versions are looked up by template name, so every version of
/// the template is kept.
pub async fn zero_capacity_template_images<C: CloudQuery + ?Sized>(
    client: &C,
) -> Result<BTreeSet<ImageId>, QueryError> {
    let groups = client.list_autoscaling_groups().await?;

    let mut pinned: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for reference in groups
        .iter()
        .filter(|g| g.is_zero_capacity())
        .flat_map(|g| g.template_refs())
    {
        let versions = pinned.entry(reference.name.as_str()).or_default();
        if let Some(version) = reference.version.as_deref() {
            versions.insert(version);
        }
    }
    if pinned.is_empty() {
        return Ok(BTreeSet::new());
    }

    let names: Vec<String> = pinned.keys().map(|name| name.to_string()).collect();
    let existing = client.list_launch_templates(&names).await?;
    let found: BTreeSet<&str> = existing
        .iter()
        .map(|t| t.name.as_str())
        .filter(|name| pinned.contains_key(name))
        .collect();
    for name in pinned.keys().filter(|name| !found.contains(*name)) {
        debug!(template = name, "referenced launch template does not exist");
    }

    let per_template = try_join_all(
        found
            .into_iter()
            .map(|name| all_version_images(client, name, pinned.get(name))),
    )
    .await?;

    Ok(per_template.into_iter().flatten().collect())
}

async fn default_and_latest_images<C: CloudQuery + ?Sized>(
    client: &C,
    name: &str,
) -> Result<Vec<ImageId>, QueryError> {
    let versions = client.list_launch_template_versions(name, None).await?;

    let Some(resolved) = resolve_versions(&versions) else {
        warn!(template = name, "launch template has no versions, skipping");
        return Ok(Vec::new());
    };
    match resolved.default_claims {
        0 => warn!(template = name, "launch template has no default version"),
        1 => {}
        claims => warn!(
            template = name,
            claims,
            "several versions flagged as default, using the first"
        ),
    }

    let ids: Vec<ImageId> = resolved.image_ids().cloned().collect();
    debug!(template = name, ?ids, "resolved launch template images");
    Ok(ids)
}

async fn all_version_images<C: CloudQuery + ?Sized>(
    client: &C,
    name: &str,
    pinned: Option<&BTreeSet<&str>>,
) -> Result<Vec<ImageId>, QueryError> {
    debug!(template = name, ?pinned, "fetching every template version");
    let versions = client.list_launch_template_versions(name, None).await?;
    if versions.is_empty() {
        warn!(template = name, "launch template has no versions, skipping");
    }

    Ok(versions.into_iter().filter_map(|v| v.image_id).collect())
}
