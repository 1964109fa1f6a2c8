use crate::client::{CloudCall, QueryError};
use crate::model::{
    BlockDevice, Image, ImageId, Instance, InstanceState, LaunchTemplateDescriptor,
    LaunchTemplateVersion,
};
use aws_sdk_ec2::error::ProvideErrorMetadata;
use aws_sdk_ec2::types::{self as ec2_types, Filter};
use aws_sdk_ec2::Client as Ec2Client;
use tracing::debug;

const TEMPLATE_NOT_FOUND_CODES: [&str; 2] = [
    "InvalidLaunchTemplateName.NotFoundException",
    "InvalidLaunchTemplateId.NotFound",
];

pub async fn describe_images(
    client: &Ec2Client,
    owners: &[String],
) -> Result<Vec<Image>, QueryError> {
    let resp = client
        .describe_images()
        .set_owners(Some(owners.to_vec()))
        .send()
        .await
        .map_err(|e| QueryError::from_sdk(CloudCall::DescribeImages, e))?;

    let images: Vec<Image> = resp.images().iter().filter_map(image_from_sdk).collect();

    Ok(images)
}

pub async fn describe_instances(
    client: &Ec2Client,
    states: &[InstanceState],
) -> Result<Vec<Instance>, QueryError> {
    let resp = client
        .describe_instances()
        .filters(
            Filter::builder()
                .name("instance-state-name")
                .set_values(Some(states.iter().map(|s| s.as_str().to_string()).collect()))
                .build(),
        )
        .send()
        .await
        .map_err(|e| QueryError::from_sdk(CloudCall::DescribeInstances, e))?;

    let instances: Vec<Instance> = resp
        .reservations()
        .iter()
        .flat_map(|res| res.instances())
        .filter_map(instance_from_sdk)
        .collect();

    Ok(instances)
}

/// Lists the versions of a template. A template that no longer exists has no versions.
pub async fn describe_launch_template_versions(
    client: &Ec2Client,
    template_name: &str,
    version: Option<&str>,
) -> Result<Vec<LaunchTemplateVersion>, QueryError> {
    let mut req = client
        .describe_launch_template_versions()
        .launch_template_name(template_name);
    if let Some(v) = version {
        req = req.versions(v);
    }

    let resp = match req.send().await {
        Ok(resp) => resp,
        Err(e) if is_template_not_found(&e) => {
            debug!(template = template_name, "launch template not found");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(QueryError::from_sdk(
                CloudCall::DescribeLaunchTemplateVersions,
                e,
            ))
        }
    };

    let versions: Vec<LaunchTemplateVersion> = resp
        .launch_template_versions()
        .iter()
        .filter_map(template_version_from_sdk)
        .collect();

    Ok(versions)
}

/// Looks templates up through a name filter, so unknown names are simply
/// missing from the result instead of failing the whole request.
pub async fn describe_launch_templates(
    client: &Ec2Client,
    names: &[String],
) -> Result<Vec<LaunchTemplateDescriptor>, QueryError> {
    // An empty filter would list every template in the account.
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let resp = client
        .describe_launch_templates()
        .filters(
            Filter::builder()
                .name("launch-template-name")
                .set_values(Some(names.to_vec()))
                .build(),
        )
        .send()
        .await
        .map_err(|e| QueryError::from_sdk(CloudCall::DescribeLaunchTemplates, e))?;

    let templates: Vec<LaunchTemplateDescriptor> = resp
        .launch_templates()
        .iter()
        .filter_map(|lt| {
            Some(LaunchTemplateDescriptor {
                name: lt.launch_template_name()?.to_string(),
            })
        })
        .collect();

    Ok(templates)
}

fn is_template_not_found(err: &impl ProvideErrorMetadata) -> bool {
    err.code()
        .is_some_and(|code| TEMPLATE_NOT_FOUND_CODES.contains(&code))
}

fn image_from_sdk(image: &ec2_types::Image) -> Option<Image> {
    let id = ImageId::from_field(image.image_id())?;

    Some(Image {
        id,
        name: image.name().map(str::to_string),
        creation_date: image.creation_date().map(str::to_string),
        state: image.state().map(|s| s.as_str().to_string()),
        block_devices: image
            .block_device_mappings()
            .iter()
            .map(|mapping| BlockDevice {
                device_name: mapping.device_name().map(str::to_string),
                snapshot_id: mapping
                    .ebs()
                    .and_then(|ebs| ebs.snapshot_id())
                    .map(str::to_string),
            })
            .collect(),
        tags: image
            .tags()
            .iter()
            .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
            .collect(),
    })
}

fn instance_from_sdk(inst: &ec2_types::Instance) -> Option<Instance> {
    let state = match inst.state().and_then(|s| s.name())? {
        ec2_types::InstanceStateName::Pending => InstanceState::Pending,
        ec2_types::InstanceStateName::Running => InstanceState::Running,
        ec2_types::InstanceStateName::ShuttingDown => InstanceState::ShuttingDown,
        ec2_types::InstanceStateName::Terminated => InstanceState::Terminated,
        ec2_types::InstanceStateName::Stopping => InstanceState::Stopping,
        ec2_types::InstanceStateName::Stopped => InstanceState::Stopped,
        other => {
            debug!(state = other.as_str(), "skipping instance in unknown state");
            return None;
        }
    };

    Some(Instance {
        id: inst.instance_id().map(str::to_string),
        image_id: ImageId::from_field(inst.image_id()),
        state,
    })
}

fn template_version_from_sdk(
    version: &ec2_types::LaunchTemplateVersion,
) -> Option<LaunchTemplateVersion> {
    let Some(number) = version.version_number() else {
        debug!(
            template = version.launch_template_name().unwrap_or_default(),
            "skipping launch template version without a number"
        );
        return None;
    };

    Some(LaunchTemplateVersion {
        number,
        is_default: version.default_version().unwrap_or(false),
        image_id: ImageId::from_field(
            version
                .launch_template_data()
                .and_then(|data| data.image_id()),
        ),
    })
}
