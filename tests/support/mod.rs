//! In-memory account used in place of the AWS clients.

use async_trait::async_trait;
use parking_lot::Mutex;
use rustami::model::{
    AutoscalingGroup, Image, ImageId, Instance, InstanceState, LaunchConfig,
    LaunchTemplateDescriptor, LaunchTemplateRef, LaunchTemplateVersion,
};
use rustami::{CloudCall, CloudQuery, QueryError};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct FakeCloud {
    pub images: Vec<Image>,
    pub groups: Vec<AutoscalingGroup>,
    pub launch_configs: Vec<LaunchConfig>,
    pub templates: BTreeMap<String, Vec<LaunchTemplateVersion>>,
    pub instances: Vec<Instance>,
    pub fail_on: Option<CloudCall>,
    calls: Mutex<Vec<(CloudCall, String)>>,
}

#[allow(dead_code)]
impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, image: &str, state: InstanceState) -> Self {
        self.instances.push(Instance {
            id: Some(format!("i-{}", self.instances.len())),
            image_id: Some(ImageId::from(image)),
            state,
        });
        self
    }

    pub fn with_group(mut self, group: AutoscalingGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_launch_config(mut self, name: &str, image: &str) -> Self {
        self.launch_configs.push(LaunchConfig {
            name: name.to_string(),
            image_id: Some(ImageId::from(image)),
        });
        self
    }

    /// Versions as `(number, is_default, image)`.
    pub fn with_template(mut self, name: &str, versions: &[(i64, bool, &str)]) -> Self {
        self.templates.insert(
            name.to_string(),
            versions
                .iter()
                .map(|&(number, is_default, image)| LaunchTemplateVersion {
                    number,
                    is_default,
                    image_id: Some(ImageId::from(image)),
                })
                .collect(),
        );
        self
    }

    pub fn with_image(mut self, id: &str) -> Self {
        self.images.push(Image {
            id: ImageId::from(id),
            name: Some(format!("{id}-name")),
            creation_date: Some("2024-01-01T00:00:00.000Z".to_string()),
            state: Some("available".to_string()),
            block_devices: Vec::new(),
            tags: Vec::new(),
        });
        self
    }

    pub fn failing_on(mut self, call: CloudCall) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Calls made so far, with their arguments rendered for assertions.
    pub fn calls(&self) -> Vec<(CloudCall, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, call: CloudCall) -> usize {
        self.calls.lock().iter().filter(|(c, _)| *c == call).count()
    }

    fn record(&self, call: CloudCall, args: String) -> Result<(), QueryError> {
        self.calls.lock().push((call, args));
        if self.fail_on == Some(call) {
            return Err(QueryError::new(call, "Throttling: rate exceeded"));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudQuery for FakeCloud {
    async fn list_owned_images(&self, owners: &[String]) -> Result<Vec<Image>, QueryError> {
        self.record(CloudCall::DescribeImages, owners.join(","))?;
        Ok(self.images.clone())
    }

    async fn list_autoscaling_groups(&self) -> Result<Vec<AutoscalingGroup>, QueryError> {
        self.record(CloudCall::DescribeAutoScalingGroups, String::new())?;
        Ok(self.groups.clone())
    }

    async fn list_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfig>, QueryError> {
        self.record(CloudCall::DescribeLaunchConfigurations, names.join(","))?;
        Ok(self
            .launch_configs
            .iter()
            .filter(|lc| names.contains(&lc.name))
            .cloned()
            .collect())
    }

    async fn list_launch_template_versions(
        &self,
        template_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<LaunchTemplateVersion>, QueryError> {
        self.record(
            CloudCall::DescribeLaunchTemplateVersions,
            format!("{template_name}@{}", version.unwrap_or("*")),
        )?;
        Ok(self.templates.get(template_name).cloned().unwrap_or_default())
    }

    async fn list_launch_templates(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchTemplateDescriptor>, QueryError> {
        self.record(CloudCall::DescribeLaunchTemplates, names.join(","))?;
        Ok(names
            .iter()
            .filter(|name| self.templates.contains_key(*name))
            .map(|name| LaunchTemplateDescriptor { name: name.clone() })
            .collect())
    }

    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>, QueryError> {
        let rendered: Vec<&str> = states.iter().map(InstanceState::as_str).collect();
        self.record(CloudCall::DescribeInstances, rendered.join(","))?;
        Ok(self
            .instances
            .iter()
            .filter(|inst| states.contains(&inst.state))
            .cloned()
            .collect())
    }
}

#[allow(dead_code)]
pub fn config_group(name: &str, desired_capacity: i32, launch_config: &str) -> AutoscalingGroup {
    AutoscalingGroup {
        name: Some(name.to_string()),
        desired_capacity,
        launch_configuration_name: Some(launch_config.to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn template_group(
    name: &str,
    desired_capacity: i32,
    template: &str,
    version: Option<&str>,
) -> AutoscalingGroup {
    AutoscalingGroup {
        name: Some(name.to_string()),
        desired_capacity,
        launch_template: LaunchTemplateRef::from_fields(Some(template), version),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn mixed_policy_group(
    name: &str,
    desired_capacity: i32,
    template: &str,
    version: Option<&str>,
) -> AutoscalingGroup {
    AutoscalingGroup {
        name: Some(name.to_string()),
        desired_capacity,
        mixed_instances_template: LaunchTemplateRef::from_fields(Some(template), version),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn ids(values: &[&str]) -> Vec<ImageId> {
    values.iter().map(|v| ImageId::from(*v)).collect()
}
