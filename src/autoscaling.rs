use crate::client::{CloudCall, QueryError};
use crate::model::{AutoscalingGroup, ImageId, LaunchConfig, LaunchTemplateRef};
use aws_sdk_autoscaling::types as asg_types;
use aws_sdk_autoscaling::Client as AutoscalingClient;

pub async fn describe_groups(
    client: &AutoscalingClient,
) -> Result<Vec<AutoscalingGroup>, QueryError> {
    let resp = client
        .describe_auto_scaling_groups()
        .send()
        .await
        .map_err(|e| QueryError::from_sdk(CloudCall::DescribeAutoScalingGroups, e))?;

    let groups: Vec<AutoscalingGroup> = resp
        .auto_scaling_groups()
        .iter()
        .map(group_from_sdk)
        .collect();

    Ok(groups)
}

pub async fn describe_launch_configurations(
    client: &AutoscalingClient,
    names: &[String],
) -> Result<Vec<LaunchConfig>, QueryError> {
    // An empty name list would return every launch configuration in the account.
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let resp = client
        .describe_launch_configurations()
        .set_launch_configuration_names(Some(names.to_vec()))
        .send()
        .await
        .map_err(|e| QueryError::from_sdk(CloudCall::DescribeLaunchConfigurations, e))?;

    let configs: Vec<LaunchConfig> = resp
        .launch_configurations()
        .iter()
        .filter_map(|lc| {
            Some(LaunchConfig {
                name: lc.launch_configuration_name()?.to_string(),
                image_id: ImageId::from_field(lc.image_id()),
            })
        })
        .collect();

    Ok(configs)
}

fn group_from_sdk(group: &asg_types::AutoScalingGroup) -> AutoscalingGroup {
    let mixed_spec = group
        .mixed_instances_policy()
        .and_then(|policy| policy.launch_template())
        .and_then(|lt| lt.launch_template_specification());

    AutoscalingGroup {
        name: group.auto_scaling_group_name().map(str::to_string),
        desired_capacity: group.desired_capacity().unwrap_or(0),
        launch_configuration_name: group.launch_configuration_name().map(str::to_string),
        launch_template: group.launch_template().and_then(template_ref_from_sdk),
        mixed_instances_template: mixed_spec.and_then(template_ref_from_sdk),
    }
}

fn template_ref_from_sdk(
    spec: &asg_types::LaunchTemplateSpecification,
) -> Option<LaunchTemplateRef> {
    LaunchTemplateRef::from_fields(spec.launch_template_name(), spec.version())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, version: Option<&str>) -> asg_types::LaunchTemplateSpecification {
        asg_types::LaunchTemplateSpecification::builder()
            .launch_template_name(name)
            .set_version(version.map(str::to_string))
            .build()
    }

    fn mixed_policy(
        spec: asg_types::LaunchTemplateSpecification,
    ) -> asg_types::MixedInstancesPolicy {
        asg_types::MixedInstancesPolicy::builder()
            .launch_template(
                asg_types::LaunchTemplate::builder()
                    .launch_template_specification(spec)
                    .build(),
            )
            .build()
    }

    #[test]
    fn direct_template_is_read() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("web")
            .desired_capacity(2)
            .launch_template(spec("web-lt", Some("$Default")))
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.name.as_deref(), Some("web"));
        assert_eq!(group.desired_capacity, 2);
        assert_eq!(
            group.launch_template,
            Some(LaunchTemplateRef {
                name: "web-lt".to_string(),
                version: Some("$Default".to_string()),
            })
        );
        assert_eq!(group.mixed_instances_template, None);
        assert_eq!(group.launch_configuration_name, None);
    }

    #[test]
    fn mixed_policy_template_is_read_from_its_nested_spec() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("spot")
            .desired_capacity(0)
            .mixed_instances_policy(mixed_policy(spec("spot-lt", Some("7"))))
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.launch_template, None);
        assert_eq!(
            group.mixed_instances_template,
            Some(LaunchTemplateRef {
                name: "spot-lt".to_string(),
                version: Some("7".to_string()),
            })
        );
        assert!(group.is_zero_capacity());
    }

    #[test]
    fn launch_configuration_name_is_read() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("legacy")
            .desired_capacity(1)
            .launch_configuration_name("legacy-lc")
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.launch_config_name(), Some("legacy-lc"));
        assert_eq!(group.template_refs().count(), 0);
    }

    #[test]
    fn empty_template_names_become_absent() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("half-migrated")
            .desired_capacity(1)
            .launch_template(spec("", Some("1")))
            .mixed_instances_policy(mixed_policy(spec("", None)))
            .launch_configuration_name("")
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.launch_template, None);
        assert_eq!(group.mixed_instances_template, None);
        assert_eq!(group.launch_config_name(), None);
    }

    #[test]
    fn group_without_references_carries_none() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("transitional")
            .desired_capacity(3)
            .mixed_instances_policy(asg_types::MixedInstancesPolicy::builder().build())
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.launch_template, None);
        assert_eq!(group.mixed_instances_template, None);
        assert_eq!(group.launch_configuration_name, None);
    }

    #[test]
    fn missing_desired_capacity_counts_as_zero() {
        let sdk = asg_types::AutoScalingGroup::builder()
            .auto_scaling_group_name("unknown-size")
            .launch_configuration_name("batch-lc")
            .build();

        let group = group_from_sdk(&sdk);

        assert_eq!(group.desired_capacity, 0);
        assert!(group.is_zero_capacity());
    }
}
