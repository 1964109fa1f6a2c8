use crate::model::{
    AutoscalingGroup, Image, Instance, InstanceState, LaunchConfig, LaunchTemplateDescriptor,
    LaunchTemplateVersion,
};
use async_trait::async_trait;
use aws_sdk_autoscaling::Client as AutoscalingClient;
use aws_sdk_ec2::Client as Ec2Client;
use aws_types::SdkConfig;
use std::fmt;

/// Cloud API calls made while collecting image usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudCall {
    DescribeImages,
    DescribeAutoScalingGroups,
    DescribeLaunchConfigurations,
    DescribeLaunchTemplateVersions,
    DescribeLaunchTemplates,
    DescribeInstances,
}

impl fmt::Display for CloudCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudCall::DescribeImages => "DescribeImages",
            CloudCall::DescribeAutoScalingGroups => "DescribeAutoScalingGroups",
            CloudCall::DescribeLaunchConfigurations => "DescribeLaunchConfigurations",
            CloudCall::DescribeLaunchTemplateVersions => "DescribeLaunchTemplateVersions",
            CloudCall::DescribeLaunchTemplates => "DescribeLaunchTemplates",
            CloudCall::DescribeInstances => "DescribeInstances",
        };
        f.write_str(name)
    }
}

/// A cloud call that failed after the client exhausted its retries.
#[derive(Debug, thiserror::Error)]
#[error("{call} failed: {message}")]
pub struct QueryError {
    pub call: CloudCall,
    pub message: String,
}

impl QueryError {
    pub fn new(call: CloudCall, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }

    /// Renders the full SDK error chain rather than the bare "service error".
    pub(crate) fn from_sdk<E: std::error::Error>(call: CloudCall, err: E) -> Self {
        Self::new(
            call,
            aws_sdk_ec2::error::DisplayErrorContext(err).to_string(),
        )
    }
}

/// Read-only queries the usage probes run against the account.
#[async_trait]
pub trait CloudQuery: Send + Sync {
    async fn list_owned_images(&self, owners: &[String]) -> Result<Vec<Image>, QueryError>;

    async fn list_autoscaling_groups(&self) -> Result<Vec<AutoscalingGroup>, QueryError>;

    async fn list_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfig>, QueryError>;

    async fn list_launch_template_versions(
        &self,
        template_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<LaunchTemplateVersion>, QueryError>;

    /// Existence check: names that do not exist are absent from the result.
    async fn list_launch_templates(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchTemplateDescriptor>, QueryError>;

    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>, QueryError>;
}

#[async_trait]
impl<T: CloudQuery + ?Sized> CloudQuery for &T {
    async fn list_owned_images(&self, owners: &[String]) -> Result<Vec<Image>, QueryError> {
        (**self).list_owned_images(owners).await
    }

    async fn list_autoscaling_groups(&self) -> Result<Vec<AutoscalingGroup>, QueryError> {
        (**self).list_autoscaling_groups().await
    }

    async fn list_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfig>, QueryError> {
        (**self).list_launch_configurations(names).await
    }

    async fn list_launch_template_versions(
        &self,
        template_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<LaunchTemplateVersion>, QueryError> {
        (**self)
            .list_launch_template_versions(template_name, version)
            .await
    }

    async fn list_launch_templates(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchTemplateDescriptor>, QueryError> {
        (**self).list_launch_templates(names).await
    }

    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>, QueryError> {
        (**self).list_instances(states).await
    }
}

/// `CloudQuery` backed by the AWS SDK EC2 and Auto Scaling clients.
#[derive(Debug, Clone)]
pub struct AwsCloud {
    ec2: Ec2Client,
    autoscaling: AutoscalingClient,
}

impl AwsCloud {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            ec2: Ec2Client::new(config),
            autoscaling: AutoscalingClient::new(config),
        }
    }
}

#[async_trait]
impl CloudQuery for AwsCloud {
    async fn list_owned_images(&self, owners: &[String]) -> Result<Vec<Image>, QueryError> {
        crate::ec2::describe_images(&self.ec2, owners).await
    }

    async fn list_autoscaling_groups(&self) -> Result<Vec<AutoscalingGroup>, QueryError> {
        crate::autoscaling::describe_groups(&self.autoscaling).await
    }

    async fn list_launch_configurations(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchConfig>, QueryError> {
        crate::autoscaling::describe_launch_configurations(&self.autoscaling, names).await
    }

    async fn list_launch_template_versions(
        &self,
        template_name: &str,
        version: Option<&str>,
    ) -> Result<Vec<LaunchTemplateVersion>, QueryError> {
        crate::ec2::describe_launch_template_versions(&self.ec2, template_name, version).await
    }

    async fn list_launch_templates(
        &self,
        names: &[String],
    ) -> Result<Vec<LaunchTemplateDescriptor>, QueryError> {
        crate::ec2::describe_launch_templates(&self.ec2, names).await
    }

    async fn list_instances(&self, states: &[InstanceState]) -> Result<Vec<Instance>, QueryError> {
        crate::ec2::describe_instances(&self.ec2, states).await
    }
}
