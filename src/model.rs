use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque AMI identifier, e.g. `ami-0abc1234`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds an id from an optional API field, treating empty strings as absent.
    pub fn from_field(value: Option<&str>) -> Option<Self> {
        non_empty(value).map(Self::new)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDevice {
    pub device_name: Option<String>,
    pub snapshot_id: Option<String>,
}

/// An image owned by the account, with the metadata the cleanup stage needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub id: ImageId,
    pub name: Option<String>,
    pub creation_date: Option<String>,
    pub state: Option<String>,
    pub block_devices: Vec<BlockDevice>,
    pub tags: Vec<(String, String)>,
}

impl Image {
    pub fn snapshot_ids(&self) -> impl Iterator<Item = &str> {
        self.block_devices
            .iter()
            .filter_map(|device| device.snapshot_id.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
}

impl InstanceState {
    /// Every lifecycle state except fully terminated.
    pub const NOT_TERMINATED: [InstanceState; 5] = [
        InstanceState::Pending,
        InstanceState::Running,
        InstanceState::ShuttingDown,
        InstanceState::Stopping,
        InstanceState::Stopped,
    ];

    /// Name used by the `instance-state-name` filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: Option<String>,
    pub image_id: Option<ImageId>,
    pub state: InstanceState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplateRef {
    pub name: String,
    pub version: Option<String>,
}

impl LaunchTemplateRef {
    /// Returns `None` when the reference carries no usable name.
    pub fn from_fields(name: Option<&str>, version: Option<&str>) -> Option<Self> {
        Some(Self {
            name: non_empty(name)?.to_string(),
            version: non_empty(version).map(str::to_string),
        })
    }
}

/// Autoscaling group as returned by the API. All references are optional
/// since a group is backed by a launch configuration, a launch template or a
/// mixed instances policy, and transitional records may carry none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoscalingGroup {
    pub name: Option<String>,
    pub desired_capacity: i32,
    pub launch_configuration_name: Option<String>,
    pub launch_template: Option<LaunchTemplateRef>,
    pub mixed_instances_template: Option<LaunchTemplateRef>,
}

impl AutoscalingGroup {
    pub fn is_zero_capacity(&self) -> bool {
        self.desired_capacity == 0
    }

    pub fn launch_config_name(&self) -> Option<&str> {
        non_empty(self.launch_configuration_name.as_deref())
    }

    /// Both the direct template and the mixed instances policy template.
    pub fn template_refs(&self) -> impl Iterator<Item = &LaunchTemplateRef> {
        self.launch_template
            .iter()
            .chain(self.mixed_instances_template.iter())
            .filter(|reference| !reference.name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub name: String,
    pub image_id: Option<ImageId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplateDescriptor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplateVersion {
    pub number: i64,
    pub is_default: bool,
    pub image_id: Option<ImageId>,
}

/// The versions of one template that count as in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersions<'a> {
    pub latest: &'a LaunchTemplateVersion,
    pub default: Option<&'a LaunchTemplateVersion>,
    /// Number of versions claiming to be the default.
    pub default_claims: usize,
}

impl<'a> ResolvedVersions<'a> {
    pub fn image_ids(&self) -> impl Iterator<Item = &'a ImageId> + 'a {
        std::iter::once(self.latest)
            .chain(self.default)
            .filter_map(|version| version.image_id.as_ref())
    }
}

/// Picks the latest version by number and the first version flagged default,
/// independent of the order the API returned them in.
pub fn resolve_versions(versions: &[LaunchTemplateVersion]) -> Option<ResolvedVersions<'_>> {
    let latest = versions.iter().max_by_key(|version| version.number)?;
    let mut defaults = versions.iter().filter(|version| version.is_default);
    let default = defaults.next();
    let default_claims = default.map_or(0, |_| 1 + defaults.count());

    Some(ResolvedVersions {
        latest,
        default,
        default_claims,
    })
}

/// Deduplicated set of image ids that must not be deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProtectedImageSet(BTreeSet<ImageId>);

impl ProtectedImageSet {
    pub fn contains(&self, id: &ImageId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageId> {
        self.0.iter()
    }
}

impl FromIterator<ImageId> for ProtectedImageSet {
    fn from_iter<I: IntoIterator<Item = ImageId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ProtectedImageSet {
    type Item = ImageId;
    type IntoIter = std::collections::btree_set::IntoIter<ImageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
