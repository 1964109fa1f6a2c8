use crate::client::CloudQuery;
use crate::error::{Error, Result};
use crate::model::{Image, ImageId, ProtectedImageSet};
use crate::probes::Probe;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Runs every usage probe against one account and unions what they find.
pub struct UsageCollector<C> {
    client: C,
}

impl<C: CloudQuery> UsageCollector<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn run(&self, probe: Probe) -> Result<BTreeSet<ImageId>> {
        let images = probe
            .collect(&self.client)
            .await
            .map_err(|source| Error::Probe { probe, source })?;
        debug!(%probe, count = images.len(), "probe finished");
        Ok(images)
    }

    /// Runs all probes concurrently. The first failure aborts the run, a
    /// partial set is never returned.
    pub async fn collect_all(&self) -> Result<ProtectedImageSet> {
        let (instances, configs, templates, zero_configs, zero_templates) = futures::try_join!(
            self.run(Probe::Instances),
            self.run(Probe::LaunchConfigs),
            self.run(Probe::LaunchTemplates),
            self.run(Probe::ZeroCapacityConfigs),
            self.run(Probe::ZeroCapacityTemplates),
        )?;

        let protected = union([instances, configs, templates, zero_configs, zero_templates]);
        info!(count = protected.len(), "collected protected images");
        Ok(protected)
    }
}

/// Merges probe results into one deduplicated set.
pub fn union<I>(results: I) -> ProtectedImageSet
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = ImageId>,
{
    results.into_iter().flatten().collect()
}

/// Every image owned by the account, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ImageInventory {
    images: BTreeMap<ImageId, Image>,
}

impl ImageInventory {
    pub async fn list_owned_images<C: CloudQuery + ?Sized>(
        client: &C,
        owners: &[String],
    ) -> Result<Self> {
        let images = client
            .list_owned_images(owners)
            .await
            .map_err(Error::Inventory)?;
        info!(count = images.len(), "listed owned images");

        Ok(images.into_iter().collect())
    }

    /// Images nothing references any more, the candidates for cleanup.
    pub fn unused<'a>(&'a self, protected: &'a ProtectedImageSet) -> impl Iterator<Item = &'a Image> {
        self.images
            .values()
            .filter(move |image| !protected.contains(&image.id))
    }
}

impl FromIterator<Image> for ImageInventory {
    fn from_iter<I: IntoIterator<Item = Image>>(iter: I) -> Self {
        Self {
            images: iter
                .into_iter()
                .map(|image| (image.id.clone(), image))
                .collect(),
        }
    }
}
