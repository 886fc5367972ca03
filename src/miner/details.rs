//! Device detail miner - visits each listed device's page
//!
//! The input is a summary collection produced by the list miner (or any file
//! of the same shape). Details are accumulated in memory, saved every few
//! successes, and saved once more at the end of the run.

use crate::config::MinerConfig;
use crate::miner::client::SiteClient;
use crate::miner::scheduler::Pacer;
use crate::state::DetailRunReport;
use crate::storage::{DeviceDetail, DeviceSummary, IdIndex, JsonCollection};
use crate::url::brand_collection_path;
use crate::{MinerError, Result};
use std::path::{Path, PathBuf};

/// Where the device summaries of a detail run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceListSource {
    /// `{brand}_devices.json` inside this summary directory
    BrandList(PathBuf),

    /// An explicit file, used whatever the brand
    File(PathBuf),
}

impl DeviceListSource {
    /// Path of the collection the run reads
    pub fn path_for(&self, brand: &str) -> PathBuf {
        match self {
            Self::BrandList(dir) => brand_collection_path(dir, brand),
            Self::File(path) => path.clone(),
        }
    }

    /// Loads the summaries to visit
    ///
    /// A missing, unreadable, or empty list is [`MinerError::DeviceListUnavailable`].
    pub fn load(&self, brand: &str) -> Result<Vec<DeviceSummary>> {
        let path = self.path_for(brand);
        let unavailable = |reason: String| MinerError::DeviceListUnavailable {
            path: path.clone(),
            reason,
        };

        let devices: Vec<DeviceSummary> = JsonCollection::new(&path)
            .load()
            .map_err(|e| unavailable(e.to_string()))?;

        if devices.is_empty() {
            return Err(unavailable("the list has no devices".to_string()));
        }

        tracing::info!("Loaded {} devices from {}", devices.len(), path.display());
        Ok(devices)
    }
}

/// Collects detail records for a brand's devices
pub struct DeviceDetailMiner {
    client: SiteClient,
    pacer: Pacer,
    save_batch_size: usize,
}

impl DeviceDetailMiner {
    /// Creates a miner for the site in `config`
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let client = SiteClient::new(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a miner reusing an existing client
    pub fn with_client(client: SiteClient, config: &MinerConfig) -> Self {
        Self {
            client,
            pacer: Pacer::for_details(&config.pacing),
            save_batch_size: config.details.save_batch_size.max(1),
        }
    }

    /// Fetches details for the devices in `source` and stores them under `output_dir`
    ///
    /// # Arguments
    ///
    /// * `brand` - Brand the details are filed under
    /// * `max_devices` - Only the first `max_devices` listed devices are considered
    /// * `update_mode` - Keep existing details and skip devices that already have one
    /// * `output_dir` - Directory of the detail collections; must exist
    /// * `source` - Where the device summaries come from
    ///
    /// # Returns
    ///
    /// * `Ok(DetailRunReport)` - The run finished; individual failures are counted
    /// * `Err(MinerError::DeviceListUnavailable)` - No devices to visit
    /// * `Err(MinerError)` - The detail collection could not be written
    pub async fn run(
        &self,
        brand: &str,
        max_devices: Option<usize>,
        update_mode: bool,
        output_dir: &Path,
        source: &DeviceListSource,
    ) -> Result<DetailRunReport> {
        tracing::info!("Starting to scrape detailed information for {} devices", brand);

        let mut devices = source.load(brand)?;
        let collection = JsonCollection::new(brand_collection_path(output_dir, brand));

        let mut details: Vec<DeviceDetail> = if update_mode {
            tracing::info!("Update mode: only devices without details will be scraped");
            load_existing_details(&collection)
        } else {
            Vec::new()
        };
        let mut known = IdIndex::from_records(&details);

        if let Some(max) = max_devices {
            if max < devices.len() {
                tracing::info!("Limiting scraping to {} devices out of {}", max, devices.len());
                devices.truncate(max);
            }
        }

        let mut report = DetailRunReport {
            brand: brand.to_string(),
            update_mode,
            processed: devices.len(),
            ..DetailRunReport::default()
        };

        let total = devices.len();
        let mut requested_any = false;

        for (i, device) in devices.iter().enumerate() {
            let position = i + 1;

            if let Some(id) = device.id.as_deref() {
                if known.contains(id) {
                    tracing::info!(
                        "Skipping device {}/{}: {} (ID: {}) - already collected",
                        position,
                        total,
                        device.name,
                        id
                    );
                    report.skipped += 1;
                    continue;
                }
            }

            let Some(url) = device.url.as_deref() else {
                tracing::warn!("Device {} has no URL", device.name);
                report.failed += 1;
                continue;
            };

            if requested_any {
                let delay = self.pacer.pause().await;
                tracing::debug!("Waited {:?} before next device", delay);
            }
            requested_any = true;

            tracing::info!("Processing device {}/{}: {}", position, total, device.name);

            let Some(detail) = self.client.fetch_detail(url, device).await else {
                tracing::warn!("Failed to fetch device details from {}", url);
                report.failed += 1;
                continue;
            };

            if let Some(id) = detail.id.as_deref() {
                known.insert(id);
            }
            details.push(detail);
            report.succeeded += 1;

            if report.succeeded % self.save_batch_size == 0 {
                tracing::info!(
                    "Reached {} processed devices, saving partial results",
                    report.succeeded
                );
                collection.save(&details)?;
                report.partial_saves += 1;
            }
        }

        if details.is_empty() {
            tracing::info!("No device details to save for {}", brand);
        } else {
            collection.save(&details)?;
            tracing::info!(
                "Saved {} detailed devices to {}",
                details.len(),
                collection.path().display()
            );
        }
        report.stored = details.len();

        tracing::info!(
            "Successfully processed {} of {} devices ({} skipped, {} failed)",
            report.succeeded,
            report.processed,
            report.skipped,
            report.failed
        );
        Ok(report)
    }
}

/// Existing details of an update run; unreadable files yield an empty baseline
fn load_existing_details(collection: &JsonCollection) -> Vec<DeviceDetail> {
    match collection.load_if_exists() {
        Ok(Some(existing)) => {
            tracing::info!("Loaded {} existing device details", existing.len());
            existing
        }
        Ok(None) => {
            tracing::info!("No existing details at {}", collection.path().display());
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Error loading existing details: {}; starting empty", e);
            Vec::new()
        }
    }
}

/// Collects detail records for `brand` into `output_dir`
///
/// Convenience wrapper building a [`DeviceDetailMiner`] for one run.
pub async fn scrape_brand_device_details(
    brand: &str,
    max_devices: Option<usize>,
    update_mode: bool,
    output_dir: &Path,
    source: &DeviceListSource,
    config: &MinerConfig,
) -> Result<DetailRunReport> {
    DeviceDetailMiner::new(config)?
        .run(brand, max_devices, update_mode, output_dir, source)
        .await
}
