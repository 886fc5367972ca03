//! Device list miner - pages through a brand's search results
//!
//! This module contains the pagination loop that:
//! - Loads the existing collection in update mode, or clears it for a rebuild
//! - Requests result pages one by one, pacing requests
//! - Folds each page's total estimate into the running one
//! - Persists new summaries after every page
//! - Decides when the results are exhausted

use crate::config::MinerConfig;
use crate::miner::client::SiteClient;
use crate::miner::parser::ListPage;
use crate::miner::scheduler::Pacer;
use crate::state::{ListRunReport, PageDecision, PaginationState};
use crate::storage::{merge_new, DeviceSummary, IdIndex, JsonCollection, Unkeyed};
use crate::url::brand_collection_path;
use crate::Result;
use std::path::Path;

/// Where new summaries go during a run
enum Sink {
    /// Update mode: the whole collection lives in memory and is rewritten
    /// whenever a page adds something
    Update {
        records: Vec<DeviceSummary>,
        index: IdIndex,
    },

    /// Full rebuild: every page is merged into the file on disk
    Rebuild { stored: usize },
}

/// Collects the device summaries of one brand
pub struct DeviceListMiner {
    client: SiteClient,
    pacer: Pacer,
    max_empty_pages: u32,
}

impl DeviceListMiner {
    /// Creates a miner for the site in `config`
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let client = SiteClient::new(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a miner reusing an existing client
    pub fn with_client(client: SiteClient, config: &MinerConfig) -> Self {
        Self {
            client,
            pacer: Pacer::for_listing(&config.pacing),
            max_empty_pages: config.pagination.max_empty_pages,
        }
    }

    /// Pages through `brand`'s results and stores them under `output_dir`
    ///
    /// # Arguments
    ///
    /// * `brand` - Brand exactly as sent to the search form
    /// * `update_mode` - Merge into the existing collection instead of rebuilding it
    /// * `output_dir` - Directory of the summary collections; must exist
    ///
    /// # Returns
    ///
    /// * `Ok(ListRunReport)` - The run finished, possibly with nothing collected
    /// * `Err(MinerError)` - The collection file could not be written
    pub async fn run(
        &self,
        brand: &str,
        update_mode: bool,
        output_dir: &Path,
    ) -> Result<ListRunReport> {
        tracing::info!("Starting to scrape all {} devices", brand);

        let collection = JsonCollection::new(brand_collection_path(output_dir, brand));
        let mut sink = self.open_sink(&collection, update_mode)?;
        let update_mode = matches!(sink, Sink::Update { .. });

        let mut state = PaginationState::new();
        let mut new_devices = 0;

        let stop_reason = loop {
            if state.pages_fetched() > 0 {
                let delay = self.pacer.pause().await;
                tracing::debug!("Waited {:?} before next page", delay);
            }

            let page_index = state.page();
            tracing::info!("Scraping {} - Page {}", brand, page_index + 1);

            let page = match self.client.fetch_list_page(brand, page_index).await {
                Some(page) => page,
                None => {
                    tracing::warn!(
                        "Could not fetch page {} for {}; treating it as empty",
                        page_index + 1,
                        brand
                    );
                    ListPage::default()
                }
            };

            state.revise_estimate(page.total_estimate);

            let decision = if page.devices.is_empty() {
                let decision = state.on_empty_page(self.max_empty_pages);
                tracing::info!(
                    "No devices found on page {}. Empty pages count: {}",
                    page_index + 1,
                    state.consecutive_empty()
                );
                decision
            } else {
                let count = page.devices.len();
                new_devices += store_page(&collection, &mut sink, page.devices)?;
                let decision = state.on_devices(count);
                tracing::info!(
                    "Collected {} devices from page {}. Total so far: {}",
                    count,
                    page_index + 1,
                    state.collected()
                );
                decision
            };

            match decision {
                PageDecision::Stop(reason) => break reason,
                PageDecision::Advance | PageDecision::RetryEmpty => {}
            }
        };

        let stored = match &sink {
            Sink::Update { records, .. } => records.len(),
            Sink::Rebuild { stored } => *stored,
        };

        let report = ListRunReport {
            brand: brand.to_string(),
            update_mode,
            collected: state.collected(),
            new_devices,
            stored,
            pages_fetched: state.pages_fetched(),
            estimate: state.estimate(),
            stop_reason,
        };

        tracing::info!(
            "Finished {} for {}: {} ({} devices)",
            if update_mode { "updating" } else { "scraping" },
            brand,
            stop_reason,
            report.total()
        );
        Ok(report)
    }

    /// Prepares the collection for the run
    ///
    /// An update whose existing file cannot be read falls back to a rebuild.
    fn open_sink(&self, collection: &JsonCollection, update_mode: bool) -> Result<Sink> {
        if update_mode {
            match collection.load_if_exists::<DeviceSummary>() {
                Ok(existing) => {
                    let records = existing.unwrap_or_default();
                    let index = IdIndex::from_records(&records);
                    tracing::info!("Loaded {} existing devices for updating", records.len());
                    return Ok(Sink::Update { records, index });
                }
                Err(e) => {
                    tracing::warn!("Error loading existing devices: {}; rebuilding", e);
                }
            }
        }

        if collection.remove()? {
            tracing::info!("Removed existing file {}", collection.path().display());
        }
        Ok(Sink::Rebuild { stored: 0 })
    }
}

/// Stores one non-empty page, returning how many summaries were new
fn store_page(
    collection: &JsonCollection,
    sink: &mut Sink,
    devices: Vec<DeviceSummary>,
) -> Result<usize> {
    match sink {
        Sink::Update { records, index } => {
            let added = merge_new(records, index, devices, Unkeyed::Drop);
            if added > 0 {
                collection.save(records)?;
                tracing::info!(
                    "Found {} new devices; file now holds {}",
                    added,
                    records.len()
                );
            }
            Ok(added)
        }
        Sink::Rebuild { stored } => {
            let before = *stored;
            *stored = collection.append_unique(devices)?;
            Ok(stored.saturating_sub(before))
        }
    }
}

/// Collects `brand`'s device summaries into `output_dir`
///
/// Convenience wrapper building a [`DeviceListMiner`] for one run.
pub async fn scrape_brand_devices(
    brand: &str,
    update_mode: bool,
    output_dir: &Path,
    config: &MinerConfig,
) -> Result<ListRunReport> {
    DeviceListMiner::new(config)?
        .run(brand, update_mode, output_dir)
        .await
}
