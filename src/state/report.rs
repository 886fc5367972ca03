//! Outcome counters for listing and detail runs

use crate::state::StopReason;

/// Outcome of one listing (pagination) run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRunReport {
    pub brand: String,

    /// Whether the run merged into an existing collection
    pub update_mode: bool,

    /// Summaries seen across all pages, duplicates included
    pub collected: usize,

    /// Summaries added to the collection by this run
    pub new_devices: usize,

    /// Records in the collection file when the run ended
    pub stored: usize,

    /// Pages requested, empty ones included
    pub pages_fetched: usize,

    /// Final total estimate
    pub estimate: usize,

    pub stop_reason: StopReason,
}

impl ListRunReport {
    /// Headline device count of the run
    ///
    /// In update mode this is the number of distinct known devices; in a full
    /// rebuild it is the number of summaries collected.
    pub fn total(&self) -> usize {
        if self.update_mode {
            self.stored
        } else {
            self.collected
        }
    }
}

/// Outcome of one detail-collection run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRunReport {
    pub brand: String,

    pub update_mode: bool,

    /// Devices in the (capped) input list
    pub processed: usize,

    /// Details fetched and extracted by this run
    pub succeeded: usize,

    /// Devices skipped because a detail record already existed
    pub skipped: usize,

    /// Devices whose detail page could not be fetched
    pub failed: usize,

    /// Records in the detail collection after the final save
    pub stored: usize,

    /// Partial saves performed during the run
    pub partial_saves: usize,
}
