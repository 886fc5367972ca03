//! Storage module for persisting collected devices
//!
//! This module handles everything that touches the collection files:
//! - The record types written to disk (device summaries and details)
//! - Loading, atomically rewriting, and removing JSON collections
//! - Dedup-by-id merging of new batches into existing collections
//! - Preparing the output directory layout

mod json;
mod merge;
mod traits;

pub use json::JsonCollection;
pub use merge::{merge_new, IdIndex, Unkeyed};
pub use traits::{Keyed, StorageError, StorageResult};

use crate::config::OutputConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A device as listed on a search result page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Site-assigned numeric identifier, parsed from the detail URL
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Absolute detail-page URL
    #[serde(default)]
    pub url: Option<String>,
    /// The brand the search was run for
    #[serde(default)]
    pub brand: String,
}

impl Keyed for DeviceSummary {
    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Field names of [`DeviceDetail`] that page attributes may not overwrite
pub const RESERVED_DETAIL_FIELDS: &[&str] = &[
    "id",
    "url",
    "name",
    "brand",
    "scraped_date",
    "full_name",
    "images",
];

/// Everything scraped from one device's detail page
///
/// Alongside the fixed fields, every labelled row of the page's spec tables
/// lands in `attributes`, which is flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDetail {
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Local time of extraction, `%Y-%m-%d %H:%M:%S`
    pub scraped_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl Keyed for DeviceDetail {
    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Creates the data directory and both collection directories
///
/// Called once by the entry point before any driver runs; the drivers never
/// create directories themselves.
pub fn prepare_output_dirs(output: &OutputConfig) -> StorageResult<()> {
    ensure_dir(&output.data_dir)?;
    ensure_dir(&output.devices_list_path())?;
    ensure_dir(&output.device_detail_path())?;
    Ok(())
}

/// Creates `path` (and parents) if missing, returning whether it was created
pub fn ensure_dir(path: &Path) -> StorageResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }

    std::fs::create_dir_all(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Created directory: {}", path.display());
    Ok(true)
}
