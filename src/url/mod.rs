//! URL handling module for PhoneDB Miner
//!
//! This module provides link resolution against the site's base URL and the
//! query-string patterns the site encodes device ids and page offsets with.

mod params;
mod resolve;

use std::path::{Path, PathBuf};

// Re-export main functions
pub use params::{extract_device_id, extract_result_offset, has_result_offset};
pub use resolve::resolve_site_link;

/// Returns the collection file path for a brand inside `dir`
///
/// Collections are keyed by the lowercased brand:
/// `{dir}/{brand-lowercase}_devices.json`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use phonedb_miner::url::brand_collection_path;
///
/// let path = brand_collection_path(Path::new("data/devices_list"), "Samsung");
/// assert_eq!(path, Path::new("data/devices_list/samsung_devices.json"));
/// ```
pub fn brand_collection_path(dir: &Path, brand: &str) -> PathBuf {
    dir.join(format!("{}_devices.json", brand.to_lowercase()))
}

/// Normalizes a brand name the way it is sent to the search form
///
/// First character uppercased, the rest lowercased ("sAMSUNG" -> "Samsung").
pub fn normalize_brand(brand: &str) -> String {
    let trimmed = brand.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
