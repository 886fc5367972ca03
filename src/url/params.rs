use regex::Regex;
use std::sync::LazyLock;

static DEVICE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"id=(\d+)").expect("device id pattern is valid"));

static RESULT_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"result_lower_limit=(\d+)").expect("result offset pattern is valid")
});

/// Extracts the numeric device identifier from a detail-page URL
///
/// The first `id=<digits>` occurrence wins; URLs without one yield None.
///
/// # Examples
///
/// ```
/// use phonedb_miner::url::extract_device_id;
///
/// let url = "https://phonedb.net/index.php?m=device&id=21337&c=samsung_galaxy";
/// assert_eq!(extract_device_id(url), Some("21337".to_string()));
/// assert_eq!(extract_device_id("https://phonedb.net/"), None);
/// ```
pub fn extract_device_id(url: &str) -> Option<String> {
    DEVICE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts the `result_lower_limit` offset from a pagination link
pub fn extract_result_offset(href: &str) -> Option<usize> {
    RESULT_OFFSET
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether an href carries a `result_lower_limit` offset at all
pub fn has_result_offset(href: &str) -> bool {
    RESULT_OFFSET.is_match(href)
}
