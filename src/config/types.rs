use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for PhoneDB Miner
///
/// Every section falls back to its defaults, so an empty TOML file (or no
/// file at all) yields the settings the miner was tuned with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinerConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub details: DetailsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin every relative link on the site resolves against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path (relative to base-url) of the device search form
    #[serde(rename = "search-path")]
    pub search_path: String,

    /// Number of devices the search form returns per page
    #[serde(rename = "results-per-page")]
    pub results_per_page: usize,

    /// Whether to verify TLS certificates
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Only devices released within this many days are searched
    #[serde(rename = "released-window-days")]
    pub released_window_days: i64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://phonedb.net/".to_string(),
            search_path: "index.php?m=device&s=query".to_string(),
            results_per_page: 29,
            verify_tls: false,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            request_timeout_secs: 30,
            released_window_days: 5 * 365,
        }
    }
}

/// Retry behaviour of the transport
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt; doubles with every further failure
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// Delay to wait after the given failed attempt (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Randomized delays between outbound requests (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(rename = "list-min-delay-ms")]
    pub list_min_delay_ms: u64,

    #[serde(rename = "list-max-delay-ms")]
    pub list_max_delay_ms: u64,

    #[serde(rename = "detail-min-delay-ms")]
    pub detail_min_delay_ms: u64,

    #[serde(rename = "detail-max-delay-ms")]
    pub detail_max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            list_min_delay_ms: 1000,
            list_max_delay_ms: 3000,
            detail_min_delay_ms: 500,
            detail_max_delay_ms: 800,
        }
    }
}

impl PacingConfig {
    /// Pacing with no delays at all
    pub fn none() -> Self {
        Self {
            list_min_delay_ms: 0,
            list_max_delay_ms: 0,
            detail_min_delay_ms: 0,
            detail_max_delay_ms: 0,
        }
    }
}

/// Pagination driver limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Consecutive empty pages tolerated before giving up
    #[serde(rename = "max-empty-pages")]
    pub max_empty_pages: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { max_empty_pages: 3 }
    }
}

/// Detail driver settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Successful fetches between two partial saves
    #[serde(rename = "save-batch-size")]
    pub save_batch_size: usize,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self { save_batch_size: 10 }
    }
}

/// Output layout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for all collections
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,

    /// Directory name (under data-dir) of the device summary collections
    #[serde(rename = "devices-list-dir")]
    pub devices_list_dir: String,

    /// Directory name (under data-dir) of the device detail collections
    #[serde(rename = "device-detail-dir")]
    pub device_detail_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            devices_list_dir: "devices_list".to_string(),
            device_detail_dir: "device_detail_list".to_string(),
        }
    }
}

impl OutputConfig {
    /// Directory holding `{brand}_devices.json` summary collections
    pub fn devices_list_path(&self) -> PathBuf {
        self.data_dir.join(&self.devices_list_dir)
    }

    /// Directory holding `{brand}_devices.json` detail collections
    pub fn device_detail_path(&self) -> PathBuf {
        self.data_dir.join(&self.device_detail_dir)
    }
}
