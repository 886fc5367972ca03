use crate::config::types::{
    DetailsConfig, MinerConfig, OutputConfig, PacingConfig, PaginationConfig, RetryConfig,
    SiteConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Longest release window accepted, about a century
const MAX_RELEASED_WINDOW_DAYS: i64 = 36_500;

/// Validates the entire configuration
pub fn validate(config: &MinerConfig) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_retry_config(&config.retry)?;
    validate_pacing_config(&config.pacing)?;
    validate_pagination_config(&config.pagination)?;
    validate_details_config(&config.details)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates target site configuration
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    base.join(&config.search_path).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid search-path '{}': {}", config.search_path, e))
    })?;

    if config.results_per_page < 1 {
        return Err(ConfigError::Validation(
            "results-per-page must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.released_window_days < 0 {
        return Err(ConfigError::Validation(format!(
            "released-window-days cannot be negative, got {}",
            config.released_window_days
        )));
    }

    if config.released_window_days > MAX_RELEASED_WINDOW_DAYS {
        return Err(ConfigError::Validation(format!(
            "released-window-days must be at most {}, got {}",
            MAX_RELEASED_WINDOW_DAYS, config.released_window_days
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> ConfigResult<()> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }
    Ok(())
}

/// Validates that both delay windows are well-formed
fn validate_pacing_config(config: &PacingConfig) -> ConfigResult<()> {
    validate_delay_window(
        "list",
        config.list_min_delay_ms,
        config.list_max_delay_ms,
    )?;
    validate_delay_window(
        "detail",
        config.detail_min_delay_ms,
        config.detail_max_delay_ms,
    )
}

fn validate_delay_window(name: &str, min: u64, max: u64) -> ConfigResult<()> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{name}-min-delay-ms ({min}) cannot exceed {name}-max-delay-ms ({max})"
        )));
    }
    Ok(())
}

fn validate_pagination_config(config: &PaginationConfig) -> ConfigResult<()> {
    if config.max_empty_pages < 1 {
        return Err(ConfigError::Validation(
            "max-empty-pages must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_details_config(config: &DetailsConfig) -> ConfigResult<()> {
    if config.save_batch_size < 1 {
        return Err(ConfigError::Validation(
            "save-batch-size must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    for (key, dir) in [
        ("devices-list-dir", &config.devices_list_dir),
        ("device-detail-dir", &config.device_detail_dir),
    ] {
        if dir.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    if config.devices_list_dir == config.device_detail_dir {
        return Err(ConfigError::Validation(format!(
            "devices-list-dir and device-detail-dir must differ, both are '{}'",
            config.devices_list_dir
        )));
    }

    Ok(())
}
