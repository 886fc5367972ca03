//! Site client: one place that knows how PhoneDB pages are requested

use crate::config::{MinerConfig, RetryConfig, SiteConfig};
use crate::miner::fetcher::{build_http_client, fetch_with_retry, PageRequest};
use crate::miner::form::search_form;
use crate::miner::parser::{parse_detail_page, parse_list_page, ListPage};
use crate::storage::{DeviceDetail, DeviceSummary};
use crate::{ConfigError, Result};
use chrono::Local;
use reqwest::Client;
use url::Url;

/// Timestamp format of `scraped_date`
pub const SCRAPED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// HTTP access to the search form and detail pages, with retries applied
#[derive(Debug, Clone)]
pub struct SiteClient {
    client: Client,
    site: SiteConfig,
    retry: RetryConfig,
    base_url: Url,
    search_url: Url,
    origin: String,
}

impl SiteClient {
    /// Builds the client for the site described by `config`
    ///
    /// # Returns
    ///
    /// * `Ok(SiteClient)` - Ready to send requests
    /// * `Err(MinerError)` - The base URL or search path is invalid, or the HTTP client failed to build
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;
        let search_url = base_url.join(&config.site.search_path)?;
        let origin = base_url.origin().ascii_serialization();
        let client = build_http_client(&config.site)?;

        Ok(Self {
            client,
            site: config.site.clone(),
            retry: config.retry.clone(),
            base_url,
            search_url,
            origin,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Fetches and extracts page `page` (zero-based) of `brand`'s search results
    ///
    /// `None` means every attempt failed.
    pub async fn fetch_list_page(&self, brand: &str, page: usize) -> Option<ListPage> {
        let form = search_form(brand, page, &self.site, Local::now().date_naive());
        let request = PageRequest::PostForm {
            url: self.search_url.to_string(),
            form,
            origin: self.origin.clone(),
            referer: self.search_url.to_string(),
        };

        let fetched = fetch_with_retry(&self.client, &request, &self.retry).await?;
        Some(parse_list_page(
            &fetched.body,
            brand,
            &self.base_url,
            self.site.results_per_page,
        ))
    }

    /// Fetches and extracts the detail page at `url` for `device`
    ///
    /// The record takes its id, name, and brand from the summary rather than
    /// from the page.
    pub async fn fetch_detail(&self, url: &str, device: &DeviceSummary) -> Option<DeviceDetail> {
        let request = PageRequest::Get {
            url: url.to_string(),
        };
        let fetched = fetch_with_retry(&self.client, &request, &self.retry).await?;
        if fetched.final_url != url {
            tracing::debug!("Detail page {} redirected to {}", url, fetched.final_url);
        }

        let scraped_date = Local::now().format(SCRAPED_DATE_FORMAT).to_string();
        let mut detail = parse_detail_page(
            &fetched.body,
            url,
            device.id.as_deref(),
            &self.base_url,
            &scraped_date,
        );
        detail.name = Some(device.name.clone());
        detail.brand = Some(device.brand.clone());
        Some(detail)
    }
}
