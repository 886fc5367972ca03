//! Miner module for fetching and extracting PhoneDB pages
//!
//! This module contains the scraping logic, including:
//! - HTTP fetching with retry logic and browser-like headers
//! - The device search form and the site client sending it
//! - HTML extraction of result pages and detail pages
//! - Request pacing
//! - The list (pagination) and detail drivers

mod client;
mod details;
mod fetcher;
mod form;
mod listing;
mod parser;
mod scheduler;

pub use client::{SiteClient, SCRAPED_DATE_FORMAT};
pub use details::{scrape_brand_device_details, DeviceDetailMiner, DeviceListSource};
pub use fetcher::{
    build_http_client, fetch_once, fetch_with_retry, FetchResult, FetchedPage, PageRequest,
};
pub use form::search_form;
pub use listing::{scrape_brand_devices, DeviceListMiner};
pub use parser::{normalize_field_label, parse_detail_page, parse_list_page, ListPage};
pub use scheduler::Pacer;
