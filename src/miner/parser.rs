//! HTML parser for search result and device detail pages
//!
//! Both extractors are best effort: a missing element drops the value it
//! would have provided and never fails the page.

use crate::storage::{DeviceDetail, DeviceSummary, RESERVED_DETAIL_FIELDS};
use crate::url::{extract_device_id, extract_result_offset, has_result_offset, resolve_site_link};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

static RESULTS_MATCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+results match").expect("results pattern is valid"));

static RESULT_PAGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Result\s+Pages:").expect("pagination pattern is valid"));

/// Devices found on one search result page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Devices in page order; empty when the page has no device blocks
    pub devices: Vec<DeviceSummary>,

    /// Total number of results the page claims exist; 0 when unknown
    pub total_estimate: usize,
}

/// Parses a search result page
///
/// # Total Estimate
///
/// The "N results match" banner gives the first estimate. The pagination
/// widget ("Result Pages:") links to page offsets; when the last offset plus
/// one page of results exceeds the banner, that figure wins.
///
/// # Devices
///
/// Each `div.content_block_title` is one device. Its first link provides the
/// name and detail URL, and the URL's `id=<digits>` the identifier. A block
/// without a link still yields a device, with no URL and no id.
///
/// # Example
///
/// ```
/// use phonedb_miner::miner::parse_list_page;
/// use url::Url;
///
/// let html = r#"<div class="content_desc">1 results match</div>
///     <div class="content_block_title"><a href="index.php?m=device&id=7">Phone</a></div>"#;
/// let base = Url::parse("https://phonedb.net/").unwrap();
/// let page = parse_list_page(html, "Acme", &base, 29);
/// assert_eq!(page.total_estimate, 1);
/// assert_eq!(page.devices[0].id.as_deref(), Some("7"));
/// ```
pub fn parse_list_page(html: &str, brand: &str, base_url: &Url, page_size: usize) -> ListPage {
    let document = Html::parse_document(html);

    let mut total_estimate = extract_results_count(&document).unwrap_or(0);

    // An offset too large to add the page size to is garbage; skip the widget
    let from_widget =
        extract_last_page_offset(&document).and_then(|offset| offset.checked_add(page_size));
    if let Some(from_pagination) = from_widget {
        if from_pagination > total_estimate {
            tracing::debug!(
                "Pagination implies {} results, banner said {}",
                from_pagination,
                total_estimate
            );
            total_estimate = from_pagination;
        }
    }

    let devices = extract_devices(&document, brand, base_url);

    ListPage {
        devices,
        total_estimate,
    }
}

/// Reads the "N results match" banner
fn extract_results_count(document: &Html) -> Option<usize> {
    let selector = Selector::parse("div.content_desc").ok()?;
    let banner = document.select(&selector).next()?;
    let text = element_text(&banner);

    RESULTS_MATCH
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Finds the offset of the last page link in the "Result Pages:" widget
fn extract_last_page_offset(document: &Html) -> Option<usize> {
    let all = Selector::parse("*").ok()?;
    let links = Selector::parse("a[href]").ok()?;

    let container = document.select(&all).find(|element| {
        element
            .children()
            .filter_map(|child| child.value().as_text())
            .any(|text| RESULT_PAGES.is_match(text))
    })?;

    container
        .select(&links)
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| has_result_offset(href))
        .last()
        .and_then(extract_result_offset)
}

fn extract_devices(document: &Html, brand: &str, base_url: &Url) -> Vec<DeviceSummary> {
    let (Ok(block_selector), Ok(link_selector)) = (
        Selector::parse("div.content_block_title"),
        Selector::parse("a"),
    ) else {
        return Vec::new();
    };

    document
        .select(&block_selector)
        .map(|block| match block.select(&link_selector).next() {
            Some(link) => {
                let url = link
                    .value()
                    .attr("href")
                    .and_then(|href| resolve_site_link(href, base_url));
                let id = url.as_deref().and_then(extract_device_id);
                DeviceSummary {
                    id,
                    name: element_text(&link),
                    url,
                    brand: brand.to_string(),
                }
            }
            None => DeviceSummary {
                id: None,
                name: element_text(&block),
                url: None,
                brand: brand.to_string(),
            },
        })
        .collect()
}

/// Parses a device detail page
///
/// # Extraction Rules
///
/// - `full_name`: the `<title>` up to the first `|`, trimmed
/// - attributes: every `<tr>` with exactly two cells whose first cell has a
///   `<strong>` label; the label is normalized into the key and the second
///   cell's trimmed text is the value
/// - images: every `img.device_image` source, made absolute
///
/// Labels that would collide with the record's own fields are ignored, so
/// `id` always stays the one passed in.
pub fn parse_detail_page(
    html: &str,
    device_url: &str,
    device_id: Option<&str>,
    base_url: &Url,
    scraped_date: &str,
) -> DeviceDetail {
    let document = Html::parse_document(html);

    DeviceDetail {
        id: device_id.map(str::to_string),
        url: device_url.to_string(),
        name: None,
        brand: None,
        scraped_date: scraped_date.to_string(),
        full_name: extract_full_name(&document),
        attributes: extract_attributes(&document),
        images: extract_images(&document, base_url),
    }
}

/// Extracts the device name from the page title
fn extract_full_name(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element_text(&element))
        .and_then(|title| title.split('|').next().map(|s| s.trim().to_string()))
}

fn extract_attributes(document: &Html) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();

    let (Ok(row_selector), Ok(cell_selector), Ok(label_selector)) = (
        Selector::parse("tr"),
        Selector::parse("td"),
        Selector::parse("strong"),
    ) else {
        return attributes;
    };

    for row in document.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() != 2 {
            continue;
        }

        let Some(label) = cells[0].select(&label_selector).next() else {
            continue;
        };

        let key = normalize_field_label(&element_text(&label));
        if key.is_empty() {
            continue;
        }
        if RESERVED_DETAIL_FIELDS.contains(&key.as_str()) {
            tracing::debug!("Ignoring page attribute '{}' shadowing a record field", key);
            continue;
        }

        attributes.insert(key, element_text(&cells[1]));
    }

    attributes
}

fn extract_images(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("img.device_image[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| {
            if src.starts_with("http") {
                Some(src.to_string())
            } else {
                resolve_site_link(src, base_url)
            }
        })
        .collect()
}

/// Turns a table label into an attribute key: lowercase, spaces to `_`
///
/// ```
/// use phonedb_miner::miner::normalize_field_label;
///
/// assert_eq!(normalize_field_label(" RAM Capacity "), "ram_capacity");
/// ```
pub fn normalize_field_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// All text below an element, trimmed
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
