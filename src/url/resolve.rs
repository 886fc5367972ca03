use url::Url;

/// Resolves a link found on a site page to an absolute URL
///
/// Absolute `http(s)` links pass through untouched; anything else is joined
/// onto the site's base URL.
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use phonedb_miner::url::resolve_site_link;
///
/// let base = Url::parse("https://phonedb.net/").unwrap();
/// assert_eq!(
///     resolve_site_link("index.php?m=device&id=42", &base),
///     Some("https://phonedb.net/index.php?m=device&id=42".to_string())
/// );
/// ```
pub fn resolve_site_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
