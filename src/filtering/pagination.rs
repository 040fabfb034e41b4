use axum::http::header::HeaderMap;

use super::FilterOptions;

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Parse a `[start, end]` range into `(offset, limit)`.
#[must_use]
pub fn parse_range(range: &str) -> Option<(u64, u64)> {
    serde_json::from_str::<[u64; 2]>(range)
        .ok()
        .map(|[start, end]| (start, end.saturating_sub(start) + 1))
}

/// Requested slice as `(offset, limit)`; `None` means the whole collection.
#[must_use]
pub fn parse_pagination(params: &FilterOptions) -> Option<(u64, u64)> {
    if let (Some(page), Some(per_page)) = (params.page, params.per_page) {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        Some((offset, per_page))
    } else if let Some(range) = &params.range {
        parse_range(range)
    } else {
        None
    }
}

/// Build the `Content-Range` header for a list response.
///
/// * `offset` - index of the first returned item
/// * `returned` - number of items in the body
/// * `total_count` - items matching the filter overall
/// * `resource_name` - plural resource name used as the range unit
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    returned: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    // an empty page has no first-last pair
    let content_range = if returned == 0 {
        format!("{safe_name} */{total_count}")
    } else {
        let last = offset + returned - 1;
        format!("{safe_name} {offset}-{last}/{total_count}")
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
