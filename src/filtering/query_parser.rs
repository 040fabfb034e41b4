use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters accepted by every collection endpoint.
///
/// All of them are optional; without any the whole collection is returned in
/// the resource's default order.
///
/// # Filtering
/// `filter` is a JSON object:
/// - `{"q": "matrix"}` searches every text column
/// - `{"title": "matrix"}` substring match on a text column
/// - `{"duration": 120}` exact match on a numeric column
/// - `{"id": [1, 2, 3]}` any of several values
///
/// # Pagination
/// - `page=1&per_page=10` (1-based pages)
/// - `range=[0,9]` (inclusive bounds)
///
/// # Sorting
/// - `sort_by=title&order=DESC`
/// - `sort=["title","DESC"]`
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct FilterOptions {
    /// JSON-encoded filter, e.g. `{"title": "matrix"}`
    #[param(example = json!({"q": "matrix"}))]
    pub filter: Option<String>,
    /// Inclusive range `[start, end]`
    #[param(example = "[0,9]")]
    pub range: Option<String>,
    /// Page number (1-based)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page
    #[param(example = 10)]
    pub per_page: Option<u64>,
    /// Sort as `["column", "order"]` or a bare column name
    #[param(example = r#"["id", "ASC"]"#)]
    pub sort: Option<String>,
    /// Sort column
    #[param(example = "title")]
    pub sort_by: Option<String>,
    /// ASC or DESC
    #[param(example = "ASC")]
    pub order: Option<String>,
}
