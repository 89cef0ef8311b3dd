//! Pagination helpers for API requests
//!
//! The classification list endpoint is offset based and caps its page size,
//! so listing everything means walking pages until the reported total is
//! reached, or until a short page when no total is reported.

use log::debug;

use super::api::ClassificationApi;
use super::models::ClassificationSummary;
use crate::error::Result;

/// Largest page the classification endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 500;

/// Upper bound on pages fetched in one listing.
const MAX_PAGES: usize = 10_000;

/// Offset pagination parameters for API requests.
///
/// # Example
/// ```ignore
/// let params = PaginationParams::new().limit(100).offset(200);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationParams {
    /// Index of the first item to return
    pub offset: usize,
    /// Number of items per page (default: MAX_PAGE_SIZE)
    pub limit: Option<usize>,
}

impl PaginationParams {
    /// Create new pagination params with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting offset.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.clamp(1, MAX_PAGE_SIZE));
        self
    }

    /// Effective page size.
    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(MAX_PAGE_SIZE)
    }

    /// Convert to query string parameters (`offset`, `limit`).
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("offset", self.offset.to_string()),
            ("limit", self.page_size().to_string()),
        ]
    }
}

/// Fetch every classification summary, one page at a time.
pub async fn fetch_all_classifications<C>(
    client: &C,
    page_size: usize,
) -> Result<Vec<ClassificationSummary>>
where
    C: ClassificationApi + ?Sized,
{
    let mut params = PaginationParams::new().limit(page_size);
    let mut all = Vec::new();

    for _ in 0..MAX_PAGES {
        let page = client.list_classifications_page(&params).await?;
        let fetched = page.classifications.len();
        debug!(
            "Fetched {} classifications at offset {} (total: {:?})",
            fetched, params.offset, page.total
        );
        all.extend(page.classifications);

        // The server may cap pages below the requested limit, so a short
        // page only ends the listing when no total is reported
        let done = match page.total {
            Some(total) => fetched == 0 || all.len() >= total,
            None => fetched < params.page_size(),
        };
        if done {
            break;
        }
        params = params.clone().offset(params.offset + fetched);
    }

    Ok(all)
}
