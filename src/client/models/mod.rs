//! MCC API data models
//!
//! Models are organized by resource type.

mod auth;
mod catalog;
mod classification;

pub use auth::{JwtToken, LoginResponse, LoginSession, Session};
pub use catalog::{
    Capability, CatalogAsset, CatalogSource, JobStarted, JobState, JobStatus, RunJobRequest,
    ScanJob, SearchRequest, SearchResponse,
};
pub use classification::{
    Classification, ClassificationPage, ClassificationSummary, EXPORT_METADATA_FIELDS,
};

/// Key used to compare names; full Unicode lowercasing, not just ASCII.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive name comparison
pub fn same_name(a: &str, b: &str) -> bool {
    name_key(a) == name_key(b)
}
