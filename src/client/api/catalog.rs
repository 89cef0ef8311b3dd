//! Catalog source API trait

use async_trait::async_trait;

use crate::client::models::{Capability, JobStarted, JobStatus, SearchRequest, SearchResponse};
use crate::error::Result;

/// Catalog source operations for the CDGC API
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search catalog assets
    async fn search_assets(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Start a scan job for a catalog source with the given capabilities
    async fn run_catalog_source_job(
        &self,
        catalog_source_id: &str,
        capabilities: &[Capability],
    ) -> Result<JobStarted>;

    /// Get the current status of a job
    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus>;
}
