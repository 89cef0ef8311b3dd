//! Mock MCC API client for testing
//!
//! An in-memory implementation of the API traits. Classifications live in a
//! store that create/update mutate, so import and export can be exercised
//! end to end without a server.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{AuthApi, CatalogApi, ClassificationApi};
use super::models::{
    Capability, Classification, ClassificationPage, ClassificationSummary, JobStarted, JobStatus,
    JwtToken, LoginSession, SearchRequest, SearchResponse,
};
use super::pagination::PaginationParams;
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockMccClient::new()
///     .with_catalog_source("Snowflake", "src-1")
///     .await;
/// ```
#[derive(Default)]
pub struct MockMccClient {
    /// Catalog sources returned by search, as (name, origin id)
    catalog_sources: Arc<Mutex<Vec<(String, String)>>>,
    /// Classification store
    classifications: Arc<Mutex<Vec<Classification>>>,
    /// Next id handed out on create
    next_id: Arc<Mutex<usize>>,
    /// Job statuses returned in order; the last one repeats
    job_statuses: Arc<Mutex<VecDeque<JobStatus>>>,
    /// Names whose create/update is rejected
    rejected_names: Arc<Mutex<HashSet<String>>>,
    /// Omit `total` from list pages
    omit_totals: Arc<Mutex<bool>>,
    /// Server-side page size limit, applied regardless of the requested limit
    page_cap: Arc<Mutex<Option<usize>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Capabilities passed to the last run request
    last_capabilities: Arc<Mutex<Vec<Capability>>>,
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub login: usize,
    pub generate_jwt: usize,
    pub search_assets: usize,
    pub run_catalog_source_job: usize,
    pub get_job_status: usize,
    pub list_classifications_page: usize,
    pub get_classification: usize,
    pub create_classification: usize,
    pub update_classification: usize,
}

impl MockMccClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a catalog source returned by search.
    pub async fn with_catalog_source(self, name: &str, id: &str) -> Self {
        self.catalog_sources
            .lock()
            .await
            .push((name.to_string(), id.to_string()));
        self
    }

    /// Seed the classification store; records without an id get one.
    pub async fn with_classifications(self, records: Vec<Classification>) -> Self {
        for record in records {
            self.insert(record).await;
        }
        self
    }

    /// Script the job statuses returned by `get_job_status`.
    pub async fn with_job_statuses(self, statuses: &[&str]) -> Self {
        *self.job_statuses.lock().await = statuses.iter().map(|s| JobStatus::with_status(s)).collect();
        self
    }

    /// Reject create/update of classifications with this name.
    pub async fn rejecting(self, name: &str) -> Self {
        self.rejected_names.lock().await.insert(name.to_string());
        self
    }

    /// Leave `total` out of list pages.
    pub async fn without_totals(self) -> Self {
        *self.omit_totals.lock().await = true;
        self
    }

    /// Return at most `cap` items per list page.
    pub async fn with_page_cap(self, cap: usize) -> Self {
        *self.page_cap.lock().await = Some(cap);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Snapshot of the classification store.
    pub async fn stored_classifications(&self) -> Vec<Classification> {
        self.classifications.lock().await.clone()
    }

    /// Capabilities sent with the last run request.
    pub async fn last_capabilities(&self) -> Vec<Capability> {
        self.last_capabilities.lock().await.clone()
    }

    async fn insert(&self, mut record: Classification) {
        if record.id().is_none() {
            let mut next_id = self.next_id.lock().await;
            *next_id += 1;
            record
                .0
                .insert("id".to_string(), format!("cls-{}", *next_id).into());
        }
        self.classifications.lock().await.push(record);
    }

    /// Check if there's a pending error and consume it.
    async fn check_error(&self) -> Result<()> {
        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        Ok(())
    }

    async fn check_rejected(&self, record: &Classification) -> Result<()> {
        let name = record.name().unwrap_or_default();
        if self.rejected_names.lock().await.contains(name) {
            return Err(ApiError::BadRequest(format!("Classification {} rejected (400)", name)).into());
        }
        Ok(())
    }
}

// ============================================================================
// AuthApi Implementation
// ============================================================================

#[async_trait]
impl AuthApi for MockMccClient {
    async fn login(&self, username: &str, _password: &str) -> Result<LoginSession> {
        self.check_error().await?;
        self.call_count.lock().await.login += 1;

        Ok(LoginSession {
            session_id: "mock-session".to_string(),
            user_id: username.to_string(),
            org_id: "mock-org".to_string(),
            org_name: "Mock Org".to_string(),
        })
    }

    async fn generate_jwt(&self, _session: &LoginSession) -> Result<JwtToken> {
        self.check_error().await?;
        self.call_count.lock().await.generate_jwt += 1;

        Ok(JwtToken {
            token: "mock-jwt-token".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        })
    }
}

// ============================================================================
// CatalogApi Implementation
// ============================================================================

#[async_trait]
impl CatalogApi for MockMccClient {
    async fn search_assets(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.check_error().await?;
        self.call_count.lock().await.search_assets += 1;

        // Mirror the DSL filter loosely: substring match on the quoted name
        let expr = request
            .filter_spec
            .first()
            .map(|f| f.expr.to_lowercase())
            .unwrap_or_default();
        let hits: Vec<serde_json::Value> = self
            .catalog_sources
            .lock()
            .await
            .iter()
            .filter(|(name, _)| expr.contains(&name.to_lowercase()))
            .map(|(name, id)| {
                serde_json::json!({
                    "summary": { "core.name": name },
                    "systemAttributes": { "core.origin": id }
                })
            })
            .collect();

        let response = serde_json::json!({
            "summary": { "total_hits": hits.len().to_string() },
            "hits": hits,
        });
        Ok(serde_json::from_value(response)?)
    }

    async fn run_catalog_source_job(
        &self,
        catalog_source_id: &str,
        capabilities: &[Capability],
    ) -> Result<JobStarted> {
        self.check_error().await?;
        self.call_count.lock().await.run_catalog_source_job += 1;
        *self.last_capabilities.lock().await = capabilities.to_vec();

        Ok(JobStarted {
            job_id: Some(format!("job-{}", catalog_source_id)),
            job_uri: Some(format!("/jobs/job-{}", catalog_source_id)),
            tracking_uri: None,
        })
    }

    async fn get_job_status(&self, _job_id: &str) -> Result<JobStatus> {
        self.check_error().await?;
        self.call_count.lock().await.get_job_status += 1;

        let mut statuses = self.job_statuses.lock().await;
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or_else(|| JobStatus::with_status("RUNNING")))
    }
}

// ============================================================================
// ClassificationApi Implementation
// ============================================================================

#[async_trait]
impl ClassificationApi for MockMccClient {
    async fn list_classifications_page(
        &self,
        pagination: &PaginationParams,
    ) -> Result<ClassificationPage> {
        self.check_error().await?;
        self.call_count.lock().await.list_classifications_page += 1;

        let page_size = match *self.page_cap.lock().await {
            Some(cap) => pagination.page_size().min(cap),
            None => pagination.page_size(),
        };
        let store = self.classifications.lock().await;
        let classifications = store
            .iter()
            .skip(pagination.offset)
            .take(page_size)
            .map(|c| ClassificationSummary {
                id: c.id().unwrap_or_default().to_string(),
                name: c.name().unwrap_or_default().to_string(),
                description: c.description().map(str::to_string),
            })
            .collect();
        let total = if *self.omit_totals.lock().await {
            None
        } else {
            Some(store.len())
        };

        Ok(ClassificationPage {
            classifications,
            total,
        })
    }

    async fn get_classification(&self, id: &str) -> Result<Classification> {
        self.check_error().await?;
        self.call_count.lock().await.get_classification += 1;

        self.classifications
            .lock()
            .await
            .iter()
            .find(|c| c.id() == Some(id))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Classification {}", id)).into())
    }

    async fn create_classification(&self, record: &Classification) -> Result<()> {
        self.check_error().await?;
        self.call_count.lock().await.create_classification += 1;
        self.check_rejected(record).await?;

        self.insert(record.clone()).await;
        Ok(())
    }

    async fn update_classification(&self, id: &str, record: &Classification) -> Result<()> {
        self.check_error().await?;
        self.call_count.lock().await.update_classification += 1;
        self.check_rejected(record).await?;

        let mut store = self.classifications.lock().await;
        let existing = store
            .iter_mut()
            .find(|c| c.id() == Some(id))
            .ok_or_else(|| ApiError::NotFound(format!("Classification {}", id)))?;

        let mut updated = record.clone();
        updated.0.insert("id".to_string(), id.into());
        *existing = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_assigns_ids() {
        let mock = MockMccClient::new()
            .with_classifications(vec![json!({ "name": "PII" }).into()])
            .await;
        let stored = mock.stored_classifications().await;
        assert_eq!(stored[0].id(), Some("cls-1"));
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed() {
        let mock = MockMccClient::new().with_error(ApiError::Forbidden).await;
        assert!(mock.get_job_status("j").await.is_err());
        assert!(mock.get_job_status("j").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_job_statuses_last_repeats() {
        let mock = MockMccClient::new()
            .with_job_statuses(&["RUNNING", "COMPLETED"])
            .await;
        assert_eq!(mock.get_job_status("j").await.unwrap().status, "RUNNING");
        assert_eq!(mock.get_job_status("j").await.unwrap().status, "COMPLETED");
        assert_eq!(mock.get_job_status("j").await.unwrap().status, "COMPLETED");
    }
}
