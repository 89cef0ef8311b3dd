//! Classification API trait

use async_trait::async_trait;

use crate::client::models::{Classification, ClassificationPage};
use crate::client::pagination::PaginationParams;
use crate::error::Result;

/// Classification operations for the CDGC API
#[async_trait]
pub trait ClassificationApi: Send + Sync {
    /// List one page of classification summaries
    async fn list_classifications_page(
        &self,
        pagination: &PaginationParams,
    ) -> Result<ClassificationPage>;

    /// Get the full definition of a classification
    async fn get_classification(&self, id: &str) -> Result<Classification>;

    /// Create a new classification
    async fn create_classification(&self, record: &Classification) -> Result<()>;

    /// Replace an existing classification
    async fn update_classification(&self, id: &str, record: &Classification) -> Result<()>;
}
