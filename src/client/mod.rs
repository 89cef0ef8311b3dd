//! MCC API client
//!
//! Wraps the IDMC login service and the CDGC REST API behind traits so
//! commands can run against the real service or an in-memory mock.

pub mod api;
pub mod mcc;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;

pub use api::{AuthApi, CatalogApi, ClassificationApi};
pub use mcc::MccClient;
#[cfg(test)]
pub use mock::MockMccClient;
pub use pagination::{MAX_PAGE_SIZE, PaginationParams, fetch_all_classifications};

