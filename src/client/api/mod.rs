//! API trait definitions split by responsibility
//!
//! - [`AuthApi`] - IDMC login and JWT exchange
//! - [`CatalogApi`] - Catalog source search, scan jobs
//! - [`ClassificationApi`] - Classification CRUD

mod auth;
mod catalog;
mod classification;

pub use auth::AuthApi;
pub use catalog::CatalogApi;
pub use classification::ClassificationApi;
