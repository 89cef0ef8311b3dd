//! Shared CLI argument types
//!
//! Reusable argument structs that are flattened into commands with
//! `#[command(flatten)]`.

mod common;
mod global;

pub use common::{CapabilityArgs, OutputFormat};
pub use global::GlobalOptions;
