//! Classification import and export
//!
//! - [`file`] - on-disk JSON format shared by both directions
//! - [`import`] - create/update classifications from files
//! - [`export`] - fetch classifications and stamp export metadata

pub mod export;
pub mod file;
pub mod import;

pub use export::{ExportStamp, export_all, export_by_id, export_by_name};
pub use import::{ImportOptions, ImportReport, ImportSource, Importer, OnError, check_report};
