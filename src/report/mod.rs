//! Output rendering for discovery results.

pub mod generator;

pub use generator::{export_csv, export_records, export_report, export_rows, EXPORT_COLUMNS};
