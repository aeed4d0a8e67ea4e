//! Application layer - use cases and orchestration.
//!
//! This layer contains export/import of the whole tracker, output
//! formatting and the service the CLI drives.

pub mod codec;
pub mod export;
pub mod formatter;
pub mod import;
pub mod tracker_service;

pub use formatter::{
    describe_attachment, format_application_markdown, format_applications_json,
    format_applications_table, format_stats, short_id, OutputFormat,
};
pub use tracker_service::TrackerService;
