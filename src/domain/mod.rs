//! Domain layer - core types and contracts.
//!
//! This layer contains the application record model, error types and the
//! storage traits, without any database or filesystem access.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod ports;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use filter::{FilterOptions, Stats};
pub use models::{
    Application, ApplicationPatch, ApplicationStatus, Attachment, AttachmentKind,
    AttachmentMeta, NewApplication, Theme,
};
pub use ports::{ApplicationRepository, SettingsRepository};
