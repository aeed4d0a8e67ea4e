//! Storage contracts for the tracker.
//!
//! Services and the export/import routines depend on these traits rather
//! than on a concrete database, so any store (or test double) can back them.

use super::error::Result;
use super::models::{Application, ApplicationPatch, NewApplication};

/// Persistence of application records.
pub trait ApplicationRepository {
    /// Insert a new record and return its generated id.
    ///
    /// # Errors
    /// Returns a validation error for empty required fields, or a database
    /// error if the insert is rejected.
    fn add(&self, application: NewApplication) -> Result<String>;

    /// Point lookup. A missing id is `Ok(None)`.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn get(&self, id: &str) -> Result<Option<Application>>;

    /// All records in insertion order.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn list(&self) -> Result<Vec<Application>>;

    /// Merge a patch onto an existing record.
    ///
    /// # Errors
    /// Returns `NotFound` if no record has this id.
    fn update(&self, id: &str, patch: ApplicationPatch) -> Result<()>;

    /// Remove a record. Removing a missing id succeeds.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    fn delete(&self, id: &str) -> Result<()>;

    /// Remove every application record.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    fn clear_all(&self) -> Result<()>;

    /// Insert or overwrite a complete record, keyed by its id.
    ///
    /// Returns `true` when an existing record was overwritten.
    ///
    /// # Errors
    /// Returns error if the write fails.
    fn put(&self, application: &Application) -> Result<bool>;

    /// Number of stored records.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn count(&self) -> Result<usize>;
}

/// Key/value settings with overwrite semantics.
pub trait SettingsRepository {
    /// Insert or overwrite a setting.
    ///
    /// # Errors
    /// Returns error if the write fails.
    fn save_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Read a setting, `None` if unset.
    ///
    /// # Errors
    /// Returns error if the query fails.
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
}
