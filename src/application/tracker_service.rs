//! Tracker service.
//!
//! Everything the CLI does goes through here: record management, list
//! filtering, theme preference, attachments and file-based export/import.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::models::{now, MIME_DOC, MIME_DOCX, MIME_PDF};
use crate::domain::{
    AppConfig, AppError, Application, ApplicationPatch, ApplicationRepository,
    ApplicationStatus, Attachment, AttachmentKind, AttachmentMeta, FilterOptions,
    NewApplication, Result, SettingsRepository, Stats, Theme,
};
use crate::infrastructure::LocalStorage;

use super::export::{export_as_json, export_document, export_file_name};
use super::import::{import_from_json, ImportSummary};

/// Suffix appended to the company name of a duplicated application.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Service for managing tracked applications.
pub struct TrackerService<R> {
    config: AppConfig,
    repo: R,
}

impl TrackerService<LocalStorage> {
    /// Create a service over the configured database file.
    ///
    /// # Errors
    /// Returns error if local storage cannot be opened.
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage = LocalStorage::open(&config.storage_db_path())?;
        Ok(Self::with_repository(config, storage))
    }

    /// Size of the database file in bytes.
    ///
    /// # Errors
    /// Returns error if the file cannot be inspected.
    pub fn storage_size(&self) -> Result<u64> {
        self.repo.get_storage_size()
    }
}

impl<R> TrackerService<R>
where
    R: ApplicationRepository + SettingsRepository,
{
    /// Create with an existing repository.
    #[must_use]
    pub const fn with_repository(config: AppConfig, repo: R) -> Self {
        Self { config, repo }
    }

    /// Configuration the service was opened with.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Add a new application.
    ///
    /// # Errors
    /// Returns a validation error for empty required fields.
    pub fn add(&self, application: NewApplication) -> Result<String> {
        self.repo.add(application)
    }

    /// Fetch one application, failing if it does not exist.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id.
    pub fn get(&self, id: &str) -> Result<Application> {
        self.repo.get(id)?.ok_or_else(|| AppError::not_found(id))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id or a validation error.
    pub fn update(&self, id: &str, patch: ApplicationPatch) -> Result<()> {
        self.repo.update(id, patch)
    }

    /// Delete an application. Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(id)
    }

    /// Remove every application, keeping settings.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn reset(&self) -> Result<usize> {
        let count = self.repo.count()?;
        self.repo.clear_all()?;
        tracing::info!(removed = count, "Tracker reset");
        Ok(count)
    }

    /// Resolve a full id or a unique id prefix.
    ///
    /// # Errors
    /// Returns `NotFound` if nothing matches and `InvalidData` if the prefix
    /// matches more than one application.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(AppError::validation("Application id is required"));
        }

        if self.repo.get(prefix)?.is_some() {
            return Ok(prefix.to_string());
        }

        let mut matches: Vec<String> = self
            .repo
            .list()?
            .into_iter()
            .map(|app| app.id)
            .filter(|id| id.starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Err(AppError::not_found(prefix)),
            1 => Ok(matches.remove(0)),
            n => Err(AppError::InvalidData {
                message: format!("Id prefix '{prefix}' is ambiguous ({n} matches)"),
            }),
        }
    }

    /// Applications matching `filter`, in insertion order.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn list(&self, filter: &FilterOptions) -> Result<Vec<Application>> {
        let applications = self.repo.list()?;
        let total = applications.len();
        let filtered = filter.apply(applications);

        tracing::debug!(total, shown = filtered.len(), "Filtered applications");

        Ok(filtered)
    }

    /// Counts per status over all applications.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn stats(&self) -> Result<Stats> {
        Ok(Stats::from_applications(&self.repo.list()?))
    }

    /// Copy an application under a new id.
    ///
    /// The copy's company name gets a ` (Copy)` suffix and its status is
    /// reset to `Applied`.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id.
    pub fn duplicate(&self, id: &str) -> Result<String> {
        let original = self.get(id)?;

        let mut copy = NewApplication::from(&original);
        copy.company_name.push_str(COPY_SUFFIX);
        copy.status = ApplicationStatus::Applied;

        let new_id = self.repo.add(copy)?;
        tracing::info!(source = %id, id = %new_id, "Application duplicated");

        Ok(new_id)
    }

    /// Current theme, falling back to the configured default.
    ///
    /// # Errors
    /// Returns error if settings cannot be read.
    pub fn theme(&self) -> Result<Theme> {
        let stored = self.repo.get_setting(Theme::SETTING_KEY)?;

        Ok(stored
            .and_then(|value| match value.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!(value = %value, error = %e, "Ignoring stored theme");
                    None
                }
            })
            .unwrap_or(self.config.display.default_theme))
    }

    /// Persist a theme preference.
    ///
    /// # Errors
    /// Returns error if the setting cannot be written.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.repo.save_setting(Theme::SETTING_KEY, theme.as_str())?;
        tracing::info!(theme = %theme, "Theme saved");
        Ok(())
    }

    /// Switch between light and dark, returning the new theme.
    ///
    /// # Errors
    /// Returns error if settings cannot be read or written.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme()?.toggled();
        self.set_theme(theme)?;
        Ok(theme)
    }

    /// Read and validate a document from disk.
    ///
    /// Only `.pdf`, `.doc` and `.docx` files up to the configured size are
    /// accepted.
    ///
    /// # Errors
    /// Returns a validation error for a bad type or size, or an IO error if
    /// the file cannot be read.
    pub fn read_attachment(&self, kind: AttachmentKind, path: &Path) -> Result<Attachment> {
        let mime_type = mime_type_for(path)?;

        let metadata = fs::metadata(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
        if metadata.len() > self.config.max_attachment_bytes() {
            return Err(AppError::validation(format!(
                "File is too large ({} bytes); the limit is {} MB",
                metadata.len(),
                self.config.attachments.max_size_mb
            )));
        }

        let data = fs::read(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
        let file_name = path.file_name().map_or_else(
            || kind.default_file_name().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );

        Ok(Attachment::new(data, file_name, mime_type))
    }

    /// Attach a document from disk to an application.
    ///
    /// # Errors
    /// Returns a validation error for a bad type or size, an IO error if the
    /// file cannot be read, or `NotFound` for an unknown id.
    pub fn attach(
        &self,
        id: &str,
        kind: AttachmentKind,
        path: &Path,
    ) -> Result<AttachmentMeta> {
        let attachment = self.read_attachment(kind, path)?;
        let meta = attachment.meta.clone();

        self.repo
            .update(id, ApplicationPatch::attachment(kind, Some(attachment)))?;
        tracing::info!(
            id = %id,
            kind = kind.label(),
            file = %meta.file_name,
            "Attachment stored"
        );

        Ok(meta)
    }

    /// Remove an attachment slot's content and metadata.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id.
    pub fn detach(&self, id: &str, kind: AttachmentKind) -> Result<()> {
        self.repo.update(id, ApplicationPatch::attachment(kind, None))?;
        tracing::info!(id = %id, kind = kind.label(), "Attachment removed");
        Ok(())
    }

    /// The attachment in a slot, if any.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown id.
    pub fn attachment(&self, id: &str, kind: AttachmentKind) -> Result<Option<Attachment>> {
        let app = self.get(id)?;
        Ok(app.attachment(kind).cloned())
    }

    /// The full export document as JSON text.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn export_json(&self) -> Result<String> {
        export_as_json(&self.repo)
    }

    /// Write a full export to `path`, or to the exports directory under a
    /// dated name. Returns the file written and the record count.
    ///
    /// # Errors
    /// Returns error if the store cannot be read or the file not written.
    pub fn export_to_file(&self, path: Option<&Path>) -> Result<(PathBuf, usize)> {
        let path = path.map_or_else(
            || {
                self.config
                    .exports_dir()
                    .join(export_file_name(now().date_naive()))
            },
            Path::to_path_buf,
        );

        let document = export_document(&self.repo)?;
        let json = document.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create exports directory", e))?;
        }
        fs::write(&path, json).map_err(|e| AppError::io("Failed to write export file", e))?;

        tracing::info!(
            path = %path.display(),
            applications = document.applications.len(),
            "Export written"
        );

        Ok((path, document.applications.len()))
    }

    /// Import an export (or legacy) file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not a recognised
    /// document. Per-record problems are reported in the summary instead.
    pub fn import_from_file(&self, path: &Path) -> Result<ImportSummary> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;
        import_from_json(&self.repo, &text)
    }
}

/// MIME type for an accepted document extension.
///
/// # Errors
/// Returns a validation error for any other extension.
pub fn mime_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(MIME_PDF),
        "doc" => Ok(MIME_DOC),
        "docx" => Ok(MIME_DOCX),
        _ => Err(AppError::validation(format!(
            "Unsupported file type: {}. Use a PDF, DOC or DOCX file",
            path.display()
        ))),
    }
}
