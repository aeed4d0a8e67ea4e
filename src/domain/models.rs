//! Domain models for tracked job applications.
//!
//! These models represent the records kept in the local store. Serialized
//! forms for export live in the application layer, not here.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// MIME type for PDF documents.
pub const MIME_PDF: &str = "application/pdf";
/// MIME type for legacy Word documents.
pub const MIME_DOC: &str = "application/msword";
/// MIME type for Office Open XML Word documents.
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Current time truncated to whole milliseconds.
///
/// Every timestamp the store produces goes through here so that the
/// millisecond JSON form round-trips exactly.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Progress of an application through the hiring pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Applied,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    /// All statuses in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Applied,
        Self::Interview,
        Self::Offer,
        Self::Rejected,
        Self::Withdrawn,
    ];

    /// Canonical text form, as stored and exported.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Interview => "Interview",
            Self::Offer => "Offer",
            Self::Rejected => "Rejected",
            Self::Withdrawn => "Withdrawn",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("Unknown status: {s}. Use: applied, interview, offer, rejected, withdrawn")
            })
    }
}

/// UI colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Settings key the theme is stored under.
    pub const SETTING_KEY: &'static str = "theme";

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("Unknown theme: {s}. Use: light, dark")),
        }
    }
}

/// Which of the two attachment slots a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Resume,
    CoverLetter,
}

impl AttachmentKind {
    /// File name used when an imported attachment carries none.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Resume => "resume.pdf",
            Self::CoverLetter => "cover-letter.docx",
        }
    }

    /// MIME type used when an imported attachment carries none.
    #[must_use]
    pub const fn default_mime_type(self) -> &'static str {
        match self {
            Self::Resume => MIME_PDF,
            Self::CoverLetter => MIME_DOCX,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::CoverLetter => "cover letter",
        }
    }
}

impl std::str::FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resume" | "cv" => Ok(Self::Resume),
            "cover-letter" | "cover_letter" | "coverletter" | "letter" => Ok(Self::CoverLetter),
            _ => Err(format!("Unknown attachment kind: {s}. Use: resume, cover-letter")),
        }
    }
}

/// Descriptive data for a stored attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub mime_type: String,
    /// Size of the content in bytes.
    pub size: u64,
    pub updated_at: DateTime<Utc>,
}

/// A binary document together with its metadata.
///
/// Content and metadata only exist as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub meta: AttachmentMeta,
}

impl Attachment {
    /// Build an attachment stamped with the current time.
    #[must_use]
    pub fn new(data: Vec<u8>, file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let size = data.len() as u64;
        Self {
            data,
            meta: AttachmentMeta {
                file_name: file_name.into(),
                mime_type: mime_type.into(),
                size,
                updated_at: now(),
            },
        }
    }
}

/// Input for creating an application. Identity and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub company_name: String,
    pub company_website: Option<String>,
    pub job_title: String,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub job_link: Option<String>,
    pub resume: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
}

impl NewApplication {
    /// Minimal input with the required fields set.
    #[must_use]
    pub fn new(
        company_name: impl Into<String>,
        job_title: impl Into<String>,
        application_date: DateTime<Utc>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            company_website: None,
            job_title: job_title.into(),
            application_date,
            status: ApplicationStatus::default(),
            notes: None,
            job_link: None,
            resume: None,
            cover_letter: None,
        }
    }

    /// Turn this input into a full record.
    ///
    /// # Errors
    /// Returns a validation error if a required field is empty.
    pub fn into_application(self, id: String, created_at: DateTime<Utc>) -> Result<Application> {
        Application {
            id,
            company_name: self.company_name,
            company_website: self.company_website,
            job_title: self.job_title,
            application_date: self.application_date,
            status: self.status,
            notes: self.notes,
            job_link: self.job_link,
            resume: self.resume,
            cover_letter: self.cover_letter,
            created_at,
            updated_at: created_at,
        }
        .normalized()
    }
}

impl From<&Application> for NewApplication {
    fn from(app: &Application) -> Self {
        Self {
            company_name: app.company_name.clone(),
            company_website: app.company_website.clone(),
            job_title: app.job_title.clone(),
            application_date: app.application_date,
            status: app.status,
            notes: app.notes.clone(),
            job_link: app.job_link.clone(),
            resume: app.resume.clone(),
            cover_letter: app.cover_letter.clone(),
        }
    }
}

/// Partial update merged onto a stored application.
///
/// Absent fields are preserved. For nullable fields `Some(None)` clears
/// the value. `id` and `created_at` are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationPatch {
    pub company_name: Option<String>,
    pub company_website: Option<Option<String>>,
    pub job_title: Option<String>,
    pub application_date: Option<DateTime<Utc>>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<Option<String>>,
    pub job_link: Option<Option<String>>,
    pub resume: Option<Option<Attachment>>,
    pub cover_letter: Option<Option<Attachment>>,
}

impl ApplicationPatch {
    /// Patch that sets or clears one attachment slot.
    #[must_use]
    pub fn attachment(kind: AttachmentKind, attachment: Option<Attachment>) -> Self {
        match kind {
            AttachmentKind::Resume => Self {
                resume: Some(attachment),
                ..Self::default()
            },
            AttachmentKind::CoverLetter => Self {
                cover_letter: Some(attachment),
                ..Self::default()
            },
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: String,
    pub company_name: String,
    pub company_website: Option<String>,
    pub job_title: String,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
    pub job_link: Option<String>,
    pub resume: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Merge a patch onto this record and refresh `updated_at`.
    ///
    /// # Errors
    /// Returns a validation error if the merged record is invalid; the
    /// record is left untouched in that case.
    pub fn apply_patch(&mut self, patch: ApplicationPatch, at: DateTime<Utc>) -> Result<()> {
        let mut merged = self.clone();

        if let Some(v) = patch.company_name {
            merged.company_name = v;
        }
        if let Some(v) = patch.company_website {
            merged.company_website = v;
        }
        if let Some(v) = patch.job_title {
            merged.job_title = v;
        }
        if let Some(v) = patch.application_date {
            merged.application_date = v;
        }
        if let Some(v) = patch.status {
            merged.status = v;
        }
        if let Some(v) = patch.notes {
            merged.notes = v;
        }
        if let Some(v) = patch.job_link {
            merged.job_link = v;
        }
        if let Some(v) = patch.resume {
            merged.resume = v;
        }
        if let Some(v) = patch.cover_letter {
            merged.cover_letter = v;
        }

        merged.updated_at = at.max(merged.created_at);
        *self = merged.normalized()?;
        Ok(())
    }

    /// Validate required fields and give links a scheme.
    ///
    /// Names and notes are stored exactly as given.
    ///
    /// # Errors
    /// Returns a validation error if company name or job title is blank.
    pub fn normalized(mut self) -> Result<Self> {
        if self.company_name.trim().is_empty() {
            return Err(AppError::validation("Company name is required"));
        }
        if self.job_title.trim().is_empty() {
            return Err(AppError::validation("Job title is required"));
        }

        self.company_website = self.company_website.as_deref().and_then(normalize_url);
        self.job_link = self.job_link.as_deref().and_then(normalize_url);
        self.updated_at = self.updated_at.max(self.created_at);

        Ok(self)
    }

    /// Attachment in the given slot, if any.
    #[must_use]
    pub const fn attachment(&self, kind: AttachmentKind) -> Option<&Attachment> {
        match kind {
            AttachmentKind::Resume => self.resume.as_ref(),
            AttachmentKind::CoverLetter => self.cover_letter.as_ref(),
        }
    }
}

/// Ensure a URL carries a scheme; empty input means no URL.
#[must_use]
pub fn normalize_url(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Application {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        NewApplication::new("Acme", "Engineer", at)
            .into_application("abc".into(), at)
            .unwrap()
    }

    #[test]
    fn test_status_from_str_is_case_insensitive() {
        assert_eq!(
            "interview".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Interview)
        );
        assert_eq!(
            " OFFER ".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Offer)
        );
        assert!("ghosted".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), Some("https://example.com".into()));
        assert_eq!(normalize_url("http://a.io"), Some("http://a.io".into()));
        assert_eq!(normalize_url("HTTPS://A.io"), Some("HTTPS://A.io".into()));
        assert_eq!(normalize_url("   "), None);
    }

    #[test]
    fn test_required_fields_validated() {
        let at = now();
        let err = NewApplication::new("  ", "Engineer", at)
            .into_application("x".into(), at)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = NewApplication::new("Acme", "", at)
            .into_application("x".into(), at)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_names_are_kept_verbatim() {
        let at = now();
        let app = NewApplication::new(" Acme ", "Engineer\t", at)
            .into_application("x".into(), at)
            .unwrap();
        assert_eq!(app.company_name, " Acme ");
        assert_eq!(app.job_title, "Engineer\t");
    }

    #[test]
    fn test_apply_patch_merges_and_clears() {
        let mut app = sample();
        app.notes = Some("keep".into());
        app.company_website = Some("https://acme.io".into());

        let later = app.created_at + chrono::Duration::days(1);
        let patch = ApplicationPatch {
            status: Some(ApplicationStatus::Offer),
            company_website: Some(None),
            ..ApplicationPatch::default()
        };
        app.apply_patch(patch, later).unwrap();

        assert_eq!(app.status, ApplicationStatus::Offer);
        assert_eq!(app.company_website, None);
        assert_eq!(app.notes.as_deref(), Some("keep"));
        assert_eq!(app.updated_at, later);
        assert_eq!(app.id, "abc");
    }

    #[test]
    fn test_apply_patch_rejects_invalid_without_mutating() {
        let mut app = sample();
        let before = app.clone();
        let patch = ApplicationPatch {
            job_title: Some(String::new()),
            ..ApplicationPatch::default()
        };

        assert!(app.apply_patch(patch, now()).is_err());
        assert_eq!(app, before);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let mut app = sample();
        let earlier = app.created_at - chrono::Duration::days(3);
        app.apply_patch(ApplicationPatch::default(), earlier).unwrap();
        assert_eq!(app.updated_at, app.created_at);
    }

    #[test]
    fn test_attachment_size_from_data() {
        let att = Attachment::new(vec![1, 2, 3], "cv.pdf", MIME_PDF);
        assert_eq!(att.meta.size, 3);
        assert_eq!(
            "cover-letter".parse::<AttachmentKind>(),
            Ok(AttachmentKind::CoverLetter)
        );
    }

    #[test]
    fn test_now_is_millisecond_precise() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
