//! Whole-database JSON export.
//!
//! Produces the `{version, exportDate, applications}` envelope that
//! [`import_from_json`](super::import::import_from_json) reads back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::models::now;
use crate::domain::{AppError, Application, ApplicationRepository, Attachment, Result};

use super::codec::{encode_base64, format_timestamp};

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "1.0";

/// Top-level export document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub version: String,
    pub export_date: String,
    pub applications: Vec<ExportedApplication>,
}

/// An application with dates as text and attachments as base64.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedApplication {
    pub id: String,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    pub job_title: String,
    pub application_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_blob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_meta: Option<ExportedMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter_blob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter_meta: Option<ExportedMeta>,
    pub created_at: String,
    pub updated_at: String,
}

/// Attachment metadata in export form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMeta {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub updated_at: String,
}

impl From<&Application> for ExportedApplication {
    fn from(app: &Application) -> Self {
        let (resume_blob, resume_meta) = split_attachment(app.resume.as_ref());
        let (cover_letter_blob, cover_letter_meta) = split_attachment(app.cover_letter.as_ref());

        Self {
            id: app.id.clone(),
            company_name: app.company_name.clone(),
            company_website: app.company_website.clone(),
            job_title: app.job_title.clone(),
            application_date: format_timestamp(&app.application_date),
            status: app.status.to_string(),
            notes: app.notes.clone(),
            job_link: app.job_link.clone(),
            resume_blob,
            resume_meta,
            cover_letter_blob,
            cover_letter_meta,
            created_at: format_timestamp(&app.created_at),
            updated_at: format_timestamp(&app.updated_at),
        }
    }
}

fn split_attachment(attachment: Option<&Attachment>) -> (Option<String>, Option<ExportedMeta>) {
    attachment.map_or((None, None), |a| {
        (
            Some(encode_base64(&a.data)),
            Some(ExportedMeta {
                file_name: a.meta.file_name.clone(),
                mime_type: a.meta.mime_type.clone(),
                size: a.meta.size,
                updated_at: format_timestamp(&a.meta.updated_at),
            }),
        )
    })
}

impl ExportEnvelope {
    /// Wrap already-loaded applications, stamped with `exported_at`.
    #[must_use]
    pub fn new(applications: &[Application], exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: format_timestamp(&exported_at),
            applications: applications.iter().map(ExportedApplication::from).collect(),
        }
    }

    /// Serialize as indented JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(AppError::json_parse)
    }
}

/// Build the export document for every stored application.
///
/// # Errors
/// Returns error if the store cannot be read.
pub fn export_document<R>(repo: &R) -> Result<ExportEnvelope>
where
    R: ApplicationRepository + ?Sized,
{
    let applications = repo.list()?;
    Ok(ExportEnvelope::new(&applications, now()))
}

/// Export every stored application as indented JSON text.
///
/// # Errors
/// Returns error if the store cannot be read or serialization fails.
pub fn export_as_json<R>(repo: &R) -> Result<String>
where
    R: ApplicationRepository + ?Sized,
{
    let document = export_document(repo)?;
    let json = document.to_json()?;

    tracing::info!(
        applications = document.applications.len(),
        bytes = json.len(),
        "Export completed"
    );

    Ok(json)
}

/// Suggested file name for an export made on `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("job-applications-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MIME_PDF;
    use crate::domain::NewApplication;
    use crate::infrastructure::LocalStorage;
    use chrono::TimeZone;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(export_file_name(date), "job-applications-2024-05-09.json");
    }

    #[test]
    fn test_empty_store_exports_empty_envelope() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let json = export_as_json(&storage).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value["exportDate"].as_str().unwrap().ends_with('Z'));
        assert_eq!(value["applications"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_export_shape() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let mut input = NewApplication::new(
            "Acme",
            "Engineer",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        input.resume = Some(Attachment::new(b"Hello".to_vec(), "cv.pdf", MIME_PDF));
        let id = storage.add(input).unwrap();

        let json = export_as_json(&storage).unwrap();
        assert!(json.contains("\n  \"applications\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let app = &value["applications"][0];
        assert_eq!(app["id"], id.as_str());
        assert_eq!(app["companyName"], "Acme");
        assert_eq!(app["applicationDate"], "2024-01-01T00:00:00.000Z");
        assert_eq!(app["status"], "Applied");
        assert_eq!(app["resumeBlob"], "SGVsbG8=");
        assert_eq!(app["resumeMeta"]["fileName"], "cv.pdf");
        assert_eq!(app["resumeMeta"]["size"], 5);
        assert!(app.get("coverLetterBlob").is_none());
        assert!(app.get("coverLetterMeta").is_none());
        assert!(app.get("notes").is_none());
    }
}
