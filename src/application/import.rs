//! JSON import with format detection.
//!
//! Two document shapes are understood: the native export envelope
//! (`{"applications": [...]}`) and the legacy tracker format
//! (`{"jobs": [...]}`). Each shape has one mapping function into a common
//! [`ImportEntry`]; everything after that is shared.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::models::now;
use crate::domain::{
    AppError, Application, ApplicationRepository, ApplicationStatus, Attachment, AttachmentKind,
    AttachmentMeta, Result,
};

use super::codec::{decode_base64, parse_timestamp, timestamp_from_millis};

const MISSING_FIELDS: &str =
    "missing required fields (companyName, jobTitle, or applicationDate)";

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records written to the store.
    pub imported_count: usize,
    /// Of those, records that replaced an existing id.
    pub overwritten_count: usize,
    /// One message per skipped record.
    pub errors: Vec<String>,
}

/// A recognised import document, holding its raw entries.
#[derive(Debug, Clone)]
pub enum ImportFormat {
    /// `{"applications": [...]}` as written by export.
    Native(Vec<Value>),
    /// `{"jobs": [...]}` from the legacy tracker.
    Legacy(Vec<Value>),
}

impl ImportFormat {
    /// Work out which shape a parsed document has.
    ///
    /// # Errors
    /// Returns `InvalidData` if neither an `applications` nor a `jobs`
    /// array is present.
    pub fn detect(document: Value) -> Result<Self> {
        let invalid = || AppError::InvalidData {
            message: "Invalid JSON format: missing applications or jobs array".into(),
        };

        let Value::Object(mut map) = document else {
            return Err(invalid());
        };

        if let Some(Value::Array(entries)) = map.remove("applications") {
            return Ok(Self::Native(entries));
        }
        if let Some(Value::Array(entries)) = map.remove("jobs") {
            return Ok(Self::Legacy(entries));
        }

        Err(invalid())
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Native(_) => "native",
            Self::Legacy(_) => "legacy",
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Native(entries) | Self::Legacy(entries) => entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map every raw entry into the common shape. Entries that do not
    /// deserialize yield the reason as an error.
    fn into_entries(self) -> Vec<std::result::Result<ImportEntry, String>> {
        match self {
            Self::Native(entries) => entries
                .into_iter()
                .map(|v| serde_json::from_value::<ImportEntry>(v).map_err(|e| e.to_string()))
                .collect(),
            Self::Legacy(entries) => entries
                .into_iter()
                .map(|v| {
                    serde_json::from_value::<LegacyJob>(v)
                        .map(ImportEntry::from)
                        .map_err(|e| e.to_string())
                })
                .collect(),
        }
    }
}

/// A date given either as text or as epoch milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DateValue {
    Millis(i64),
    Text(String),
}

impl DateValue {
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => timestamp_from_millis(*ms),
            Self::Text(s) => parse_timestamp(s),
        }
    }
}

/// Attachment metadata as found in import documents; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportMeta {
    file_name: Option<String>,
    mime_type: Option<String>,
    size: Option<u64>,
    updated_at: Option<DateValue>,
}

/// One record after format mapping, before validation.
///
/// Field names follow the native export, so native entries deserialize
/// straight into it. `updatedAt` is deliberately absent: import always
/// stamps its own time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportEntry {
    id: Option<String>,
    company_name: Option<String>,
    company_website: Option<String>,
    job_title: Option<String>,
    application_date: Option<DateValue>,
    status: Option<String>,
    notes: Option<String>,
    job_link: Option<String>,
    resume_blob: Option<String>,
    resume_meta: Option<ImportMeta>,
    cover_letter_blob: Option<String>,
    cover_letter_meta: Option<ImportMeta>,
    created_at: Option<DateValue>,
}

impl ImportEntry {
    fn has_required_fields(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());

        present(&self.company_name)
            && present(&self.job_title)
            && self.application_date.as_ref().is_some_and(|d| !d.is_blank())
    }

    fn label(&self) -> String {
        format!(
            "{} - {}",
            self.company_name.as_deref().unwrap_or_default(),
            self.job_title.as_deref().unwrap_or_default()
        )
    }

    /// Validate and convert into a storable record.
    fn into_application(self, imported_at: DateTime<Utc>) -> std::result::Result<Application, String> {
        let application_date = self
            .application_date
            .as_ref()
            .and_then(DateValue::parse)
            .ok_or("invalid applicationDate")?;

        let status = self
            .status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map_or(Ok(ApplicationStatus::Applied), str::parse::<ApplicationStatus>)?;

        let created_at = match &self.created_at {
            Some(value) if !value.is_blank() => value.parse().ok_or("invalid createdAt")?,
            _ => imported_at,
        };

        let resume = build_attachment(
            AttachmentKind::Resume,
            self.resume_blob,
            self.resume_meta,
            imported_at,
        )?;
        let cover_letter = build_attachment(
            AttachmentKind::CoverLetter,
            self.cover_letter_blob,
            self.cover_letter_meta,
            imported_at,
        )?;

        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Application {
            id,
            company_name: self.company_name.unwrap_or_default(),
            company_website: self.company_website,
            job_title: self.job_title.unwrap_or_default(),
            application_date,
            status,
            notes: self.notes,
            job_link: self.job_link,
            resume,
            cover_letter,
            created_at,
            updated_at: imported_at,
        }
        .normalized()
        .map_err(|e| e.to_string())
    }
}

/// Pair decoded content with metadata, keeping the slot all-or-nothing.
fn build_attachment(
    kind: AttachmentKind,
    blob: Option<String>,
    meta: Option<ImportMeta>,
    imported_at: DateTime<Utc>,
) -> std::result::Result<Option<Attachment>, String> {
    let blob = blob.filter(|b| !b.trim().is_empty());

    let Some(blob) = blob else {
        if meta.is_some() {
            tracing::warn!(kind = kind.label(), "Dropping attachment metadata without content");
        }
        return Ok(None);
    };

    let data = decode_base64(&blob)
        .map_err(|e| format!("invalid base64 in {} data: {e}", kind.label()))?;
    let meta = meta.unwrap_or_default();

    let updated_at = match &meta.updated_at {
        Some(value) if !value.is_blank() => value
            .parse()
            .ok_or_else(|| format!("invalid {} updatedAt", kind.label()))?,
        _ => imported_at,
    };

    let size = meta.size.unwrap_or(data.len() as u64);

    Ok(Some(Attachment {
        meta: AttachmentMeta {
            file_name: meta
                .file_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| kind.default_file_name().to_string()),
            mime_type: meta
                .mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| kind.default_mime_type().to_string()),
            size,
            updated_at,
        },
        data,
    }))
}

/// Entry of the legacy `jobs` format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyJob {
    id: Option<Value>,
    company: Option<String>,
    position: Option<String>,
    date_applied: Option<DateValue>,
    created_at: Option<DateValue>,
    updated_at: Option<DateValue>,
    status: Option<String>,
    notes: Option<String>,
    salary_range: Option<String>,
    job_type: Option<String>,
    location: Option<String>,
    url: Option<String>,
    resume: Option<LegacyFile>,
    cover_letter: Option<LegacyFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct LegacyFile {
    name: Option<String>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
    size: Option<u64>,
    data: Option<String>,
}

impl From<LegacyJob> for ImportEntry {
    fn from(job: LegacyJob) -> Self {
        let company = job.company.as_deref().map(strip_backticks);
        let company_website = company.clone().filter(|c| c.contains("http"));

        let notes = [&job.notes, &job.salary_range, &job.job_type, &job.location]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");

        let meta_updated = job.updated_at.clone().or_else(|| job.created_at.clone());
        let (resume_blob, resume_meta) = legacy_attachment(job.resume, meta_updated.clone());
        let (cover_letter_blob, cover_letter_meta) =
            legacy_attachment(job.cover_letter, meta_updated);

        Self {
            id: job.id.as_ref().and_then(legacy_id),
            company_name: company,
            company_website,
            job_title: job.position,
            application_date: job
                .date_applied
                .filter(|d| !d.is_blank())
                .or_else(|| job.created_at.clone()),
            status: job.status,
            notes: Some(notes).filter(|n| !n.is_empty()),
            job_link: job
                .url
                .as_deref()
                .map(strip_backticks)
                .filter(|u| !u.is_empty()),
            resume_blob,
            resume_meta,
            cover_letter_blob,
            cover_letter_meta,
            created_at: job.created_at,
        }
    }
}

fn strip_backticks(value: &str) -> String {
    value.replace('`', "").trim().to_string()
}

fn legacy_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn legacy_attachment(
    file: Option<LegacyFile>,
    updated_at: Option<DateValue>,
) -> (Option<String>, Option<ImportMeta>) {
    let Some(file) = file else {
        return (None, None);
    };
    let Some(data) = file.data.filter(|d| !d.trim().is_empty()) else {
        return (None, None);
    };

    (
        Some(data),
        Some(ImportMeta {
            file_name: file.name,
            mime_type: file.mime_type,
            size: file.size,
            updated_at,
        }),
    )
}

/// Import applications from JSON text into the store.
///
/// Records whose id already exists are overwritten. A bad record is
/// skipped with a message in [`ImportSummary::errors`]; the remaining
/// records are still processed. Records written before a failure stay
/// written.
///
/// # Errors
/// Returns `JsonParse` if the text is not JSON and `InvalidData` if it has
/// neither an `applications` nor a `jobs` array. Nothing is written in
/// either case.
pub fn import_from_json<R>(repo: &R, text: &str) -> Result<ImportSummary>
where
    R: ApplicationRepository + ?Sized,
{
    let document: Value = serde_json::from_str(text).map_err(AppError::json_parse)?;
    let format = ImportFormat::detect(document)?;

    if format.is_empty() {
        tracing::info!(format = format.name(), "Import document has no entries");
        return Ok(ImportSummary::default());
    }

    tracing::info!(format = format.name(), entries = format.len(), "Starting import");

    let imported_at = now();
    let mut summary = ImportSummary::default();

    for (index, entry) in format.into_entries().into_iter().enumerate() {
        let position = index + 1;

        let entry = match entry {
            Ok(entry) => entry,
            Err(reason) => {
                tracing::warn!(position, error = %reason, "Unreadable import entry");
                summary
                    .errors
                    .push(format!("Failed to import application #{position}: {reason}"));
                continue;
            }
        };

        if !entry.has_required_fields() {
            tracing::warn!(position, "Import entry missing required fields");
            summary
                .errors
                .push(format!("Skipping application #{position}: {MISSING_FIELDS}"));
            continue;
        }

        let label = entry.label();
        let outcome = entry.into_application(imported_at).and_then(|app| {
            repo.put(&app)
                .map(|overwritten| (app.id, overwritten))
                .map_err(|e| e.to_string())
        });

        match outcome {
            Ok((id, overwritten)) => {
                summary.imported_count += 1;
                if overwritten {
                    summary.overwritten_count += 1;
                    tracing::info!(id = %id, overwritten = true, "Imported application replaced existing record");
                }
            }
            Err(reason) => {
                tracing::warn!(position, error = %reason, "Import entry rejected");
                summary
                    .errors
                    .push(format!("Failed to import application \"{label}\": {reason}"));
            }
        }
    }

    tracing::info!(
        imported = summary.imported_count,
        overwritten = summary.overwritten_count,
        errors = summary.errors.len(),
        "Import completed"
    );

    Ok(summary)
}
