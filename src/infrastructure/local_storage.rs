//! Local SQLite storage for job applications and settings.
//!
//! One connection is opened per process and handed to every consumer.
//! The schema is versioned with `PRAGMA user_version`; opening an older
//! database creates whatever tables and indexes are missing and rescales
//! millisecond timestamps to nanoseconds.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::models::now;
use crate::domain::{
    AppError, Application, ApplicationPatch, ApplicationRepository, ApplicationStatus,
    Attachment, AttachmentMeta, NewApplication, Result, SettingsRepository,
};

/// Schema version written to `user_version`.
pub const SCHEMA_VERSION: i64 = 4;

/// Last schema version that stored timestamps as epoch milliseconds.
const MILLIS_SCHEMA_VERSION: i64 = 3;

/// Rescale epoch milliseconds to epoch nanoseconds.
const MILLIS_TO_NANOS: &str = r"
    UPDATE applications SET
        application_date = application_date * 1000000,
        created_at = created_at * 1000000,
        updated_at = updated_at * 1000000,
        resume_updated_at = resume_updated_at * 1000000,
        cover_letter_updated_at = cover_letter_updated_at * 1000000
";

const SCHEMA: &str = r"
    -- Application records
    CREATE TABLE IF NOT EXISTS applications (
        id TEXT PRIMARY KEY NOT NULL,
        company_name TEXT NOT NULL,
        company_website TEXT,
        job_title TEXT NOT NULL,
        application_date INTEGER NOT NULL,
        status TEXT NOT NULL DEFAULT 'Applied'
            CHECK (status IN ('Applied', 'Interview', 'Offer', 'Rejected', 'Withdrawn')),
        notes TEXT,
        job_link TEXT,
        resume_data BLOB,
        resume_file_name TEXT,
        resume_mime_type TEXT,
        resume_size INTEGER,
        resume_updated_at INTEGER,
        cover_letter_data BLOB,
        cover_letter_file_name TEXT,
        cover_letter_mime_type TEXT,
        cover_letter_size INTEGER,
        cover_letter_updated_at INTEGER,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_applications_company
        ON applications(company_name);
    CREATE INDEX IF NOT EXISTS idx_applications_status
        ON applications(status);
    CREATE INDEX IF NOT EXISTS idx_applications_date
        ON applications(application_date);

    -- Settings (theme preference)
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
";

const SELECT_COLUMNS: &str = r"
    SELECT id, company_name, company_website, job_title, application_date, status,
           notes, job_link,
           resume_data, resume_file_name, resume_mime_type, resume_size, resume_updated_at,
           cover_letter_data, cover_letter_file_name, cover_letter_mime_type,
           cover_letter_size, cover_letter_updated_at,
           created_at, updated_at
    FROM applications
";

const INSERT_SQL: &str = r"
    INSERT INTO applications
        (id, company_name, company_website, job_title, application_date, status,
         notes, job_link,
         resume_data, resume_file_name, resume_mime_type, resume_size, resume_updated_at,
         cover_letter_data, cover_letter_file_name, cover_letter_mime_type,
         cover_letter_size, cover_letter_updated_at,
         created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
";

/// Overwrites in place so the row keeps its insertion position.
const UPSERT_CLAUSE: &str = r"
    ON CONFLICT(id) DO UPDATE SET
        company_name = excluded.company_name,
        company_website = excluded.company_website,
        job_title = excluded.job_title,
        application_date = excluded.application_date,
        status = excluded.status,
        notes = excluded.notes,
        job_link = excluded.job_link,
        resume_data = excluded.resume_data,
        resume_file_name = excluded.resume_file_name,
        resume_mime_type = excluded.resume_mime_type,
        resume_size = excluded.resume_size,
        resume_updated_at = excluded.resume_updated_at,
        cover_letter_data = excluded.cover_letter_data,
        cover_letter_file_name = excluded.cover_letter_file_name,
        cover_letter_mime_type = excluded.cover_letter_mime_type,
        cover_letter_size = excluded.cover_letter_size,
        cover_letter_updated_at = excluded.cover_letter_updated_at,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
";

/// Local storage repository using SQLite.
pub struct LocalStorage {
    conn: Connection,
}

impl LocalStorage {
    /// Opens or creates the local storage database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened, schema creation fails,
    /// or the file was written by a newer schema version.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        let storage = Self { conn };
        storage.init_schema()?;

        tracing::debug!(path = %path.display(), "Opened application store");

        Ok(storage)
    }

    /// Opens a private in-memory database with the full schema.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create missing tables and indexes, then record the schema version.
    fn init_schema(&self) -> Result<()> {
        let version = self.schema_version()?;
        if version > SCHEMA_VERSION {
            return Err(AppError::Config {
                message: format!(
                    "Database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                ),
            });
        }

        self.conn
            .execute_batch(SCHEMA)
            .map_err(AppError::database)?;

        if (1..=MILLIS_SCHEMA_VERSION).contains(&version) {
            let rescaled = self
                .conn
                .execute(MILLIS_TO_NANOS, [])
                .map_err(AppError::database)?;
            tracing::debug!(rows = rescaled, "Rescaled timestamps to nanoseconds");
        }

        if version < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(AppError::database)?;
            tracing::debug!(from = version, to = SCHEMA_VERSION, "Upgraded schema");
        }

        Ok(())
    }

    /// Schema version recorded in the database file.
    ///
    /// # Errors
    /// Returns error if the pragma cannot be read.
    pub fn schema_version(&self) -> Result<i64> {
        self.conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(AppError::database)
    }

    /// Get total storage size in bytes. In-memory stores report zero.
    ///
    /// # Errors
    /// Returns error if the database file cannot be inspected.
    pub fn get_storage_size(&self) -> Result<u64> {
        let path = match self.conn.path() {
            Some(p) if !p.is_empty() => Path::new(p),
            _ => return Ok(0),
        };
        let metadata = std::fs::metadata(path)
            .map_err(|e| AppError::io("Failed to get storage size", e))?;
        Ok(metadata.len())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        self.conn
            .query_row("SELECT 1 FROM applications WHERE id = ?1", [id], |_| Ok(()))
            .optional()
            .map(|found| found.is_some())
            .map_err(AppError::database)
    }

    /// Bind every column of a record to `sql`.
    fn write(&self, sql: &str, app: &Application) -> Result<usize> {
        let resume = AttachmentColumns::try_from(app.resume.as_ref())?;
        let cover = AttachmentColumns::try_from(app.cover_letter.as_ref())?;

        self.conn
            .execute(
                sql,
                params![
                    &app.id,
                    &app.company_name,
                    &app.company_website,
                    &app.job_title,
                    nanos(&app.application_date)?,
                    app.status.as_str(),
                    &app.notes,
                    &app.job_link,
                    resume.data,
                    resume.file_name,
                    resume.mime_type,
                    resume.size,
                    resume.updated_at,
                    cover.data,
                    cover.file_name,
                    cover.mime_type,
                    cover.size,
                    cover.updated_at,
                    nanos(&app.created_at)?,
                    nanos(&app.updated_at)?,
                ],
            )
            .map_err(AppError::database)
    }

    fn upsert(&self, app: &Application) -> Result<()> {
        self.write(&format!("{INSERT_SQL} {UPSERT_CLAUSE}"), app)?;
        Ok(())
    }

    /// Convert a row to an Application.
    fn row_to_application(row: &Row) -> rusqlite::Result<Application> {
        let status_text: String = row.get(5)?;
        let status = status_text.parse::<ApplicationStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into())
        })?;

        Ok(Application {
            id: row.get(0)?,
            company_name: row.get(1)?,
            company_website: row.get(2)?,
            job_title: row.get(3)?,
            application_date: nanos_column(row, 4)?,
            status,
            notes: row.get(6)?,
            job_link: row.get(7)?,
            resume: attachment_columns(row, 8)?,
            cover_letter: attachment_columns(row, 13)?,
            created_at: nanos_column(row, 18)?,
            updated_at: nanos_column(row, 19)?,
        })
    }
}

impl ApplicationRepository for LocalStorage {
    fn add(&self, application: NewApplication) -> Result<String> {
        let app = application.into_application(Uuid::new_v4().to_string(), now())?;
        self.write(INSERT_SQL, &app)?;

        tracing::info!(id = %app.id, company = %app.company_name, "Application added");

        Ok(app.id)
    }

    fn get(&self, id: &str) -> Result<Option<Application>> {
        self.conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                [id],
                Self::row_to_application,
            )
            .optional()
            .map_err(AppError::database)
    }

    fn list(&self) -> Result<Vec<Application>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid"))
            .map_err(AppError::database)?;

        let rows = stmt
            .query_map([], Self::row_to_application)
            .map_err(AppError::database)?;

        let applications = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(AppError::database)?;

        tracing::debug!(count = applications.len(), "Listed applications");

        Ok(applications)
    }

    fn update(&self, id: &str, patch: ApplicationPatch) -> Result<()> {
        let mut app = self.get(id)?.ok_or_else(|| AppError::not_found(id))?;

        app.apply_patch(patch, now())?;
        self.upsert(&app)?;

        tracing::info!(id = %id, "Application updated");

        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])
            .map_err(AppError::database)?;

        if removed > 0 {
            tracing::info!(id = %id, "Application deleted");
        } else {
            tracing::debug!(id = %id, "Delete of unknown application ignored");
        }

        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM applications", [])
            .map_err(AppError::database)?;

        tracing::info!(removed = removed, "Cleared all applications");

        Ok(())
    }

    fn put(&self, application: &Application) -> Result<bool> {
        let existed = self.exists(&application.id)?;
        self.upsert(application)?;
        Ok(existed)
    }

    fn count(&self) -> Result<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM applications", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|c| usize::try_from(c).unwrap_or_default())
            .map_err(AppError::database)
    }
}

impl SettingsRepository for LocalStorage {
    fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(AppError::database)?;

        tracing::debug!(key = key, "Setting saved");

        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(AppError::database)
    }
}

/// Column values for one attachment slot.
struct AttachmentColumns<'a> {
    data: Option<&'a [u8]>,
    file_name: Option<&'a str>,
    mime_type: Option<&'a str>,
    size: Option<i64>,
    updated_at: Option<i64>,
}

impl<'a> TryFrom<Option<&'a Attachment>> for AttachmentColumns<'a> {
    type Error = AppError;

    fn try_from(attachment: Option<&'a Attachment>) -> Result<Self> {
        Ok(Self {
            data: attachment.map(|a| a.data.as_slice()),
            file_name: attachment.map(|a| a.meta.file_name.as_str()),
            mime_type: attachment.map(|a| a.meta.mime_type.as_str()),
            size: attachment.map(|a| i64::try_from(a.meta.size).unwrap_or(i64::MAX)),
            updated_at: attachment.map(|a| nanos(&a.meta.updated_at)).transpose()?,
        })
    }
}

/// Read five consecutive attachment columns starting at `start`.
///
/// A slot only yields an attachment when both content and metadata are
/// present.
fn attachment_columns(row: &Row, start: usize) -> rusqlite::Result<Option<Attachment>> {
    let data: Option<Vec<u8>> = row.get(start)?;
    let file_name: Option<String> = row.get(start + 1)?;
    let mime_type: Option<String> = row.get(start + 2)?;
    let size: Option<i64> = row.get(start + 3)?;
    let updated_at: Option<i64> = row.get(start + 4)?;

    let (Some(data), Some(file_name), Some(mime_type), Some(updated_ns)) =
        (data, file_name, mime_type, updated_at)
    else {
        return Ok(None);
    };

    let updated_at = DateTime::from_timestamp_nanos(updated_ns);
    let size = size
        .and_then(|s| u64::try_from(s).ok())
        .unwrap_or(data.len() as u64);

    Ok(Some(Attachment {
        data,
        meta: AttachmentMeta {
            file_name,
            mime_type,
            size,
            updated_at,
        },
    }))
}

/// Epoch nanoseconds for a timestamp column.
fn nanos(at: &DateTime<Utc>) -> Result<i64> {
    at.timestamp_nanos_opt().ok_or_else(|| {
        AppError::validation(format!(
            "Timestamp {} is outside the storable range (years 1677 to 2262)",
            at.to_rfc3339()
        ))
    })
}

fn nanos_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    row.get::<_, i64>(idx).map(DateTime::from_timestamp_nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MIME_PDF;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn input() -> NewApplication {
        let mut input = NewApplication::new(
            "Acme",
            "Engineer",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        input.company_website = Some("https://acme.io".into());
        input.notes = Some("Referral from Sam".into());
        input.resume = Some(Attachment::new(vec![0x25, 0x50, 0x44, 0x46], "cv.pdf", MIME_PDF));
        input
    }

    fn strip_identity(app: &Application) -> NewApplication {
        NewApplication::from(app)
    }

    fn settle() {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");

        let storage = LocalStorage::open(&db_path).unwrap();

        let count: i64 = storage
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('applications', 'settings')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(storage.schema_version().unwrap(), SCHEMA_VERSION);
        assert!(storage.get_storage_size().is_ok());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let id = LocalStorage::open(&db_path).unwrap().add(input()).unwrap();
        let storage = LocalStorage::open(&db_path).unwrap();

        assert!(storage.get(&id).unwrap().is_some());
    }

    #[test]
    fn test_upgrade_from_older_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("old.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("PRAGMA user_version = 1;").unwrap();
        }

        let storage = LocalStorage::open(&db_path).unwrap();
        assert_eq!(storage.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(storage.get_setting("theme").unwrap(), None);
    }

    #[test]
    fn test_upgrade_rescales_millisecond_timestamps() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("v3.db");
        let id = LocalStorage::open(&db_path).unwrap().add(input()).unwrap();
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                "UPDATE applications SET
                     application_date = application_date / 1000000,
                     created_at = created_at / 1000000,
                     updated_at = updated_at / 1000000,
                     resume_updated_at = resume_updated_at / 1000000;
                 PRAGMA user_version = 3;",
            )
            .unwrap();
        }

        let storage = LocalStorage::open(&db_path).unwrap();
        let app = storage.get(&id).unwrap().unwrap();
        assert_eq!(storage.schema_version().unwrap(), SCHEMA_VERSION);
        assert_eq!(
            app.application_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("future.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        let err = LocalStorage::open(&db_path).err().unwrap();
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[test]
    fn test_add_then_get_returns_input() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let input = input();
        let id = storage.add(input.clone()).unwrap();

        let app = storage.get(&id).unwrap().unwrap();
        assert!(!app.id.is_empty());
        assert_eq!(app.created_at, app.updated_at);
        assert_eq!(strip_identity(&app), input);
    }

    #[test]
    fn test_add_then_get_keeps_sub_millisecond_dates_and_padded_names() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let date = "2024-01-01T00:00:00.001500Z".parse::<DateTime<Utc>>().unwrap();
        let mut input = NewApplication::new(" Acme ", "Engineer", date);
        let mut resume = Attachment::new(vec![1, 2, 3], "cv.pdf", MIME_PDF);
        resume.meta.updated_at = date;
        input.resume = Some(resume);

        let id = storage.add(input.clone()).unwrap();
        let app = storage.get(&id).unwrap().unwrap();

        assert_eq!(app.application_date.timestamp_subsec_nanos(), 1_500_000);
        assert_eq!(NewApplication::from(&app), input);
    }

    #[test]
    fn test_add_rejects_unstorable_date() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let mut far = input();
        far.application_date = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();

        assert!(matches!(
            storage.add(far),
            Err(AppError::Validation { .. })
        ));
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_add_rejects_missing_title() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let mut bad = input();
        bad.job_title = "  ".into();

        assert!(matches!(
            storage.add(bad),
            Err(AppError::Validation { .. })
        ));
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_get_missing_is_none() {
        let storage = LocalStorage::open_in_memory().unwrap();
        assert!(storage.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let mut ids = Vec::new();
        for company in ["Zeta", "Alpha", "Mid"] {
            let mut next = input();
            next.company_name = company.into();
            ids.push(storage.add(next).unwrap());
        }

        let listed: Vec<_> = storage.list().unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_empty_update_only_touches_updated_at() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let id = storage.add(input()).unwrap();
        let before = storage.get(&id).unwrap().unwrap();

        settle();
        storage.update(&id, ApplicationPatch::default()).unwrap();
        let after = storage.get(&id).unwrap().unwrap();

        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            Application {
                updated_at: before.updated_at,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_status_update_changes_only_status() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let id = storage.add(input()).unwrap();
        let before = storage.get(&id).unwrap().unwrap();

        settle();
        storage
            .update(
                &id,
                ApplicationPatch {
                    status: Some(ApplicationStatus::Interview),
                    ..ApplicationPatch::default()
                },
            )
            .unwrap();
        let after = storage.get(&id).unwrap().unwrap();

        assert_eq!(after.status, ApplicationStatus::Interview);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            Application {
                status: before.status,
                updated_at: before.updated_at,
                ..after
            },
            before
        );
    }

    #[test]
    fn test_update_can_clear_attachment() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let id = storage.add(input()).unwrap();

        let patch = ApplicationPatch {
            resume: Some(None),
            ..ApplicationPatch::default()
        };
        storage.update(&id, patch).unwrap();

        let app = storage.get(&id).unwrap().unwrap();
        assert!(app.resume.is_none());

        let (data, name): (Option<Vec<u8>>, Option<String>) = storage
            .conn
            .query_row(
                "SELECT resume_data, resume_file_name FROM applications WHERE id = ?1",
                [&id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(data.is_none() && name.is_none());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let err = storage
            .update("missing", ApplicationPatch::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let id = storage.add(input()).unwrap();

        storage.delete("missing").unwrap();
        storage.delete("missing").unwrap();
        assert_eq!(storage.count().unwrap(), 1);

        storage.delete(&id).unwrap();
        storage.delete(&id).unwrap();
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_clear_all_keeps_settings() {
        let storage = LocalStorage::open_in_memory().unwrap();
        storage.add(input()).unwrap();
        storage.add(input()).unwrap();
        storage.save_setting("theme", "dark").unwrap();

        storage.clear_all().unwrap();

        assert_eq!(storage.count().unwrap(), 0);
        assert_eq!(storage.get_setting("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_put_reports_overwrite_and_keeps_position() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let first = storage.add(input()).unwrap();
        let second = storage.add(input()).unwrap();

        let mut app = storage.get(&first).unwrap().unwrap();
        app.job_title = "Staff Engineer".into();
        assert!(storage.put(&app).unwrap());

        let listed = storage.list().unwrap();
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[0].job_title, "Staff Engineer");
        assert_eq!(listed[1].id, second);

        app.id = "fresh".into();
        assert!(!storage.put(&app).unwrap());
        assert_eq!(storage.count().unwrap(), 3);
    }

    #[test]
    fn test_settings_overwrite() {
        let storage = LocalStorage::open_in_memory().unwrap();
        assert_eq!(storage.get_setting("theme").unwrap(), None);

        storage.save_setting("theme", "light").unwrap();
        storage.save_setting("theme", "dark").unwrap();

        assert_eq!(storage.get_setting("theme").unwrap().as_deref(), Some("dark"));
        let rows: i64 = storage
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_attachment_presence_matches_metadata() {
        let storage = LocalStorage::open_in_memory().unwrap();
        let id = storage.add(input()).unwrap();
        let app = storage.get(&id).unwrap().unwrap();

        let resume = app.resume.unwrap();
        assert_eq!(resume.data, vec![0x25, 0x50, 0x44, 0x46]);
        assert_eq!(resume.meta.size, 4);
        assert!(app.cover_letter.is_none());
    }
}
