//! Output formatting for tracked applications.
//!
//! Supports multiple output formats: Markdown, JSON, and table view.

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Application, ApplicationStatus, AttachmentMeta, Stats};

use super::codec::format_timestamp;
use super::export::ExportedApplication;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// Human-readable Markdown format.
    Markdown,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: table, markdown, json")),
        }
    }
}

/// Formats a single application as Markdown.
pub fn format_application_markdown(app: &Application) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} at {}\n\n", app.job_title, app.company_name));
    out.push_str(&format!("**ID:** {}\n", app.id));
    out.push_str(&format!("**Status:** {}\n", app.status));
    out.push_str(&format!(
        "**Applied:** {}\n",
        app.application_date.format("%Y-%m-%d")
    ));

    if let Some(ref website) = app.company_website {
        out.push_str(&format!("**Website:** {website}\n"));
    }
    if let Some(ref link) = app.job_link {
        out.push_str(&format!("**Job posting:** {link}\n"));
    }

    out.push_str(&format!(
        "**Created:** {}\n**Updated:** {}\n\n",
        app.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        app.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(ref notes) = app.notes {
        out.push_str("## Notes\n\n");
        out.push_str(notes);
        out.push_str("\n\n");
    }

    if app.resume.is_some() || app.cover_letter.is_some() {
        out.push_str("## Attachments\n\n");
        let slots = [("Resume", &app.resume), ("Cover letter", &app.cover_letter)];
        for (label, attachment) in slots {
            if let Some(a) = attachment {
                out.push_str(&format!("- **{label}:** {}\n", describe_attachment(&a.meta)));
            }
        }
        out.push('\n');
    }

    out
}

/// Formats applications as JSON in export field naming, without
/// attachment content.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_applications_json(
    applications: &[Application],
) -> Result<String, serde_json::Error> {
    let listing: Vec<ExportedApplication> = applications
        .iter()
        .map(|app| ExportedApplication {
            resume_blob: None,
            cover_letter_blob: None,
            ..ExportedApplication::from(app)
        })
        .collect();

    serde_json::to_string_pretty(&listing)
}

/// Formats a table listing of applications.
pub fn format_applications_table(applications: &[Application]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Applied", "Company", "Position", "Status", "Files"]);

    for app in applications {
        let files = [
            app.resume.as_ref().map(|_| "CV"),
            app.cover_letter.as_ref().map(|_| "CL"),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        table.add_row(vec![
            short_id(&app.id).to_string(),
            app.application_date.format("%Y-%m-%d").to_string(),
            truncate(&app.company_name, 24),
            truncate(&app.job_title, 30),
            app.status.to_string(),
            if files.is_empty() { "-".to_string() } else { files },
        ]);
    }

    table.to_string()
}

/// Formats status counts for display.
pub fn format_stats(stats: &Stats) -> String {
    let mut out = format!(
        "{}\n  Total: {}",
        "📊 Statistics".bold(),
        stats.total.to_string().cyan()
    );

    for status in ApplicationStatus::ALL {
        out.push_str(&format!(
            "\n  {}: {}",
            status,
            colorize_status(status, &stats.count(status).to_string())
        ));
    }

    out
}

/// One-line attachment summary, e.g.
/// `cv.pdf (application/pdf, 12.3 KB, updated 2024-01-01T00:00:00.000Z)`.
pub fn describe_attachment(meta: &AttachmentMeta) -> String {
    format!(
        "{} ({}, {}, updated {})",
        meta.file_name,
        meta.mime_type,
        format_size(meta.size),
        format_timestamp(&meta.updated_at)
    )
}

/// Human-readable byte size.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

fn colorize_status(status: ApplicationStatus, text: &str) -> ColoredString {
    match status {
        ApplicationStatus::Applied => text.blue(),
        ApplicationStatus::Interview => text.yellow(),
        ApplicationStatus::Offer => text.green(),
        ApplicationStatus::Rejected => text.red(),
        ApplicationStatus::Withdrawn => text.dimmed(),
    }
}

/// First eight characters of an id.
pub fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
