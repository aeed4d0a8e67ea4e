//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::application::OutputFormat;
use crate::domain::{ApplicationStatus, AttachmentKind, Theme};

/// Job Tracker - Keep track of job applications, resumes and cover letters.
///
/// Quick start: job-tracker add "Acme" "Engineer" | list | show <id> | export
#[derive(Parser, Debug)]
#[command(name = "job-tracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: table, markdown, or json.
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Configuration file (defaults to ~/.job-tracker/config.toml).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, database and default config file.
    Init,

    /// Add a new application.
    Add {
        /// Company name.
        company: String,

        /// Job title.
        title: String,

        /// Application date (YYYY-MM-DD or RFC 3339, defaults to today).
        #[arg(short, long)]
        date: Option<String>,

        /// Status: applied, interview, offer, rejected, withdrawn.
        #[arg(short, long, default_value = "applied")]
        status: ApplicationStatus,

        /// Company website.
        #[arg(short, long)]
        website: Option<String>,

        /// Link to the job posting.
        #[arg(short, long)]
        link: Option<String>,

        /// Free-form notes.
        #[arg(short, long)]
        notes: Option<String>,

        /// Resume to attach (PDF, DOC or DOCX).
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Cover letter to attach (PDF, DOC or DOCX).
        #[arg(long)]
        cover_letter: Option<PathBuf>,
    },

    /// List applications, optionally filtered.
    List {
        /// Case-insensitive search in company name and job title.
        #[arg(short, long)]
        search: Option<String>,

        /// Only show applications with this status.
        #[arg(long)]
        status: Option<ApplicationStatus>,

        /// Earliest application date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest application date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Show one application in detail.
    Show {
        /// Application ID (full or unique prefix).
        id: String,
    },

    /// Change fields of an application. An empty value clears an optional
    /// field.
    Update {
        /// Application ID (full or unique prefix).
        id: String,

        /// New company name.
        #[arg(long)]
        company: Option<String>,

        /// New job title.
        #[arg(long)]
        title: Option<String>,

        /// New application date.
        #[arg(short, long)]
        date: Option<String>,

        /// New status.
        #[arg(short, long)]
        status: Option<ApplicationStatus>,

        /// New company website ("" clears).
        #[arg(short, long)]
        website: Option<String>,

        /// New job posting link ("" clears).
        #[arg(short, long)]
        link: Option<String>,

        /// New notes ("" clears).
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Copy an application as a new "Applied" entry.
    Duplicate {
        /// Application ID (full or unique prefix).
        id: String,
    },

    /// Delete an application.
    Delete {
        /// Application ID (full or unique prefix).
        id: String,
    },

    /// Delete every application. Settings are kept.
    Reset {
        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },

    /// Show counts per status.
    Stats,

    /// Export all applications, attachments included, to a JSON file.
    Export {
        /// Output file path (defaults to the exports directory).
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Print the JSON to stdout instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Import applications from an export or legacy JSON file.
    Import {
        /// JSON file to import.
        file: PathBuf,
    },

    /// Manage resume and cover letter attachments.
    Attachment {
        #[command(subcommand)]
        action: AttachmentAction,
    },

    /// Show or change the theme preference.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Show the paths being used.
    Paths,
}

#[derive(Subcommand, Debug)]
pub enum AttachmentAction {
    /// Attach a file to an application.
    Add {
        /// Application ID (full or unique prefix).
        id: String,

        /// Slot: resume or cover-letter.
        kind: AttachmentKind,

        /// File to attach (PDF, DOC or DOCX).
        file: PathBuf,
    },

    /// Remove an attachment.
    Remove {
        /// Application ID (full or unique prefix).
        id: String,

        /// Slot: resume or cover-letter.
        kind: AttachmentKind,
    },

    /// Save an attachment to disk.
    Save {
        /// Application ID (full or unique prefix).
        id: String,

        /// Slot: resume or cover-letter.
        kind: AttachmentKind,

        /// Output path (defaults to the stored file name).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Default)]
pub enum ThemeAction {
    /// Print the current theme.
    #[default]
    Show,

    /// Set the theme.
    Set {
        /// light or dark.
        theme: Theme,
    },

    /// Switch between light and dark.
    Toggle,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::parse_from([
            "job-tracker", "list", "--status", "interview", "--from", "2024-01-01",
        ]);
        match cli.command {
            Commands::List { status, from, .. } => {
                assert_eq!(status, Some(ApplicationStatus::Interview));
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_attachment_kind() {
        let cli = Cli::parse_from(["job-tracker", "attachment", "remove", "abc", "cover-letter"]);
        assert!(matches!(
            cli.command,
            Commands::Attachment {
                action: AttachmentAction::Remove {
                    kind: AttachmentKind::CoverLetter,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!(Cli::try_parse_from(["job-tracker", "list", "--status", "ghosted"]).is_err());
    }
}
