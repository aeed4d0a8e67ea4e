//! Job Tracker - Keep track of job applications from the command line.
//!
//! Applications, their resume and cover letter attachments, and the theme
//! preference live in a local `SQLite` database. The whole tracker can be
//! exported to a single JSON file and imported again, including files from
//! the older `jobs` format.
//!
//! QUICK START:
//!   job-tracker add "Acme" "Engineer" --resume cv.pdf
//!   job-tracker list --status interview
//!   job-tracker update <id> --status offer
//!   job-tracker export -o backup.json
//!   job-tracker import backup.json

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::codec::parse_timestamp;
use application::{
    describe_attachment, format_application_markdown, format_applications_json,
    format_applications_table, format_stats, short_id, OutputFormat, TrackerService,
};
use cli::{AttachmentAction, Cli, Commands, ThemeAction};
use domain::models::now;
use domain::{
    AppError, Application, ApplicationPatch, AttachmentKind, FilterOptions, NewApplication,
};
use infrastructure::{
    config_file_path, ensure_config_exists, load_config, load_config_from_file, LocalStorage,
};

type Service = TrackerService<LocalStorage>;

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli.output_format().map_err(AppError::validation)?;

    let config_path = cli.config.clone().unwrap_or_else(config_file_path);
    let config = match &cli.config {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };

    let service = TrackerService::new(config)?;
    dispatch(&service, cli.command, format, &config_path)
}

/// Run one command against the open database.
fn dispatch(
    service: &Service,
    command: Commands,
    format: OutputFormat,
    config_path: &Path,
) -> domain::Result<()> {
    match command {
        Commands::Init => cmd_init(service, config_path)?,
        Commands::Add {
            company,
            title,
            date,
            status,
            website,
            link,
            notes,
            resume,
            cover_letter,
        } => {
            let mut input =
                NewApplication::new(company.trim(), title.trim(), parse_date(date.as_deref())?);
            input.status = status;
            input.company_website = website;
            input.job_link = link;
            input.notes = notes.and_then(clearable);
            input.resume = resume
                .map(|p| service.read_attachment(AttachmentKind::Resume, &p))
                .transpose()?;
            input.cover_letter = cover_letter
                .map(|p| service.read_attachment(AttachmentKind::CoverLetter, &p))
                .transpose()?;

            let id = service.add(input)?;
            println!("{} Added application {}", "✓".green().bold(), id.cyan());
        }
        Commands::List {
            search,
            status,
            from,
            to,
        } => {
            let filter = FilterOptions {
                search: search.unwrap_or_default(),
                status,
                date_from: from,
                date_to: to,
            };
            cmd_list(service, &filter, format)?;
        }
        Commands::Show { id } => {
            let app = service.get(&service.resolve_id(&id)?)?;
            print_application(&app, format)?;
        }
        Commands::Update {
            id,
            company,
            title,
            date,
            status,
            website,
            link,
            notes,
        } => {
            let id = service.resolve_id(&id)?;
            let patch = ApplicationPatch {
                company_name: company,
                job_title: title,
                application_date: date.as_deref().map(|d| parse_date(Some(d))).transpose()?,
                status,
                company_website: website.map(clearable),
                job_link: link.map(clearable),
                notes: notes.map(clearable),
                ..ApplicationPatch::default()
            };

            if patch.is_empty() {
                tracing::warn!(id = %id, "No fields given; only the update time changes");
            }

            service.update(&id, patch)?;
            println!("{} Updated {}", "✓".green().bold(), short_id(&id).cyan());
        }
        Commands::Duplicate { id } => {
            let new_id = service.duplicate(&service.resolve_id(&id)?)?;
            println!("{} Created copy {}", "✓".green().bold(), new_id.cyan());
        }
        Commands::Delete { id } => match service.resolve_id(&id) {
            Ok(id) => {
                service.delete(&id)?;
                println!("{} Deleted {}", "✓".green().bold(), short_id(&id).cyan());
            }
            Err(e) if e.is_not_found() => println!("Nothing to delete: {id}"),
            Err(e) => return Err(e),
        },
        Commands::Reset { yes } => {
            if !yes {
                return Err(AppError::validation(
                    "Refusing to delete every application without --yes",
                ));
            }
            let removed = service.reset()?;
            println!("{} Removed {removed} application(s)", "✓".green().bold());
        }
        Commands::Stats => {
            let stats = service.stats()?;
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&stats).map_err(AppError::json_parse)?
                ),
                OutputFormat::Table | OutputFormat::Markdown => {
                    println!("{}", format_stats(&stats));
                }
            }
        }
        Commands::Export { stdout: true, .. } => println!("{}", service.export_json()?),
        Commands::Export { output, .. } => {
            let (path, count) = service.export_to_file(output.as_deref())?;
            println!(
                "{} Exported {} application(s) to {}",
                "✓".green().bold(),
                count,
                path.display()
            );
        }
        Commands::Import { file } => cmd_import(service, &file)?,
        Commands::Attachment { action } => cmd_attachment(service, action)?,
        Commands::Theme { action } => cmd_theme(service, action.unwrap_or_default())?,
        Commands::Paths => cmd_paths(service, config_path)?,
    }

    Ok(())
}

/// Create config file and exports directory next to the database.
fn cmd_init(service: &Service, config_path: &Path) -> domain::Result<()> {
    if ensure_config_exists(config_path)? {
        println!("{} Created {}", "✓".green().bold(), config_path.display());
    } else {
        println!("  Config already exists: {}", config_path.display());
    }

    let config = service.config();
    std::fs::create_dir_all(config.exports_dir())
        .map_err(|e| AppError::io("Failed to create exports directory", e))?;

    let db_path = config.storage_db_path();
    println!(
        "{} Database ready at {} ({} application(s))",
        "✓".green().bold(),
        db_path.display(),
        service.stats()?.total
    );

    Ok(())
}

/// List applications command.
fn cmd_list(
    service: &Service,
    filter: &FilterOptions,
    format: OutputFormat,
) -> domain::Result<()> {
    let applications = service.list(filter)?;

    match format {
        OutputFormat::Table => {
            if applications.is_empty() {
                if filter.is_active() {
                    println!("No applications match the filter.");
                } else {
                    println!("No applications found.");
                }
                return Ok(());
            }
            println!("{}", format_applications_table(&applications));
            println!();
            let noun = if filter.is_active() {
                "matching application(s)"
            } else {
                "application(s)"
            };
            println!("{} {noun}", applications.len().to_string().cyan());
        }
        OutputFormat::Markdown => {
            for app in &applications {
                println!("{}", format_application_markdown(app));
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                format_applications_json(&applications).map_err(AppError::json_parse)?
            );
        }
    }

    Ok(())
}

fn print_application(app: &Application, format: OutputFormat) -> domain::Result<()> {
    let output = match format {
        OutputFormat::Table | OutputFormat::Markdown => format_application_markdown(app),
        OutputFormat::Json => format_applications_json(std::slice::from_ref(app))
            .map_err(AppError::json_parse)?,
    };

    println!("{output}");
    Ok(())
}

/// Import command.
fn cmd_import(service: &Service, file: &Path) -> domain::Result<()> {
    let summary = service.import_from_file(file)?;

    println!(
        "{} Imported {} application(s) ({} overwritten)",
        "✓".green().bold(),
        summary.imported_count,
        summary.overwritten_count
    );

    if !summary.errors.is_empty() {
        println!();
        println!("{} {} skipped:", "⚠".yellow().bold(), summary.errors.len());
        for error in &summary.errors {
            println!("  - {}", error.yellow());
        }
    }

    Ok(())
}

/// Attachment subcommands.
fn cmd_attachment(service: &Service, action: AttachmentAction) -> domain::Result<()> {
    match action {
        AttachmentAction::Add { id, kind, file } => {
            let id = service.resolve_id(&id)?;
            let meta = service.attach(&id, kind, &file)?;
            println!(
                "{} Attached {}: {}",
                "✓".green().bold(),
                kind.label(),
                describe_attachment(&meta)
            );
        }
        AttachmentAction::Remove { id, kind } => {
            let id = service.resolve_id(&id)?;
            service.detach(&id, kind)?;
            println!("{} Removed {}", "✓".green().bold(), kind.label());
        }
        AttachmentAction::Save { id, kind, output } => {
            let id = service.resolve_id(&id)?;
            let attachment = service.attachment(&id, kind)?.ok_or_else(|| {
                AppError::InvalidData {
                    message: format!("Application {} has no {}", short_id(&id), kind.label()),
                }
            })?;

            let path = output.unwrap_or_else(|| safe_file_name(&attachment.meta.file_name, kind));
            std::fs::write(&path, &attachment.data)
                .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

            println!(
                "{} Saved {} to {}",
                "✓".green().bold(),
                kind.label(),
                path.display()
            );
        }
    }

    Ok(())
}

/// Theme subcommands.
fn cmd_theme(service: &Service, action: ThemeAction) -> domain::Result<()> {
    let theme = match action {
        ThemeAction::Show => service.theme()?,
        ThemeAction::Set { theme } => {
            service.set_theme(theme)?;
            theme
        }
        ThemeAction::Toggle => service.toggle_theme()?,
    };

    println!("Theme: {}", theme.to_string().cyan());
    Ok(())
}

/// Show paths command.
fn cmd_paths(service: &Service, config_path: &Path) -> domain::Result<()> {
    let config = service.config();

    println!("{}", "📂 Job Tracker Paths".bold());
    println!();
    println!("  Data dir: {}", config.data_dir().display());
    println!(
        "  Database: {} ({} bytes)",
        config.storage_db_path().display(),
        service.storage_size()?
    );

    if config_path.exists() {
        println!("  Config:   {}", config_path.display());
    } else {
        println!("  Config:   {} {}", config_path.display(), "(defaults, run init)".dimmed());
    }
    println!("  Exports:  {}", config.exports_dir().display());

    Ok(())
}

/// Parse a user-supplied date, defaulting to today at midnight UTC.
fn parse_date(value: Option<&str>) -> domain::Result<DateTime<Utc>> {
    match value {
        Some(text) => parse_timestamp(text).ok_or_else(|| {
            AppError::validation(format!("Invalid date: {text}. Use YYYY-MM-DD"))
        }),
        None => now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .ok_or_else(|| AppError::validation("Could not determine today's date")),
    }
}

/// An empty CLI value clears an optional field.
fn clearable(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}

/// Stored file name without any directory parts.
fn safe_file_name(stored: &str, kind: AttachmentKind) -> PathBuf {
    Path::new(stored)
        .file_name()
        .map_or_else(|| PathBuf::from(kind.default_file_name()), PathBuf::from)
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
