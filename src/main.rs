//! shoebox - catalog a tree of photos, media and documents.
//!
//! Usage:
//!   shoebox scan --original /2024        Ingest originals below a directory
//!   shoebox scan --export /web           Reconcile exported derivatives
//!   shoebox classify image/jpeg ...      Show the category of MIME types
//!   shoebox groups                       List file groups with entry counts
//!   shoebox --help                       Show help

use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shoebox_catalog::{Catalog, CatalogStore};
use shoebox_core::{CatalogConfig, FileCategory, ScanRequest, ScanResponses};
use shoebox_ingest::{IngestProgress, ScanCoordinator};

#[derive(Parser)]
#[command(
    name = "shoebox",
    version,
    about = "Ingest a directory tree of media and documents into a searchable catalog",
    long_about = "shoebox walks a tree of original files, extracts their embedded \
                  metadata and records them in a SQLite catalog. Exported \
                  derivatives are linked back to their originals by document id."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest originals and/or reconcile exports
    Scan {
        /// Original directory relative to the original root, e.g. /2024/summer
        #[arg(long)]
        original: Option<String>,

        /// Export directory relative to the export root, e.g. /web
        #[arg(long)]
        export: Option<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Hide the progress line
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show which category MIME types fall into
    Classify {
        /// MIME types to classify
        #[arg(required = true)]
        mime_types: Vec<String>,
    },

    /// List file groups with their entry counts
    Groups {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Where the configuration comes from and what to override in it.
#[derive(Args)]
struct CatalogArgs {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root of the original tree
    #[arg(long)]
    original_root: Option<PathBuf>,

    /// Root of the export tree
    #[arg(long)]
    export_root: Option<PathBuf>,

    /// Catalog database file
    #[arg(long)]
    database: Option<PathBuf>,
}

impl CatalogArgs {
    fn load(&self) -> Result<CatalogConfig> {
        let mut config = match self.config {
            Some(ref path) => CatalogConfig::load(path)
                .with_context(|| format!("Cannot load config {}", path.display()))?,
            None => {
                let default = CatalogConfig::default_path();
                if default.exists() {
                    CatalogConfig::load(&default)
                        .with_context(|| format!("Cannot load config {}", default.display()))?
                } else {
                    CatalogConfig::default()
                }
            }
        };
        if let Some(ref root) = self.original_root {
            config.original_root = root.clone();
        }
        if let Some(ref root) = self.export_root {
            config.export_root = Some(root.clone());
        }
        if let Some(ref database) = self.database {
            config.database = database.clone();
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            original,
            export,
            catalog,
            format,
            quiet,
        } => {
            let request = ScanRequest {
                original_directory: original,
                export_directory: export,
            };
            run_scan(&request, &catalog.load()?, format, quiet)?;
        }
        Command::Classify { mime_types } => run_classify(&mime_types),
        Command::Groups { catalog, format } => {
            run_groups(&catalog.load()?.database, format)?;
        }
    }

    Ok(())
}

/// Run a scan request and print its responses.
fn run_scan(
    request: &ScanRequest,
    config: &CatalogConfig,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if request.original_directory.is_none() && request.export_directory.is_none() {
        bail!("Nothing to scan: pass --original and/or --export");
    }

    info!(?request, original_root = %config.original_root.display(), "scan requested");
    let mut coordinator =
        ScanCoordinator::from_config(config.clone()).context("Cannot open catalog")?;

    let progress = (!quiet).then(|| {
        let mut rx = coordinator.subscribe();
        thread::spawn(move || loop {
            match rx.blocking_recv() {
                Ok(snapshot) => print_progress(&snapshot),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        })
    });

    let result = coordinator.scan(request);
    // Dropping the coordinator closes the progress channel.
    drop(coordinator);
    if let Some(handle) = progress {
        let _ = handle.join();
        eprintln!();
    }
    let responses = result.context("Scan failed")?;

    match format {
        OutputFormat::Text => print_responses(&responses),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&responses)?),
    }

    if !responses.success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_progress(progress: &IngestProgress) {
    eprint!(
        "\r[{}/{}] {} scanned, {} new, {} failed ({:.1} files/s) {}",
        progress.directories_done,
        progress.directories_total,
        progress.files_scanned,
        progress.files_new,
        progress.files_failed,
        progress.files_per_second(),
        truncate(&progress.current_path.display().to_string(), 40),
    );
}

fn print_responses(responses: &ScanResponses) {
    if let Some(ref original) = responses.original {
        println!();
        println!("{}", "─".repeat(60));
        println!(" Originals: {}", status(original.success));
        println!("{}", "─".repeat(60));
        println!(
            " {} scanned, {} new, {} failed",
            original.scanned_files_count,
            original.new_files_count,
            original.failed_files.len()
        );
        let total: u64 = original.successful_files.iter().map(|e| e.file_size).sum();
        if total > 0 {
            println!(" {} added", format_size(total));
        }
        for entry in &original.successful_files {
            println!(
                "   + {:<10} {}/{} ({})",
                entry.category.to_string(),
                entry.file_path.trim_end_matches('/'),
                entry.filename,
                format_size(entry.file_size)
            );
        }
        for path in &original.failed_files {
            println!("   ! {path}");
        }
        print_error_message(&original.error_message);
    }

    if let Some(ref export) = responses.export {
        println!();
        println!("{}", "─".repeat(60));
        println!(" Exports: {}", status(export.success));
        println!("{}", "─".repeat(60));
        println!(
            " {} scanned, {} new, {} orphaned",
            export.scanned_files_count,
            export.new_files_count,
            export.orphaned_files.len()
        );
        for record in &export.successful_files {
            println!(
                "   + {}/{} -> entry {}",
                record.file_path.trim_end_matches('/'),
                record.filename,
                record.entry_id
            );
        }
        for name in &export.orphaned_files {
            println!("   ? {name} (no original)");
        }
        print_error_message(&export.error_message);
    }
    println!();
}

fn print_error_message(message: &str) {
    if message.is_empty() {
        return;
    }
    println!();
    for line in message.lines() {
        println!(" {line}");
    }
}

fn status(success: bool) -> &'static str {
    if success { "complete" } else { "incomplete" }
}

/// Print the category of each MIME type.
fn run_classify(mime_types: &[String]) {
    for mime in mime_types {
        let category = FileCategory::from_mime(Some(mime.as_str()));
        println!("{:<40} {:<12} {}", mime, category.to_string(), category.description());
    }
}

/// List file groups with their entry counts.
fn run_groups(database: &Path, format: OutputFormat) -> Result<()> {
    if !database.exists() {
        bail!("No catalog at {}", database.display());
    }
    let catalog = Catalog::open(database).context("Cannot open catalog")?;
    let groups = catalog.list_groups().context("Cannot list groups")?;

    match format {
        OutputFormat::Text => {
            if groups.is_empty() {
                println!(" No groups cataloged.");
            }
            for summary in &groups {
                println!(
                    " {:<50} {:>6} entries",
                    truncate(&summary.group.path, 50),
                    summary.entry_count
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&groups)?),
    }
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Keep the tail of a string, which is the informative end of a path.
fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - (max_len - 1)).collect();
        format!("…{tail}")
    }
}
