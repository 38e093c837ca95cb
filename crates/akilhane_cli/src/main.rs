//! Akilhane CLI
//!
//! Command-line tools for the Akilhane local store.
//!
//! # Commands
//!
//! - `info` - Record counts and storage size
//! - `subjects`, `questions`, `flashcards` - Browse and edit content
//! - `export`, `import` - JSON snapshots
//! - `compact` - Rewrite the journal
//! - `status`, `sync`, `ping` - Cloud sync

mod commands;

use clap::{Parser, Subcommand};
use commands::remote::RemoteArgs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Akilhane local store and sync tools.
#[derive(Parser)]
#[command(name = "akilhane")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long, env = "AKILHANE_DATA_DIR", default_value = ".akilhane")]
    data_dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display record counts and storage size
    Info {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Manage subjects
    Subjects {
        #[command(subcommand)]
        action: SubjectAction,
    },

    /// Manage questions
    Questions {
        #[command(subcommand)]
        action: QuestionAction,
    },

    /// Review flashcards
    Flashcards {
        #[command(subcommand)]
        action: FlashcardAction,
    },

    /// Write every collection to a JSON snapshot
    Export {
        /// Output file (stdout if omitted)
        file: Option<PathBuf>,
    },

    /// Merge a JSON snapshot into the store
    Import {
        /// Snapshot file
        file: PathBuf,
    },

    /// Rewrite the journal to reclaim space
    Compact,

    /// Compare local and cloud contents
    Status {
        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Run a sync pass
    Sync {
        /// Direction of the pass
        #[arg(value_enum, default_value = "full")]
        direction: commands::sync::Direction,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Check that the remote store is reachable
    Ping {
        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[derive(Subcommand)]
enum SubjectAction {
    /// List subjects
    List,
    /// Add a subject
    Add {
        /// Subject name
        #[arg(short, long)]
        name: String,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Category
        #[arg(long, default_value = "")]
        category: String,
        /// Difficulty
        #[arg(long, default_value = "")]
        difficulty: String,
    },
}

#[derive(Subcommand)]
enum QuestionAction {
    /// List questions
    List {
        /// Only questions of this subject (case-insensitive)
        #[arg(short, long)]
        subject: Option<String>,
    },
    /// Check every question's invariants
    Validate,
    /// Remove questions whose id repeats
    Dedup,
}

#[derive(Subcommand)]
enum FlashcardAction {
    /// List flashcards due for review
    Due,
    /// Record a review
    Review {
        /// Flashcard id
        id: String,
        /// Confidence from 1 (forgot) to 5 (easy)
        confidence: u8,
    },
}

/// Builds the log filter. A valid `RUST_LOG` wins over `--verbose`.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = log_filter(cli.verbose, std::env::var("RUST_LOG").ok().as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let dir = cli.data_dir.as_path();
    match cli.command {
        Commands::Info { format } => commands::info::run(dir, &format)?,
        Commands::Subjects { action } => match action {
            SubjectAction::List => commands::subjects::list(dir)?,
            SubjectAction::Add {
                name,
                description,
                category,
                difficulty,
            } => commands::subjects::add(dir, name, description, category, difficulty)?,
        },
        Commands::Questions { action } => match action {
            QuestionAction::List { subject } => commands::questions::list(dir, subject.as_deref())?,
            QuestionAction::Validate => commands::questions::validate(dir)?,
            QuestionAction::Dedup => commands::questions::dedup(dir)?,
        },
        Commands::Flashcards { action } => match action {
            FlashcardAction::Due => commands::flashcards::due(dir)?,
            FlashcardAction::Review { id, confidence } => {
                commands::flashcards::review(dir, &id, confidence)?
            }
        },
        Commands::Export { file } => commands::snapshot::export(dir, file.as_deref())?,
        Commands::Import { file } => commands::snapshot::import(dir, &file)?,
        Commands::Compact => commands::compact::run(dir)?,
        Commands::Status { remote } => commands::sync::status(dir, &remote).await?,
        Commands::Sync { direction, remote } => commands::sync::run(dir, direction, &remote).await?,
        Commands::Ping { remote } => commands::sync::ping(dir, &remote).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_overrides_verbose() {
        assert_eq!(log_filter(true, Some("warn")).to_string(), "warn");
        assert_eq!(
            log_filter(false, Some("akilhane_core=trace")).to_string(),
            "akilhane_core=trace"
        );
    }

    #[test]
    fn verbose_applies_without_rust_log() {
        assert_eq!(log_filter(true, None).to_string(), "debug");
        assert_eq!(log_filter(false, None).to_string(), "info");
        assert_eq!(log_filter(true, Some("  ")).to_string(), "debug");
    }
}
