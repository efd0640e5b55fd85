//! Command-line interface for clean-folder.
//!
//! This module handles:
//! - Argument parsing (exactly one root folder, plus options)
//! - Building the run configuration from the config file and flags
//! - Running the sort or the dry run
//! - Printing the report

use crate::config::{CollisionPolicy, SortConfig};
use crate::error::SortResult;
use crate::output::OutputFormatter;
use crate::sorter::Sorter;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Sort a folder into category subfolders, normalize file names and unpack archives.
#[derive(Debug, Parser)]
#[command(name = "clean-folder", version, about)]
pub struct Cli {
    /// The folder to clean.
    pub folder: PathBuf,

    /// TOML file with policies and file filters.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// What to do when a normalized name is already taken.
    #[arg(long, value_enum)]
    pub collision: Option<CollisionPolicy>,

    /// Keep archives that could not be unpacked instead of deleting them.
    #[arg(long)]
    pub keep_failed_archives: bool,

    /// Do not unpack archives found inside unpacked archives.
    #[arg(long)]
    pub no_nested_archives: bool,

    /// Show what would be moved without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanCommand {
    /// Sort, prune and unpack.
    Sort,
    /// Only classify and report what would happen.
    DryRun,
}

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// The command selected by the flags.
    pub fn command(&self) -> CleanCommand {
        if self.dry_run {
            CleanCommand::DryRun
        } else {
            CleanCommand::Sort
        }
    }

    pub fn report_format(&self) -> ReportFormat {
        if self.json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        }
    }

    /// Loads the config file, if any, and applies flag overrides.
    pub fn load_config(&self) -> SortResult<SortConfig> {
        let mut config = SortConfig::load(self.config.as_deref())?;
        if let Some(collision) = self.collision {
            config.policy.collision = collision;
        }
        if self.keep_failed_archives {
            config.policy.delete_failed_archives = false;
        }
        if self.no_nested_archives {
            config.policy.expand_nested_archives = false;
        }
        Ok(config)
    }
}

/// Runs one command over `dir_path` and returns the rendered report.
///
/// Status lines, warnings and the summary table go to standard error; the
/// returned string is what belongs on standard output.
///
/// # Arguments
///
/// * `command` - Sort for real, or only plan a dry run
/// * `dir_path` - The root folder to clean
/// * `config` - Policies and file filters for this run
/// * `format` - Plain Known/Unknown text or JSON
///
/// # Errors
///
/// Returns the first fatal [`SortError`](crate::SortError); archive
/// failures are only reported.
///
/// # Examples
///
/// ```no_run
/// use clean_folder::cli::{run_cli, CleanCommand, ReportFormat};
/// use clean_folder::config::SortConfig;
/// use std::path::Path;
///
/// let text = run_cli(
///     CleanCommand::Sort,
///     Path::new("/path/to/folder"),
///     &SortConfig::default(),
///     ReportFormat::Text,
/// )?;
/// print!("{text}");
/// # Ok::<(), clean_folder::SortError>(())
/// ```
pub fn run_cli(
    command: CleanCommand,
    dir_path: &Path,
    config: &SortConfig,
    format: ReportFormat,
) -> SortResult<String> {
    let sorter = Sorter::new(config)?.with_progress(true);

    let report = match command {
        CleanCommand::Sort => sorter.run(dir_path)?,
        CleanCommand::DryRun => {
            let report = sorter.plan(dir_path)?;
            OutputFormatter::print_plan(&report);
            report
        }
    };

    OutputFormatter::archive_failures(&report);
    for skipped in &report.skipped {
        OutputFormatter::warning(&format!(
            "Left {} in place: {} already exists",
            skipped.path.display(),
            skipped.occupied_by.display()
        ));
    }
    OutputFormatter::summary_table(&report.category_counts());
    match command {
        CleanCommand::Sort => OutputFormatter::success(&format!(
            "Cleaned {}",
            dir_path.display()
        )),
        CleanCommand::DryRun => {
            OutputFormatter::dry_run_notice("Dry run complete. No files were modified.")
        }
    }

    match format {
        ReportFormat::Text => Ok(OutputFormatter::format_report(&report)),
        ReportFormat::Json => OutputFormatter::format_json(&report),
    }
}
