//! Output formatting.
//!
//! Standard output carries only the run report: either the plain
//! Known/Unknown extensions listing or its JSON form. Status lines, the
//! summary table and the progress bar go to standard error.

use crate::archive::UnpackOutcome;
use crate::error::SortResult;
use crate::file_category::Category;
use crate::sorter::SortReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// OutputFormatter::success("Cleaned /home/user/Downloads");
    /// ```
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// OutputFormatter::warning("Left a-b.txt in place");
    /// ```
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        eprintln!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for file moves.
    ///
    /// The bar draws to standard error and stays hidden when that is not a
    /// terminal.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of files in the snapshot
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(42);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb.set_message("sorting");
        pb
    }

    /// Renders the Known/Unknown extensions report.
    ///
    /// ```
    /// use clean_folder::output::OutputFormatter;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let report = clean_folder::sort_folder(dir.path()).unwrap();
    /// let text = OutputFormatter::format_report(&report);
    /// assert!(text.starts_with("Known Extensions:\nimages: JPEG, PNG, JPG, SVG\n"));
    /// ```
    pub fn format_report(report: &SortReport) -> String {
        let mut out = String::from("Known Extensions:\n");
        for (category, extensions) in &report.known_extensions {
            let _ = writeln!(out, "{}: {}", category.dir_name(), extensions.join(", "));
        }
        out.push_str("\nUnknown Extensions:\n");
        out.push_str(&report.unknown_extensions.join(", "));
        out.push('\n');
        out
    }

    /// Renders the full report as pretty JSON.
    pub fn format_json(report: &SortReport) -> SortResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Prints the planned moves of a dry run.
    pub fn print_plan(report: &SortReport) {
        if report.planned.is_empty() {
            Self::dry_run_notice("No files would be moved.");
            return;
        }
        Self::dry_run_notice("Files would be sorted as follows:");
        for planned in &report.planned {
            let from = planned
                .from
                .strip_prefix(&report.root)
                .unwrap_or(&planned.from);
            let to = planned.to.strip_prefix(&report.root).unwrap_or(&planned.to);
            let marker = if planned.collides {
                " (name taken)".red().to_string()
            } else {
                String::new()
            };
            eprintln!(" - {} → {}{}", from.display(), to.display(), marker);
        }
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Files moved (or planned) per category
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::Category;
    /// use clean_folder::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let counts = BTreeMap::from([(Category::Images, 8), (Category::Documents, 15)]);
    /// OutputFormatter::summary_table(&counts);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<Category, usize>) {
        eprintln!("\n{}", "SUMMARY".bold());

        let width = category_counts
            .keys()
            .map(|c| c.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        eprintln!("{:<width$} | {}", "Category".bold(), "Files".bold());
        eprintln!("{}", "-".repeat(width + 10));

        let mut total = 0;
        for (category, count) in category_counts {
            total += count;
            eprintln!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count)
            );
        }

        eprintln!("{}", "-".repeat(width + 10));
        eprintln!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total)
        );
    }

    /// Prints a one-line note for every archive that failed to unpack.
    ///
    /// The note says whether the archive was deleted and how many files it
    /// left behind before failing.
    pub fn archive_failures(report: &SortReport) {
        for record in &report.archives {
            if let UnpackOutcome::Failed { reason, partial } = &record.outcome {
                let fate = if record.deleted { "deleted" } else { "kept" };
                let left = if partial.is_empty() {
                    String::new()
                } else {
                    format!(", {} {} left behind", partial.len(), plural(partial.len()))
                };
                Self::warning(&format!(
                    "Failed to unpack archive {} ({}{}): {}",
                    record.path.display(),
                    fate,
                    left,
                    reason
                ));
            }
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
