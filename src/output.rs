//! Output and Reporting
//!
//! Formats batch validation results for people (with colours on a terminal),
//! as JSON, or as a one-line summary.

use std::time::Duration;

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::ValidationMessage;
use crate::validator::{FileValidationResult, ValidationResults, ValidationStatus};

/// Output formatter for batch results
pub struct Output {
    format: OutputFormat,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbosity: VerbosityLevel) -> Self {
        Self {
            format,
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// The complete report in the configured format.
    pub fn render(&self, results: &ValidationResults) -> String {
        match self.format {
            OutputFormat::Human => self.format_results(results),
            OutputFormat::Json => format_json(results),
            OutputFormat::Summary => format!("{}\n", self.format_summary_line(results)),
        }
    }

    pub fn format_results(&self, results: &ValidationResults) -> String {
        let mut output = String::new();

        match self.verbosity {
            VerbosityLevel::Quiet => {
                for file_result in results.file_results.iter().filter(|r| failed(r)) {
                    output.push_str(&self.format_file_result(file_result));
                    output.push('\n');
                }
                if results.has_errors() {
                    output.push_str(&format!(
                        "Errors: {} Invalid: {}\n",
                        results.error_files, results.invalid_files
                    ));
                }
            }
            VerbosityLevel::Normal | VerbosityLevel::Verbose | VerbosityLevel::Debug => {
                for file_result in &results.file_results {
                    if self.verbosity >= VerbosityLevel::Verbose || !file_result.status.is_valid() {
                        output.push_str(&self.format_file_result(file_result));
                        output.push('\n');
                    }
                }
                if !results.file_results.is_empty() {
                    output.push('\n');
                }
                output.push_str(&self.format_summary(results));
            }
        }

        output
    }

    pub fn format_file_result(&self, result: &FileValidationResult) -> String {
        let path_display = result.path.display();
        let duration_str = format_duration(result.duration);
        let version = result
            .version
            .map(|v| format!(" [DDMS {v}]"))
            .unwrap_or_default();

        let mut output = match &result.status {
            ValidationStatus::Valid => format!(
                "{}  {}{} ({})",
                self.colorize("✓ VALID", "32"),
                path_display,
                version,
                duration_str
            ),
            ValidationStatus::Invalid { error_count } => format!(
                "{}  {}{} ({}) - {} error{}",
                self.colorize("✗ INVALID", "31"),
                path_display,
                version,
                duration_str,
                error_count,
                if *error_count == 1 { "" } else { "s" }
            ),
            ValidationStatus::Error { message } => format!(
                "{}  {} ({}) - {}",
                self.colorize("⚠ ERROR", "33"),
                path_display,
                duration_str,
                message
            ),
            ValidationStatus::Skipped { reason } => format!(
                "{}  {} - {}",
                self.colorize("- SKIPPED", "36"),
                path_display,
                reason
            ),
        };

        if result.status.is_invalid() {
            push_messages(&mut output, &result.errors);
        }
        if self.verbosity >= VerbosityLevel::Verbose {
            push_messages(&mut output, &result.warnings);
        }
        output
    }

    fn format_summary(&self, results: &ValidationResults) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_files
        ));

        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }
        if results.skipped_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Skipped:", "36"),
                results.skipped_files
            ));
        }
        if results.warning_count > 0 {
            output.push_str(&format!("  Warnings: {}\n", results.warning_count));
        }

        output.push_str(&format!("  Success rate: {:.1}%\n", results.success_rate()));
        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.total_duration)
        ));

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!(
                "  Average per file: {}\n",
                format_duration(results.average_duration)
            ));
            let versions: Vec<&str> = results.versions_seen.iter().map(|v| v.as_str()).collect();
            output.push_str(&format!("  DDMS versions: {}\n", versions.join(", ")));
        }

        output
    }

    /// `N files: V valid, I invalid, E errors, S skipped (duration)`.
    pub fn format_summary_line(&self, results: &ValidationResults) -> String {
        format!(
            "{} files: {} valid, {} invalid, {} errors, {} skipped ({})",
            results.total_files,
            results.valid_files,
            results.invalid_files,
            results.error_files,
            results.skipped_files,
            format_duration(results.total_duration)
        )
    }
}

fn failed(result: &FileValidationResult) -> bool {
    result.status.is_invalid() || result.status.is_error()
}

fn push_messages(output: &mut String, messages: &[ValidationMessage]) {
    for message in messages {
        output.push_str(&format!("\n    {}", message));
    }
}

fn format_json(results: &ValidationResults) -> String {
    match serde_json::to_string_pretty(results) {
        Ok(json) => format!("{json}\n"),
        Err(e) => format!("{{\"error\": \"{}\"}}\n", e),
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
