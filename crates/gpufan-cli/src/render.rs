//! Batch summary rendering
//!
//! Color is an explicit capability decided by the caller (tty detection plus
//! the --no-color flag), not a process-wide side effect.

use crossterm::style::Stylize;
use gpufan_core::{format_elapsed_ms, BatchReport};
use std::fmt::Write;

const RULE: &str = "-----------------------";

/// Renders a batch report as the human-readable summary table.
pub struct SummaryRenderer {
    color: bool,
}

impl SummaryRenderer {
    /// Create a renderer; `color` enables ANSI styling of the status column
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render the summary: header, total time, one line per task
    pub fn render(&self, report: &BatchReport) -> String {
        // Char count, not byte length: the formatter pads by chars, so a
        // byte-based width would misalign non-ASCII parameters
        let width = report
            .reports
            .iter()
            .map(|r| r.parameter.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "cmd: {}", report.command);
        let _ = writeln!(
            out,
            "FINISHED in {}",
            format_elapsed_ms(report.total_elapsed_ms)
        );
        let _ = writeln!(out, "{RULE}");

        for task in &report.reports {
            // Pad before styling so ANSI codes do not skew the columns
            let status = if task.success { "OK  " } else { "FAIL" };
            let status = if !self.color {
                status.to_string()
            } else if task.success {
                status.green().to_string()
            } else {
                status.red().to_string()
            };
            let _ = writeln!(
                out,
                "{:<width$} {} on GPU {} in {}",
                task.parameter,
                status,
                task.gpu,
                format_elapsed_ms(task.elapsed_ms),
            );
        }

        out
    }
}
