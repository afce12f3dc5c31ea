//! Terminal output, the run log and the donation prompt.

mod dashboard;
mod logfile;
mod prompt;

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::consolidate::ConsolidationResults;

pub use dashboard::{render_dashboard, DashboardView, CLEAR_SCREEN};
pub use logfile::{render_log, write_log, LogContext};
pub use prompt::{
    donation_question, DecisionSource, DonationDecision, ScriptedDecisions, TerminalPrompt,
};

const PROGRESS_TEMPLATE: &str =
    "{prefix:.cyan} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Writes user-facing output. Tracing goes to stderr separately.
pub struct Reporter {
    out: Box<dyn Write + Send>,
    interactive: bool,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>, interactive: bool) -> Self {
        Self { out, interactive }
    }

    /// Stdout with screen clearing and live progress bars
    pub fn terminal() -> Self {
        Self::new(Box::new(io::stdout()), true)
    }

    /// Discards everything
    pub fn silent() -> Self {
        Self::new(Box::new(io::sink()), false)
    }

    pub fn progress(&self, len: u64, prefix: &str) -> ProgressBar {
        if !self.interactive {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::with_template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_prefix(prefix.to_string());
        pb
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn dashboard(&mut self, view: &DashboardView<'_>) -> io::Result<()> {
        if self.interactive {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        writeln!(self.out, "{}", render_dashboard(view, Local::now()))?;
        self.out.flush()
    }

    pub fn final_summary(
        &mut self,
        results: &ConsolidationResults,
        donated: Option<(usize, f64)>,
        log_path: &Path,
    ) -> io::Result<()> {
        writeln!(self.out, "{}", render_summary(results, donated, log_path))?;
        self.out.flush()
    }
}

pub fn render_summary(
    results: &ConsolidationResults,
    donated: Option<(usize, f64)>,
    log_path: &Path,
) -> String {
    let rule = "═".repeat(71).bright_green().bold().to_string();
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "CONSOLIDATION COMPLETE".bright_green().bold().to_string(),
        rule,
        String::new(),
        format!(
            "✓ Successfully consolidated: {} wallets",
            results.success_count.to_string().bold()
        ),
        format!("✗ Failed: {} wallets", results.fail_count.to_string().bold()),
    ];
    if let Some((count, amount)) = donated {
        lines.push(format!(
            "💝 Developer donation: {} wallet{} ({})",
            count.to_string().bold(),
            if count == 1 { "" } else { "s" },
            format!("{:.6} NIGHT", amount).bold()
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "📄 Detailed log saved to: {}",
        log_path.display().to_string().bold()
    ));
    lines.push(String::new());
    lines.join("\n")
}
