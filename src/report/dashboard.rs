//! Full-screen summary shown before and after the donation prompt.

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::consolidate::{DonationSelection, WalletTotals};
use crate::wallet::WalletRecord;

const TITLE: &str = "MIDNIGHT MINER - WALLET CONSOLIDATION";
const WIDTH: usize = 71;
const ADDRESS_WRAP: usize = 60;
const LABEL_WIDTH: usize = 28;

/// ANSI sequence that clears the terminal and homes the cursor
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

pub struct DashboardView<'a> {
    pub wallets: &'a [WalletRecord],
    pub destination: &'a str,
    pub selection: &'a DonationSelection<'a>,
    /// Whether the selection is (or is proposed to be) donated
    pub donate: bool,
}

impl DashboardView<'_> {
    fn shows_donation(&self) -> bool {
        self.donate && !self.selection.is_empty()
    }

    pub fn amount_to_consolidate(&self, total_night: f64) -> f64 {
        if self.shows_donation() {
            total_night - self.selection.total_amount
        } else {
            total_night
        }
    }
}

pub fn render_dashboard(view: &DashboardView<'_>, now: DateTime<Local>) -> String {
    let totals = WalletTotals::from_wallets(view.wallets);
    let mut lines = Vec::new();

    let border = "═".repeat(WIDTH);
    let edge = "║".bright_cyan().bold();
    lines.push(format!("╔{}╗", border).bright_cyan().bold().to_string());
    lines.push(format!(
        "{}{}{}",
        edge,
        format!("{:^width$}", TITLE, width = WIDTH).bold(),
        edge
    ));
    lines.push(format!("╚{}╝", border).bright_cyan().bold().to_string());
    lines.push(String::new());
    lines.push(format!("{} {}", "Date:".dimmed(), now.format("%A, %B %-d, %Y")));
    lines.push(format!("{} {}", "Time:".dimmed(), now.format("%H:%M:%S")));
    lines.push(String::new());

    section(&mut lines, "WALLET SUMMARY");
    lines.push(field("Total Wallets:", totals.total_wallets.to_string().bold()));
    lines.push(field(
        "Wallets with Balance:",
        totals.with_balance.to_string().green().bold(),
    ));
    let failed = totals.lookups_failed.to_string();
    lines.push(field(
        "Lookups Failed:",
        if totals.lookups_failed > 0 {
            failed.red().bold()
        } else {
            failed.normal()
        },
    ));
    lines.push(field("Total Solutions:", totals.total_solutions.to_string().bold()));
    lines.push(field(
        "Total NIGHT Balance:",
        format!("{:.6} NIGHT", totals.total_night).yellow().bold(),
    ));
    lines.push(String::new());

    section(&mut lines, "CONSOLIDATION DETAILS");
    lines.push(format!("  {}", "Destination Address:".dimmed()));
    for chunk in wrap(view.destination, ADDRESS_WRAP) {
        lines.push(format!("  {}", chunk.bold()));
    }
    lines.push(String::new());
    lines.push(field(
        "Amount to Consolidate:",
        format!("{:.6} NIGHT", view.amount_to_consolidate(totals.total_night))
            .green()
            .bold(),
    ));
    lines.push(String::new());

    if view.shows_donation() {
        let selection = view.selection;
        section(&mut lines, "DEVELOPER DONATION");
        match selection.wallets.as_slice() {
            [single] => {
                let short: String = single.address.chars().take(20).collect();
                lines.push(format!("  {} {}...", "From wallet:".dimmed(), short));
            }
            wallets => lines.push(format!(
                "  {} {} smallest wallets",
                "From wallets:".dimmed(),
                wallets.len()
            )),
        }
        lines.push(format!(
            "  {} {} {}",
            "Amount:".dimmed(),
            format!("{:.6} NIGHT", selection.total_amount).yellow().bold(),
            format!("({:.2}% of total)", selection.percentage_of(totals.total_night)).dimmed()
        ));
        lines.push(String::new());
        lines.push(format!("  {}", "Thank you for supporting development!".green()));
        lines.push(String::new());
    }

    lines.push("━".repeat(WIDTH).bright_cyan().bold().to_string());
    lines.join("\n")
}

fn section(lines: &mut Vec<String>, title: &str) {
    let rule = "━".repeat(WIDTH).bright_cyan().bold().to_string();
    lines.push(rule.clone());
    lines.push(title.bold().to_string());
    lines.push(rule);
    lines.push(String::new());
}

fn field(label: &str, value: colored::ColoredString) -> String {
    format!("  {:<width$}{}", label, value, width = LABEL_WIDTH)
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}
