//! Plain-text record of a run, rewritten from scratch every time.

use std::path::Path;

use chrono::{DateTime, Local};

use crate::consolidate::{
    ConsolidationResults, DonationResults, DonationSelection, TransferOutcome, WalletTotals,
};
use crate::wallet::{BalanceStatus, WalletRecord};

const WIDTH: usize = 80;

pub struct LogContext<'a> {
    pub wallets: &'a [WalletRecord],
    pub destination: &'a str,
    pub developer_address: &'a str,
    pub selection: &'a DonationSelection<'a>,
    pub donate: bool,
    pub results: &'a ConsolidationResults,
    pub donation: Option<&'a DonationResults>,
}

impl LogContext<'_> {
    fn donating(&self) -> bool {
        self.donate && !self.selection.is_empty()
    }

    fn donation_status(&self) -> &'static str {
        self.donation.map(DonationResults::status_label).unwrap_or("FAILED")
    }
}

pub fn render_log(ctx: &LogContext<'_>, now: DateTime<Local>) -> String {
    let totals = WalletTotals::from_wallets(ctx.wallets);
    let donated = if ctx.donating() {
        ctx.selection.total_amount
    } else {
        0.0
    };

    let mut log = Vec::new();
    log.push("═".repeat(WIDTH));
    log.push("MIDNIGHT MINER - CONSOLIDATION LOG".to_string());
    log.push("═".repeat(WIDTH));
    log.push(String::new());
    log.push(format!("Date: {}", now.format("%Y-%m-%d %H:%M:%S")));
    log.push(String::new());

    heading(&mut log, "SUMMARY");
    log.push(format!("Total Wallets: {}", totals.total_wallets));
    log.push(format!("Total NIGHT: {:.6}", totals.total_night));
    if totals.lookups_failed > 0 {
        log.push(format!("Balance Lookups Failed: {}", totals.lookups_failed));
    }
    log.push(String::new());
    log.push(format!("Destination Address: {}", ctx.destination));
    log.push(format!(
        "Amount Consolidated: {:.6} NIGHT",
        totals.total_night - donated
    ));
    log.push(format!("Successful Consolidations: {}", ctx.results.success_count));
    log.push(format!("Failed Consolidations: {}", ctx.results.fail_count));
    log.push(String::new());

    if ctx.donating() {
        heading(&mut log, "DEVELOPER DONATION");
        log.push(format!("Developer Address: {}", ctx.developer_address));
        log.push(format!("Number of Wallets Donated: {}", ctx.selection.len()));
        log.push(format!(
            "Amount Donated: {:.6} NIGHT ({:.2}% of total)",
            ctx.selection.total_amount,
            ctx.selection.percentage_of(totals.total_night)
        ));
        log.push(String::new());
        log.push("Donated Wallets:".to_string());
        for (idx, wallet) in ctx.selection.wallets.iter().enumerate() {
            log.push(format!("  [{}] {}", idx + 1, wallet.address));
            log.push(format!("      Balance: {:.6} NIGHT", wallet.balance));
        }
        log.push(String::new());
        log.push(format!("Status: {}", ctx.donation_status()));
        log.push(String::new());
    }

    heading(&mut log, "ALL WALLET CONSOLIDATIONS");
    log.push(String::new());

    let mut sorted: Vec<&WalletRecord> = ctx.wallets.iter().collect();
    sorted.sort_by(|a, b| b.balance.total_cmp(&a.balance));

    for (index, wallet) in sorted.iter().enumerate() {
        let is_donated = ctx.donating() && ctx.selection.contains(wallet.account);
        let (action, destination, outcome) = if is_donated {
            (
                "DONATED",
                ctx.developer_address,
                ctx.donation.and_then(|d| d.outcome(wallet.account)),
            )
        } else {
            (
                "CONSOLIDATED",
                ctx.destination,
                ctx.results.outcome(wallet.account),
            )
        };
        let status = outcome
            .map(TransferOutcome::status_label)
            .unwrap_or("NOT PROCESSED");

        log.push(format!("[{}/{}] {}", index + 1, sorted.len(), wallet.address));
        log.push(format!("  Balance: {:.6} NIGHT", wallet.balance));
        log.push(format!("  Solutions: {}", wallet.receipts));
        log.push(format!("  {} to: {}", action, destination));
        log.push(format!("  Status: {}", status));
        if matches!(outcome, Some(TransferOutcome::AlreadyConsolidated)) {
            log.push("  Note: already consolidated".to_string());
        }
        if let BalanceStatus::Failed(reason) = &wallet.balance_status {
            log.push(format!("  Note: balance lookup failed ({})", reason));
        }
        log.push(String::new());
    }

    if !ctx.results.failures.is_empty() {
        heading(&mut log, "FAILED CONSOLIDATIONS - DETAILS");
        for failure in &ctx.results.failures {
            log.push(format!("Address: {}", failure.address));
            log.push(format!("Balance: {:.6} NIGHT", failure.balance));
            log.push(format!("Error: {}", failure.error));
            log.push(String::new());
        }
    }

    log.push("═".repeat(WIDTH));
    log.join("\n")
}

/// Write the log to `path`, replacing whatever was there.
pub fn write_log(path: &Path, ctx: &LogContext<'_>) -> std::io::Result<()> {
    std::fs::write(path, render_log(ctx, Local::now()))
}

fn heading(log: &mut Vec<String>, title: &str) {
    log.push("─".repeat(WIDTH));
    log.push(title.to_string());
    log.push("─".repeat(WIDTH));
}
