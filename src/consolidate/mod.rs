//! Consolidation run: balance lookup, donation choice, transfers and the log
//!
//! Flow of a run:
//! 1. Fetch statistics for every wallet in concurrent batches
//! 2. Propose ~1% of the total for the developer and ask the user
//! 3. Assign every remaining wallet to the destination, one at a time
//! 4. Assign the donated wallets to the developer address
//! 5. Write the log and print the final summary

pub mod donation;
pub mod stats;

use anyhow::{Context, Result};
use colored::Colorize;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::api::ScavengerClient;
use crate::config::ConsolidateConfig;
use crate::error::ApiError;
use crate::report::{
    donation_question, write_log, DashboardView, DecisionSource, DonationDecision, LogContext,
    Reporter,
};
use crate::wallet::{create_donation_signature, BalanceStatus, WalletRecord};

pub use donation::{
    partition_for_donation, select_donation_wallets, DonationSelection, DONATION_FRACTION,
};
pub use stats::{
    ConsolidationResults, DonationResults, TransferFailure, TransferOutcome, WalletTotals,
};

pub const SIGNATURE_FAILED: &str = "Signature creation failed";

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The user answered CANCEL; nothing was submitted
    Cancelled,
    Completed(RunReport),
}

#[derive(Debug)]
pub struct RunReport {
    pub results: ConsolidationResults,
    pub donation: Option<DonationResults>,
    pub lookups_failed: usize,
}

impl RunReport {
    /// Warning for wallets whose balance could not be fetched, if any
    pub fn lookup_warning(&self) -> Option<String> {
        match self.lookups_failed {
            0 => None,
            n => Some(format!(
                "⚠ {} balance lookup{} failed; those wallets were counted as 0 NIGHT",
                n,
                if n == 1 { "" } else { "s" }
            )),
        }
    }
}

impl RunOutcome {
    /// 1 when any consolidation transfer failed, otherwise 0
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Completed(report) if report.results.fail_count > 0 => 1,
            _ => 0,
        }
    }
}

pub struct Consolidator {
    client: ScavengerClient,
    config: ConsolidateConfig,
}

impl Consolidator {
    pub fn new(config: ConsolidateConfig) -> Result<Self, ApiError> {
        let client = ScavengerClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Fill in balance, receipts and lookup status for every wallet.
    ///
    /// Lookups run `batch_size` at a time; a failed lookup leaves the wallet
    /// at zero and marks it `Failed`. Returns the number of failed lookups.
    pub async fn fetch_balances(&self, wallets: &mut [WalletRecord], reporter: &Reporter) -> usize {
        let pb = reporter.progress(wallets.len() as u64, "Checking earnings");
        let mut failed = 0;

        for batch in wallets.chunks_mut(self.config.batch_size.max(1)) {
            let lookups = join_all(
                batch
                    .iter()
                    .map(|wallet| self.client.fetch_statistics(&wallet.address)),
            )
            .await;

            for (wallet, lookup) in batch.iter_mut().zip(lookups) {
                match lookup {
                    Ok(stats) => {
                        wallet.balance = stats.night;
                        wallet.receipts = stats.receipts;
                        wallet.balance_status = BalanceStatus::Fetched;
                    }
                    Err(e) => {
                        pb.suspend(|| {
                            warn!(
                                account = wallet.account,
                                address = %wallet.address,
                                error = %e,
                                "balance lookup failed, counting as zero"
                            )
                        });
                        wallet.balance = 0.0;
                        wallet.receipts = 0;
                        wallet.balance_status = BalanceStatus::Failed(e.to_string());
                        failed += 1;
                    }
                }
            }
            pb.inc(batch.len() as u64);
        }

        pb.finish_and_clear();
        if failed > 0 {
            warn!(failed, total = wallets.len(), "some balance lookups failed");
        }
        failed
    }

    /// Sign and submit one assignment of `wallet` to `destination`.
    pub async fn consolidate_wallet(&self, destination: &str, wallet: &WalletRecord) -> TransferOutcome {
        let signature = match create_donation_signature(wallet, destination) {
            Some(signature) => signature,
            None => return TransferOutcome::Failed(SIGNATURE_FAILED.to_string()),
        };

        TransferOutcome::from(
            self.client
                .donate_to(destination, &wallet.address, &signature)
                .await,
        )
    }

    /// Submit every wallet to `destination` sequentially; failures do not stop the pass.
    pub async fn process_consolidations(
        &self,
        wallets: &[&WalletRecord],
        destination: &str,
        reporter: &Reporter,
    ) -> ConsolidationResults {
        let pb = reporter.progress(wallets.len() as u64, "Consolidating");
        let mut results = ConsolidationResults::default();

        for wallet in wallets {
            let outcome = self.consolidate_wallet(destination, wallet).await;
            if let Some(error) = outcome.error() {
                pb.suspend(|| warn!(account = wallet.account, error, "consolidation failed"));
            }
            results.record(wallet, outcome);
            pb.set_message(format!("✓ {} | ✗ {}", results.success_count, results.fail_count));
            pb.inc(1);
        }

        pb.finish();
        info!(
            succeeded = results.success_count,
            failed = results.fail_count,
            "consolidation pass finished"
        );
        results
    }

    /// Submit the selected wallets to the developer address.
    pub async fn process_donation(
        &self,
        wallets: &[&WalletRecord],
        reporter: &Reporter,
    ) -> DonationResults {
        let pb = reporter.progress(wallets.len() as u64, "Donating");
        let mut results = DonationResults::default();

        for wallet in wallets {
            let outcome = self
                .consolidate_wallet(&self.config.developer_address, wallet)
                .await;
            if let Some(error) = outcome.error() {
                pb.suspend(|| warn!(account = wallet.account, error, "donation transfer failed"));
            }
            results.record(wallet, outcome);
            pb.inc(1);
        }

        pb.finish_and_clear();
        results
    }

    /// Run the whole consolidation for already-derived wallets.
    pub async fn run(
        &self,
        wallets: &mut [WalletRecord],
        destination: &str,
        decisions: &mut dyn DecisionSource,
        reporter: &mut Reporter,
    ) -> Result<RunOutcome> {
        reporter.line(format!("Checking earnings for {} wallets...", wallets.len()).cyan())?;
        let lookups_failed = self.fetch_balances(wallets, reporter).await;

        let wallets: &[WalletRecord] = wallets;
        let total_night = WalletTotals::from_wallets(wallets).total_night;
        let selection = select_donation_wallets(wallets);
        debug!(
            selected = selection.len(),
            amount = selection.total_amount,
            "donation proposal"
        );

        reporter.dashboard(&DashboardView {
            wallets,
            destination,
            selection: &selection,
            donate: true,
        })?;

        let mut donate = false;
        if !selection.is_empty() {
            match decisions.decide(&donation_question(&selection, total_night))? {
                DonationDecision::Cancel => {
                    reporter.blank()?;
                    reporter.line("Consolidation cancelled.".yellow())?;
                    info!("consolidation cancelled by user");
                    return Ok(RunOutcome::Cancelled);
                }
                DonationDecision::Donate => donate = true,
                DonationDecision::Skip => {}
            }
        }

        reporter.dashboard(&DashboardView {
            wallets,
            destination,
            selection: &selection,
            donate,
        })?;

        let (to_consolidate, to_donate) = partition_for_donation(wallets, &selection, donate);
        reporter.blank()?;
        reporter.line(format!("Consolidating {} wallets...", to_consolidate.len()).cyan())?;
        let results = self
            .process_consolidations(&to_consolidate, destination, reporter)
            .await;

        let donation = if donate {
            reporter.line(
                format!(
                    "Processing developer donation ({} wallet{})...",
                    to_donate.len(),
                    if to_donate.len() == 1 { "" } else { "s" }
                )
                .cyan(),
            )?;
            let donation = self.process_donation(&to_donate, reporter).await;
            if donation.is_success() {
                reporter.line("✓ Developer donation successful".green())?;
            } else {
                reporter.line("✗ Developer donation failed".red())?;
            }
            Some(donation)
        } else {
            None
        };

        let log_path = &self.config.log_file;
        write_log(
            log_path,
            &LogContext {
                wallets,
                destination,
                developer_address: &self.config.developer_address,
                selection: &selection,
                donate,
                results: &results,
                donation: donation.as_ref(),
            },
        )
        .with_context(|| format!("failed to write log file {}", log_path.display()))?;

        let donated = donation
            .as_ref()
            .map(|_| (selection.len(), selection.total_amount));
        reporter.final_summary(&results, donated, log_path)?;

        Ok(RunOutcome::Completed(RunReport {
            results,
            donation,
            lookups_failed,
        }))
    }
}
