/// Per-run tallies for balance lookups and transfers
use std::collections::BTreeMap;

use crate::api::DonateStatus;
use crate::error::ApiError;
use crate::wallet::WalletRecord;

/// What happened to one transfer request
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Submitted,
    /// The server answered 409; the assignment was recorded earlier
    AlreadyConsolidated,
    Failed(String),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, TransferOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TransferOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_success() {
            "SUCCESS"
        } else {
            "FAILED"
        }
    }
}

impl From<Result<DonateStatus, ApiError>> for TransferOutcome {
    fn from(result: Result<DonateStatus, ApiError>) -> Self {
        match result {
            Ok(DonateStatus::Accepted) => TransferOutcome::Submitted,
            Ok(DonateStatus::AlreadyProcessed) => TransferOutcome::AlreadyConsolidated,
            Err(e) => TransferOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferFailure {
    pub account: u32,
    pub address: String,
    pub balance: f64,
    pub error: String,
}

/// Results of the pass that moves wallets to the user's destination
#[derive(Debug, Clone, Default)]
pub struct ConsolidationResults {
    pub success_count: usize,
    pub fail_count: usize,
    pub outcomes: BTreeMap<u32, TransferOutcome>,
    pub failures: Vec<TransferFailure>,
}

impl ConsolidationResults {
    pub fn record(&mut self, wallet: &WalletRecord, outcome: TransferOutcome) {
        match &outcome {
            TransferOutcome::Failed(error) => {
                self.fail_count += 1;
                self.failures.push(TransferFailure {
                    account: wallet.account,
                    address: wallet.address.clone(),
                    balance: wallet.balance,
                    error: error.clone(),
                });
            }
            _ => self.success_count += 1,
        }
        self.outcomes.insert(wallet.account, outcome);
    }

    pub fn outcome(&self, account: u32) -> Option<&TransferOutcome> {
        self.outcomes.get(&account)
    }

    pub fn processed(&self) -> usize {
        self.success_count + self.fail_count
    }

    pub fn already_consolidated(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, TransferOutcome::AlreadyConsolidated))
            .count()
    }
}

/// Results of sending the selected wallets to the developer address
#[derive(Debug, Clone, Default)]
pub struct DonationResults {
    pub outcomes: BTreeMap<u32, TransferOutcome>,
}

impl DonationResults {
    pub fn record(&mut self, wallet: &WalletRecord, outcome: TransferOutcome) {
        self.outcomes.insert(wallet.account, outcome);
    }

    pub fn outcome(&self, account: u32) -> Option<&TransferOutcome> {
        self.outcomes.get(&account)
    }

    /// True when every donated wallet went through
    pub fn is_success(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.values().all(TransferOutcome::is_success)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_success() {
            "SUCCESS"
        } else {
            "FAILED"
        }
    }
}

/// Aggregate figures shown on the dashboard and in the log
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WalletTotals {
    pub total_wallets: usize,
    pub with_balance: usize,
    pub lookups_failed: usize,
    pub total_solutions: u64,
    pub total_night: f64,
}

impl WalletTotals {
    pub fn from_wallets(wallets: &[WalletRecord]) -> Self {
        wallets.iter().fold(
            WalletTotals {
                total_wallets: wallets.len(),
                ..Default::default()
            },
            |mut totals, wallet| {
                if wallet.balance > 0.0 {
                    totals.with_balance += 1;
                }
                if wallet.lookup_failed() {
                    totals.lookups_failed += 1;
                }
                totals.total_solutions += wallet.receipts;
                totals.total_night += wallet.balance;
                totals
            },
        )
    }
}
