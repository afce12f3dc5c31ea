//! Picks the wallets whose balances go to the developer address.
//!
//! The goal is roughly 1% of the total. A single wallet is used when the
//! first wallet (ascending) at or above 80% of the target is also within
//! 120% of it; otherwise the smallest wallets are taken until the target is
//! reached. This is a first-match heuristic, not a closest-match search.

use std::collections::HashSet;

use crate::wallet::WalletRecord;

/// Share of the total balance proposed as a donation
pub const DONATION_FRACTION: f64 = 0.01;
const SINGLE_WALLET_LOWER: f64 = 0.8;
const SINGLE_WALLET_UPPER: f64 = 1.2;

#[derive(Debug, Clone, Default)]
pub struct DonationSelection<'a> {
    pub wallets: Vec<&'a WalletRecord>,
    pub total_amount: f64,
}

impl<'a> DonationSelection<'a> {
    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn accounts(&self) -> HashSet<u32> {
        self.wallets.iter().map(|w| w.account).collect()
    }

    pub fn contains(&self, account: u32) -> bool {
        self.wallets.iter().any(|w| w.account == account)
    }

    /// Donation as a percentage of `total`, 0 when there is nothing to share
    pub fn percentage_of(&self, total: f64) -> f64 {
        if total > 0.0 {
            self.total_amount / total * 100.0
        } else {
            0.0
        }
    }
}

pub fn select_donation_wallets(wallets: &[WalletRecord]) -> DonationSelection<'_> {
    let total: f64 = wallets.iter().map(|w| w.balance).sum();
    let target = total * DONATION_FRACTION;

    let mut funded: Vec<&WalletRecord> = wallets.iter().filter(|w| w.balance > 0.0).collect();
    if funded.is_empty() {
        return DonationSelection::default();
    }
    funded.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    if let Some(single) = funded
        .iter()
        .find(|w| w.balance >= target * SINGLE_WALLET_LOWER)
    {
        if single.balance <= target * SINGLE_WALLET_UPPER {
            return DonationSelection {
                wallets: vec![*single],
                total_amount: single.balance,
            };
        }
    }

    let mut selection = DonationSelection::default();
    for wallet in funded {
        if selection.total_amount >= target {
            break;
        }
        selection.total_amount += wallet.balance;
        selection.wallets.push(wallet);
    }
    selection
}

/// Split wallets into (consolidate to destination, donate to developer).
///
/// When `donate` is false every wallet is consolidated, including the ones
/// that were proposed for donation.
pub fn partition_for_donation<'a>(
    wallets: &'a [WalletRecord],
    selection: &DonationSelection<'_>,
    donate: bool,
) -> (Vec<&'a WalletRecord>, Vec<&'a WalletRecord>) {
    if !donate || selection.is_empty() {
        return (wallets.iter().collect(), Vec::new());
    }

    let donated = selection.accounts();
    wallets.iter().partition(|w| !donated.contains(&w.account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::test_wallet;

    fn wallets_with(balances: &[f64]) -> Vec<WalletRecord> {
        balances
            .iter()
            .enumerate()
            .map(|(i, b)| test_wallet(i as u32, *b))
            .collect()
    }

    fn selected_accounts(selection: &DonationSelection<'_>) -> Vec<u32> {
        selection.wallets.iter().map(|w| w.account).collect()
    }

    #[test]
    fn test_small_wallet_overshoots_target() {
        // total 100, target 1.0; 5 is above the 1.2 window so accumulation
        // starts, and 5 alone already covers the target
        let wallets = wallets_with(&[5.0, 95.0, 0.0]);
        let selection = select_donation_wallets(&wallets);

        assert_eq!(selected_accounts(&selection), vec![0]);
        assert_eq!(selection.total_amount, 5.0);
    }

    #[test]
    fn test_single_wallet_within_window() {
        let wallets = wallets_with(&[50.0, 0.9, 49.1]);
        let selection = select_donation_wallets(&wallets);

        assert_eq!(selected_accounts(&selection), vec![1]);
        assert_eq!(selection.total_amount, 0.9);
    }

    #[test]
    fn test_first_match_not_closest() {
        // target 1.0; 0.85 matches first even though 1.0 is an exact hit
        let wallets = wallets_with(&[1.0, 0.85, 98.15]);
        let selection = select_donation_wallets(&wallets);
        assert_eq!(selected_accounts(&selection), vec![1]);
    }

    #[test]
    fn test_accumulates_smallest_wallets() {
        let wallets = wallets_with(&[98.8, 0.3, 0.3, 0.3, 0.3]);
        let selection = select_donation_wallets(&wallets);

        assert_eq!(selection.len(), 4);
        assert!(!selection.contains(0));
        assert!((selection.total_amount - 1.2).abs() < 1e-9);
        assert!(selection.total_amount >= 1.0);
    }

    #[test]
    fn test_accumulation_stops_at_first_sufficient_prefix() {
        let wallets = wallets_with(&[0.1, 0.2, 0.3, 99.4]);
        let selection = select_donation_wallets(&wallets);

        // 0.1 + 0.2 + 0.3 < 1.0, so the large wallet is pulled in too
        assert_eq!(selected_accounts(&selection), vec![0, 1, 2, 3]);
        let without_last: f64 = selection.wallets[..3].iter().map(|w| w.balance).sum();
        assert!(without_last < 1.0);
    }

    #[test]
    fn test_all_zero_is_empty() {
        let wallets = wallets_with(&[0.0, 0.0, 0.0]);
        let selection = select_donation_wallets(&wallets);

        assert!(selection.is_empty());
        assert_eq!(selection.total_amount, 0.0);
        assert_eq!(selection.percentage_of(0.0), 0.0);
    }

    #[test]
    fn test_selection_only_holds_funded_wallets() {
        let wallets = wallets_with(&[0.0, 3.0, 0.0, 0.5, 200.0, 0.0, 0.7]);
        let selection = select_donation_wallets(&wallets);
        assert!(!selection.is_empty());
        for wallet in &selection.wallets {
            assert!(wallet.balance > 0.0);
        }
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let wallets = wallets_with(&[5.0, 95.0, 0.0, 0.4, 0.3]);
        let selection = select_donation_wallets(&wallets);
        assert!(!selection.is_empty());

        let (consolidate, donate) = partition_for_donation(&wallets, &selection, true);
        let consolidate_ids: HashSet<u32> = consolidate.iter().map(|w| w.account).collect();
        let donate_ids: HashSet<u32> = donate.iter().map(|w| w.account).collect();

        assert!(consolidate_ids.is_disjoint(&donate_ids));
        assert_eq!(consolidate_ids.len() + donate_ids.len(), wallets.len());
        assert_eq!(donate_ids, selection.accounts());
    }

    #[test]
    fn test_partition_without_donation_keeps_everything() {
        let wallets = wallets_with(&[5.0, 95.0]);
        let selection = select_donation_wallets(&wallets);

        let (consolidate, donate) = partition_for_donation(&wallets, &selection, false);
        assert_eq!(consolidate.len(), 2);
        assert!(donate.is_empty());
    }
}
