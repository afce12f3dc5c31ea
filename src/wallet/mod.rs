mod keys;
mod signer;

pub use keys::{
    decode_address, derive_wallets, key_hash, BalanceStatus, SigningKey, WalletRecord,
    PUBLIC_KEY_SIZE, SIGNING_KEY_SIZE,
};
pub use signer::{assignment_message, create_donation_signature, sign_assignment};

#[cfg(test)]
pub(crate) const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// Record with a placeholder key, for tests that only care about balances.
#[cfg(test)]
pub(crate) fn test_wallet(account: u32, balance: f64) -> WalletRecord {
    let mut wallet = WalletRecord::new(
        account,
        format!("addr_test_wallet_{}", account),
        [0u8; PUBLIC_KEY_SIZE],
        SigningKey::from_bytes([0u8; SIGNING_KEY_SIZE]),
    );
    wallet.balance = balance;
    wallet.balance_status = BalanceStatus::Fetched;
    wallet
}
