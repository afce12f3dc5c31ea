use bech32::{Bech32, Hrp};
use bip39::Mnemonic;
use blake2::digest::consts::U28;
use blake2::{Blake2b, Digest};
use ed25519_bip32::{DerivationScheme, XPrv, XPRV_SIZE};
use hmac::Hmac;
use sha2::Sha512;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

// CIP-1852 path: m/1852'/1815'/account'/role/0
const PURPOSE: u32 = 1852;
const COIN_TYPE: u32 = 1815;
const PAYMENT_ROLE: u32 = 0;
const STAKE_ROLE: u32 = 2;
const HARDENED_OFFSET: u32 = 0x8000_0000;

const ICARUS_PBKDF2_ROUNDS: u32 = 4096;
const ADDRESS_HRP: &str = "addr";
/// Base address, payment key + stake key credentials, mainnet.
const BASE_ADDRESS_HEADER: u8 = 0x01;
const KEY_HASH_SIZE: usize = 28;

pub const SIGNING_KEY_SIZE: usize = 64;
pub const PUBLIC_KEY_SIZE: usize = 32;

type Blake2b224 = Blake2b<U28>;

fn harden(index: u32) -> u32 {
    HARDENED_OFFSET + index
}

/// Extended ed25519 secret (kL || kR) of a payment key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningKey([u8; SIGNING_KEY_SIZE]);

impl SigningKey {
    pub fn from_bytes(bytes: [u8; SIGNING_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNING_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Outcome of the statistics lookup for one wallet.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceStatus {
    Pending,
    Fetched,
    /// Lookup failed; the balance was counted as zero.
    Failed(String),
}

/// One derived account and its accrued statistics
#[derive(Debug)]
pub struct WalletRecord {
    pub account: u32,
    pub address: String,
    pub public_key: [u8; PUBLIC_KEY_SIZE],
    signing_key: SigningKey,
    /// NIGHT, already scaled down from the API's integer units
    pub balance: f64,
    pub receipts: u64,
    pub balance_status: BalanceStatus,
}

impl WalletRecord {
    pub fn new(
        account: u32,
        address: String,
        public_key: [u8; PUBLIC_KEY_SIZE],
        signing_key: SigningKey,
    ) -> Self {
        Self {
            account,
            address,
            public_key,
            signing_key,
            balance: 0.0,
            receipts: 0,
            balance_status: BalanceStatus::Pending,
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn lookup_failed(&self) -> bool {
        matches!(self.balance_status, BalanceStatus::Failed(_))
    }
}

/// Derive `count` wallets from a BIP-39 phrase, accounts `0..count`.
pub fn derive_wallets(mnemonic: &str, count: u32) -> Result<Vec<WalletRecord>, WalletError> {
    if count == 0 {
        return Err(WalletError::InvalidAccountCount);
    }

    let root = root_key_from_mnemonic(mnemonic)?;
    (0..count)
        .map(|account| derive_account(&root, account))
        .collect()
}

/// Icarus master key: PBKDF2-HMAC-SHA512 over the mnemonic entropy with an
/// empty passphrase, then clamped.
fn root_key_from_mnemonic(phrase: &str) -> Result<XPrv, WalletError> {
    let mnemonic = Mnemonic::parse(phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    let mut entropy = mnemonic.to_entropy();
    let mut seed = [0u8; XPRV_SIZE];
    let result = pbkdf2::pbkdf2::<Hmac<Sha512>>(b"", &entropy, ICARUS_PBKDF2_ROUNDS, &mut seed);
    entropy.zeroize();
    result.map_err(|e| WalletError::Derivation(e.to_string()))?;

    let root = XPrv::normalize_bytes_force3rd(seed);
    seed.zeroize();
    Ok(root)
}

fn derive_account(root: &XPrv, account: u32) -> Result<WalletRecord, WalletError> {
    let account_key = root
        .derive(DerivationScheme::V2, harden(PURPOSE))
        .derive(DerivationScheme::V2, harden(COIN_TYPE))
        .derive(DerivationScheme::V2, harden(account));

    let payment_key = account_key
        .derive(DerivationScheme::V2, PAYMENT_ROLE)
        .derive(DerivationScheme::V2, 0);
    let stake_key = account_key
        .derive(DerivationScheme::V2, STAKE_ROLE)
        .derive(DerivationScheme::V2, 0);

    let public_key = raw_public_key(&payment_key);
    let stake_public_key = raw_public_key(&stake_key);

    let address = encode_base_address(&key_hash(&public_key), &key_hash(&stake_public_key))?;

    let mut signing_bytes = [0u8; SIGNING_KEY_SIZE];
    signing_bytes.copy_from_slice(&AsRef::<[u8]>::as_ref(&payment_key)[..SIGNING_KEY_SIZE]);
    let signing_key = SigningKey::from_bytes(signing_bytes);
    signing_bytes.zeroize();

    Ok(WalletRecord::new(account, address, public_key, signing_key))
}

fn raw_public_key(key: &XPrv) -> [u8; PUBLIC_KEY_SIZE] {
    let xpub = key.public();
    let mut public_key = [0u8; PUBLIC_KEY_SIZE];
    public_key.copy_from_slice(&AsRef::<[u8]>::as_ref(&xpub)[..PUBLIC_KEY_SIZE]);
    public_key
}

/// BLAKE2b-224 of a raw ed25519 public key
pub fn key_hash(public_key: &[u8; PUBLIC_KEY_SIZE]) -> [u8; KEY_HASH_SIZE] {
    let digest = Blake2b224::digest(public_key);
    let mut hash = [0u8; KEY_HASH_SIZE];
    hash.copy_from_slice(digest.as_slice());
    hash
}

fn encode_base_address(
    payment_hash: &[u8; KEY_HASH_SIZE],
    stake_hash: &[u8; KEY_HASH_SIZE],
) -> Result<String, WalletError> {
    let mut bytes = Vec::with_capacity(1 + 2 * KEY_HASH_SIZE);
    bytes.push(BASE_ADDRESS_HEADER);
    bytes.extend_from_slice(payment_hash);
    bytes.extend_from_slice(stake_hash);

    let hrp = Hrp::parse(ADDRESS_HRP).map_err(|e| WalletError::AddressEncoding(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, &bytes).map_err(|e| WalletError::AddressEncoding(e.to_string()))
}

/// Decode a bech32 `addr...` string into its raw address bytes.
pub fn decode_address(address: &str) -> Result<Vec<u8>, WalletError> {
    let invalid = |reason: String| WalletError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let (hrp, bytes) = bech32::decode(address).map_err(|e| invalid(e.to_string()))?;
    if !hrp.as_str().starts_with(ADDRESS_HRP) {
        return Err(invalid(format!("unexpected prefix '{}'", hrp.as_str())));
    }
    if bytes.is_empty() {
        return Err(invalid("empty payload".to_string()));
    }
    Ok(bytes)
}
