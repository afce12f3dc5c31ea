use thiserror::Error;

pub use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("account count must be a positive integer")]
    InvalidAccountCount,

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("address encoding failed: {0}")]
    AddressEncoding(String),
}

#[derive(Debug, Error)]
pub enum SignError {
    #[error("malformed signing key: {0}")]
    InvalidKey(String),

    #[error("cannot decode wallet address: {0}")]
    InvalidAddress(String),

    #[error("CBOR encoding failed: {0}")]
    Cbor(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}
