use ciborium::value::{Integer, Value};
use ed25519_bip32::{Signature, XPrv, XPRV_SIZE};
use tracing::debug;
use zeroize::Zeroize;

use super::keys::{decode_address, WalletRecord, SIGNING_KEY_SIZE};
use crate::error::SignError;

/// COSE algorithm identifier for EdDSA.
const COSE_ALG_EDDSA: i64 = -8;
const COSE_HEADER_ALG: i64 = 1;

/// The message the Scavenger API expects to be signed by the source wallet.
pub fn assignment_message(destination: &str) -> String {
    format!("Assign accumulated Scavenger rights to: {}", destination)
}

/// Sign the assignment of `wallet`'s rights to `destination` and return the
/// hex encoded COSE_Sign1 envelope.
///
/// Returns `None` when any step fails; callers treat that as
/// "signature unavailable".
pub fn create_donation_signature(wallet: &WalletRecord, destination: &str) -> Option<String> {
    match sign_assignment(wallet, destination) {
        Ok(signature) => Some(signature),
        Err(e) => {
            debug!(account = wallet.account, error = %e, "signature creation failed");
            None
        }
    }
}

/// Same as [`create_donation_signature`] but keeps the failure reason.
pub fn sign_assignment(wallet: &WalletRecord, destination: &str) -> Result<String, SignError> {
    let key = extended_key(wallet.signing_key().as_bytes())?;
    let address_bytes =
        decode_address(&wallet.address).map_err(|e| SignError::InvalidAddress(e.to_string()))?;
    let payload = assignment_message(destination).into_bytes();

    let protected = Value::Map(vec![
        (
            Value::Integer(Integer::from(COSE_HEADER_ALG)),
            Value::Integer(Integer::from(COSE_ALG_EDDSA)),
        ),
        (Value::Text("address".to_string()), Value::Bytes(address_bytes)),
    ]);
    let protected_encoded = encode(&protected)?;

    let sig_structure = Value::Array(vec![
        Value::Text("Signature1".to_string()),
        Value::Bytes(protected_encoded.clone()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.clone()),
    ]);
    let to_sign = encode(&sig_structure)?;

    let signature: Signature<Vec<u8>> = key.sign(&to_sign);

    let unprotected = Value::Map(vec![(
        Value::Text("hashed".to_string()),
        Value::Bool(false),
    )]);
    let cose_sign1 = Value::Array(vec![
        Value::Bytes(protected_encoded),
        unprotected,
        Value::Bytes(payload),
        Value::Bytes(AsRef::<[u8]>::as_ref(&signature).to_vec()),
    ]);

    Ok(hex::encode(encode(&cose_sign1)?))
}

/// Rebuild a signing key from kL || kR. The chain code plays no part in
/// signing, so it is left zeroed.
fn extended_key(signing_key: &[u8; SIGNING_KEY_SIZE]) -> Result<XPrv, SignError> {
    let mut bytes = [0u8; XPRV_SIZE];
    bytes[..SIGNING_KEY_SIZE].copy_from_slice(signing_key);
    let key = XPrv::from_bytes_verified(bytes).map_err(|e| SignError::InvalidKey(format!("{:?}", e)));
    bytes.zeroize();
    key
}

fn encode(value: &Value) -> Result<Vec<u8>, SignError> {
    let mut buffer = Vec::new();
    ciborium::ser::into_writer(value, &mut buffer).map_err(|e| SignError::Cbor(format!("{:?}", e)))?;
    Ok(buffer)
}
