/// Response types for the Scavenger statistics endpoint
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// `night_allocation` is reported in millionths of a NIGHT.
pub const NIGHT_DIVISOR: f64 = 1_000_000.0;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsResponse {
    #[serde(default)]
    pub local: Option<LocalStatistics>,
}

/// Per-address figures. The API has returned both strings and numbers here.
#[derive(Debug, Default, Deserialize)]
pub struct LocalStatistics {
    #[serde(default)]
    pub night_allocation: Option<Value>,
    #[serde(default)]
    pub crypto_receipts: Option<Value>,
}

/// Parsed statistics for one wallet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WalletStatistics {
    pub night: f64,
    pub receipts: u64,
}

impl StatisticsResponse {
    pub fn into_statistics(self) -> Result<WalletStatistics, ApiError> {
        let local = match self.local {
            Some(local) => local,
            None => return Ok(WalletStatistics::default()),
        };

        let raw_night = match &local.night_allocation {
            Some(value) => number_from_value(value)
                .ok_or_else(|| ApiError::Malformed(format!("night_allocation: {}", value)))?,
            None => 0.0,
        };
        if !raw_night.is_finite() || raw_night < 0.0 {
            return Err(ApiError::Malformed(format!("night_allocation: {}", raw_night)));
        }

        let receipts = match &local.crypto_receipts {
            Some(value) => number_from_value(value)
                .filter(|n| n.is_finite() && *n >= 0.0)
                .map(|n| n.trunc() as u64)
                .ok_or_else(|| ApiError::Malformed(format!("crypto_receipts: {}", value)))?,
            None => 0,
        };

        Ok(WalletStatistics {
            night: raw_night / NIGHT_DIVISOR,
            receipts,
        })
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => Some(0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<WalletStatistics, ApiError> {
        serde_json::from_str::<StatisticsResponse>(body)
            .unwrap()
            .into_statistics()
    }

    #[test]
    fn test_string_and_number_allocations() {
        let stats = parse(r#"{"local": {"night_allocation": "2500000", "crypto_receipts": 7}}"#).unwrap();
        assert_eq!(stats, WalletStatistics { night: 2.5, receipts: 7 });

        let stats = parse(r#"{"local": {"night_allocation": 1500000, "crypto_receipts": "3"}}"#).unwrap();
        assert_eq!(stats, WalletStatistics { night: 1.5, receipts: 3 });
    }

    #[test]
    fn test_missing_fields_are_zero() {
        assert_eq!(parse("{}").unwrap(), WalletStatistics::default());
        assert_eq!(parse(r#"{"local": {}}"#).unwrap(), WalletStatistics::default());
        assert_eq!(
            parse(r#"{"local": {"night_allocation": null}}"#).unwrap(),
            WalletStatistics::default()
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse(r#"{"local": {"night_allocation": "lots"}}"#),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(
            parse(r#"{"local": {"crypto_receipts": [1]}}"#),
            Err(ApiError::Malformed(_))
        ));
    }
}
