//! External reference and payout-address validation.
//!
//! References are opaque proofs that an external transfer occurred; the
//! ledger verifies nothing beyond shape and uniqueness. Shape checks happen
//! before any mutation so a malformed reference can never enter the
//! settled-reference set.

use crate::{LedgerError, Result};

/// Length of a transaction-hash reference in hex characters.
const TX_REFERENCE_HEX_LEN: usize = 64;

/// Length of a payout address in hex characters.
const PAYOUT_ADDRESS_HEX_LEN: usize = 40;

/// Validate and normalize an external payment reference.
///
/// Accepts `0x` followed by 64 hex characters of either case; returns the
/// lowercase form so replay detection is case-insensitive.
///
/// # Errors
///
/// - [`LedgerError::InvalidReference`] on any shape mismatch
pub fn normalize_tx_reference(reference: &str) -> Result<String> {
    let hex_part = reference
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::InvalidReference("missing 0x prefix".to_string()))?;

    if hex_part.len() != TX_REFERENCE_HEX_LEN {
        return Err(LedgerError::InvalidReference(format!(
            "expected {TX_REFERENCE_HEX_LEN} hex chars, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LedgerError::InvalidReference(
            "non-hex character in reference".to_string(),
        ));
    }

    Ok(format!("0x{}", hex_part.to_ascii_lowercase()))
}

/// Validate a stablecoin payout address: `0x` followed by 40 hex characters.
///
/// # Errors
///
/// - [`LedgerError::InvalidAddress`] on any shape mismatch
pub fn validate_payout_address(address: &str) -> Result<()> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::InvalidAddress("missing 0x prefix".to_string()))?;

    if hex_part.len() != PAYOUT_ADDRESS_HEX_LEN {
        return Err(LedgerError::InvalidAddress(format!(
            "expected {PAYOUT_ADDRESS_HEX_LEN} hex chars, got {}",
            hex_part.len()
        )));
    }
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LedgerError::InvalidAddress(
            "non-hex character in address".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_ref(fill: char) -> String {
        format!("0x{}", fill.to_string().repeat(64))
    }

    #[test]
    fn test_normalize_valid_reference() {
        let normalized = normalize_tx_reference(&tx_ref('a')).expect("valid");
        assert_eq!(normalized, tx_ref('a'));
    }

    #[test]
    fn test_normalize_lowercases() {
        let normalized = normalize_tx_reference(&tx_ref('A')).expect("valid");
        assert_eq!(normalized, tx_ref('a'));
    }

    #[test]
    fn test_reference_missing_prefix() {
        assert!(normalize_tx_reference(&"a".repeat(66)).is_err());
    }

    #[test]
    fn test_reference_wrong_length() {
        assert!(normalize_tx_reference("0xabc").is_err());
        assert!(normalize_tx_reference(&format!("0x{}", "a".repeat(65))).is_err());
    }

    #[test]
    fn test_reference_non_hex() {
        let mut bad = tx_ref('a');
        bad.replace_range(10..11, "g");
        assert!(normalize_tx_reference(&bad).is_err());
    }

    #[test]
    fn test_reference_empty() {
        assert!(normalize_tx_reference("").is_err());
    }

    #[test]
    fn test_valid_payout_address() {
        let address = format!("0x{}", "1f".repeat(20));
        validate_payout_address(&address).expect("valid address");
    }

    #[test]
    fn test_payout_address_wrong_length() {
        assert!(validate_payout_address("0x1234").is_err());
    }

    #[test]
    fn test_payout_address_missing_prefix() {
        assert!(validate_payout_address(&"1f".repeat(20)).is_err());
    }

    #[test]
    fn test_payout_address_non_hex() {
        let address = format!("0x{}", "zz".repeat(20));
        assert!(validate_payout_address(&address).is_err());
    }
}
