//! Simulated stablecoin payout provider.
//!
//! Validates the destination address, draws a random 32-byte transaction
//! reference, and logs the transfer. No chain is involved; the reference is
//! indistinguishable in shape from a real transaction hash so downstream
//! validation paths are exercised honestly.

use rand::RngCore;

use crate::{PayoutError, PayoutProvider, Result};

/// The v1 payout provider.
pub struct SimulatedPayout {
    /// When set, every transfer fails after validation. Used to exercise
    /// the payout-failure path in tests.
    fail_transfers: bool,
}

impl SimulatedPayout {
    /// Create a provider whose transfers succeed.
    pub fn new() -> Self {
        Self {
            fail_transfers: false,
        }
    }

    /// Create a provider whose transfers fail after validation.
    pub fn failing() -> Self {
        Self {
            fail_transfers: true,
        }
    }
}

impl Default for SimulatedPayout {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PayoutProvider for SimulatedPayout {
    async fn transfer(&self, address: &str, amount: u64) -> Result<String> {
        kiosk_ledger::reference::validate_payout_address(address)
            .map_err(|e| PayoutError::InvalidAddress(e.to_string()))?;

        if amount == 0 {
            return Err(PayoutError::ZeroAmount);
        }

        if self.fail_transfers {
            return Err(PayoutError::TransferFailed(
                "simulated transfer failure".to_string(),
            ));
        }

        let mut reference_bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut reference_bytes);
        let reference = format!("0x{}", hex::encode(reference_bytes));

        tracing::info!(address, amount, reference, "simulated stablecoin transfer");

        Ok(reference)
    }
}
