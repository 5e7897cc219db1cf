//! # kiosk-payout
//!
//! The payout-provider boundary. Claims hand a stablecoin address and an
//! amount to a [`PayoutProvider`] and get back an opaque transaction
//! reference; the ledger verifies nothing about the reference beyond shape
//! and uniqueness. The provider is constructed once at daemon startup and
//! injected into the claim workflow.
//!
//! v1 ships [`SimulatedPayout`], which validates the address and fabricates
//! a reference without touching a real chain.

pub mod simulated;

pub use simulated::SimulatedPayout;

/// Error types for payout operations.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    /// The destination address failed shape validation.
    #[error("invalid payout address: {0}")]
    InvalidAddress(String),

    /// The transfer amount is zero.
    #[error("payout amount must be non-zero")]
    ZeroAmount,

    /// The provider rejected or failed the transfer.
    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

/// Convenience result type for payout operations.
pub type Result<T> = std::result::Result<T, PayoutError>;

/// An external service that moves stablecoin to a creator's address.
///
/// Implementations must be safe to share across workflow handlers
/// (`Arc<dyn PayoutProvider>`).
#[async_trait::async_trait]
pub trait PayoutProvider: Send + Sync {
    /// Transfer `amount` micro-credits worth of stablecoin to `address`.
    ///
    /// Returns the provider's transaction reference on success. A failure
    /// here must leave the caller's state untouched: claims invoke the
    /// transfer before mutating any earnings.
    async fn transfer(&self, address: &str, amount: u64) -> Result<String>;
}
