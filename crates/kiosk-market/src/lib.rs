//! # kiosk-market
//!
//! The marketplace workflows: publishing, purchasing on credit, settling
//! accumulated credit usage, claiming creator earnings, and refunds. Each
//! workflow's mutating steps run inside one SQLite transaction on the
//! exclusively-borrowed connection; the claim workflow invokes the payout
//! provider before mutating anything.
//!
//! ## Modules
//!
//! - [`publish`] — catalog publishing and tombstoning
//! - [`purchase`] — charge the ledger, record the purchase and its earning
//! - [`settlement`] — pay off credit usage with an external reference
//! - [`claim`] — pay out pending earnings oldest-first
//! - [`refund`] — undo an unsettled purchase
//! - [`views`] — read-side queries assembled into RPC view types

pub mod claim;
pub mod publish;
pub mod purchase;
pub mod refund;
pub mod settlement;
pub mod views;

use serde::{Deserialize, Serialize};

use kiosk_db::DbError;
use kiosk_ledger::claim::ClaimPolicy;
use kiosk_ledger::policy::SettlementPolicy;
use kiosk_ledger::LedgerError;

/// Ledger behavior knobs, loaded from daemon configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Opening credit allowance in micro-credits.
    #[serde(default = "default_allowance")]
    pub allowance: u64,
    /// How settlement restores the balance.
    #[serde(default)]
    pub settlement_policy: SettlementPolicy,
    /// How claims map onto whole earnings.
    #[serde(default)]
    pub claim_policy: ClaimPolicy,
}

fn default_allowance() -> u64 {
    kiosk_types::CREDIT_ALLOWANCE_MICRO
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            allowance: default_allowance(),
            settlement_policy: SettlementPolicy::default(),
            claim_policy: ClaimPolicy::default(),
        }
    }
}

/// Error types for marketplace workflows.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Bad input shape or range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed external payment reference.
    #[error("invalid payment reference: {0}")]
    InvalidReference(String),

    /// The account is not registered.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The content item is missing or tombstoned.
    #[error("content not found")]
    ContentNotFound,

    /// The buyer has no credit account.
    #[error("no credit ledger for {0}")]
    LedgerNotFound(String),

    /// No purchase exists for this (buyer, content) pair.
    #[error("purchase not found")]
    PurchaseNotFound,

    /// The buyer already purchased this content.
    #[error("content already purchased")]
    AlreadyPurchased,

    /// The charge exceeds the available balance.
    #[error("insufficient credit: required {required}, available {available}")]
    InsufficientCredit { required: u64, available: u64 },

    /// The buyer has no unsettled purchases.
    #[error("nothing to settle")]
    NothingToSettle,

    /// The reference was already applied for this buyer.
    #[error("settlement reference already applied: {0}")]
    DuplicateSettlement(String),

    /// The creator has no payout address on file.
    #[error("no payout address configured")]
    NoPayoutAddress,

    /// The creator has no pending earnings.
    #[error("no pending earnings")]
    NoPendingEarnings,

    /// The claim exceeds the pending earnings total.
    #[error("claim exceeds available earnings: requested {requested}, available {available}")]
    ExceedsAvailable { requested: u64, available: u64 },

    /// The claim does not land on an earning boundary (exact-only policy).
    #[error("claim of {requested} does not align to an earning boundary (nearest {boundary})")]
    UnalignedClaim { requested: u64, boundary: u64 },

    /// The purchase cannot be refunded in its current state.
    #[error("purchase not refundable: {0}")]
    NotRefundable(String),

    /// The caller does not own the target resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The payout provider failed; no earnings were mutated.
    #[error("payout failed: {0}")]
    PayoutFailed(String),

    /// Amount arithmetic overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// Underlying storage failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<LedgerError> for MarketError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ZeroAmount => Self::InvalidInput("amount must be non-zero".to_string()),
            LedgerError::InsufficientCredit { required, available } => {
                Self::InsufficientCredit { required, available }
            }
            LedgerError::ExceedsAvailable { requested, available } => {
                Self::ExceedsAvailable { requested, available }
            }
            LedgerError::UnalignedAmount { requested, boundary } => {
                Self::UnalignedClaim { requested, boundary }
            }
            LedgerError::InvalidReference(detail) => Self::InvalidReference(detail),
            LedgerError::InvalidAddress(detail) => Self::InvalidInput(detail),
            LedgerError::Overflow => Self::AmountOverflow,
        }
    }
}

/// Convenience result type for marketplace workflows.
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarketConfig::default();
        assert_eq!(config.allowance, kiosk_types::CREDIT_ALLOWANCE_MICRO);
        assert_eq!(config.settlement_policy, SettlementPolicy::FullReset);
        assert_eq!(config.claim_policy, ClaimPolicy::ConsumeWhole);
    }

    #[test]
    fn test_ledger_error_mapping() {
        let err: MarketError = LedgerError::InsufficientCredit {
            required: 50,
            available: 20,
        }
        .into();
        assert!(matches!(
            err,
            MarketError::InsufficientCredit { required: 50, available: 20 }
        ));

        let err: MarketError = LedgerError::UnalignedAmount {
            requested: 30,
            boundary: 50,
        }
        .into();
        assert!(matches!(
            err,
            MarketError::UnalignedClaim { requested: 30, boundary: 50 }
        ));
    }
}
