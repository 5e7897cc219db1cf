//! # kiosk-ledger
//!
//! Pure credit-ledger arithmetic and policy. No I/O: the storage layer and
//! workflows feed amounts in and persist the results.
//!
//! ## Modules
//!
//! - [`policy`] — charge validation and the settlement-reset policy
//! - [`reference`] — external reference and payout-address validation
//! - [`claim`] — FIFO claim-consumption planning

pub mod claim;
pub mod policy;
pub mod reference;

/// Error types for ledger arithmetic.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Amount is zero.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// Charge exceeds the available balance.
    #[error("insufficient credit: required {required}, available {available}")]
    InsufficientCredit {
        /// The amount being charged.
        required: u64,
        /// The balance it was charged against.
        available: u64,
    },

    /// Claim exceeds the pending earnings total.
    #[error("claim exceeds available earnings: requested {requested}, available {available}")]
    ExceedsAvailable {
        /// The requested claim amount.
        requested: u64,
        /// The pending earnings sum.
        available: u64,
    },

    /// Claim does not land on an earning boundary (exact-only policy).
    #[error("claim of {requested} does not align to an earning boundary (nearest {boundary})")]
    UnalignedAmount {
        /// The requested claim amount.
        requested: u64,
        /// The nearest consumable boundary at or above the request.
        boundary: u64,
    },

    /// Malformed external payment reference.
    #[error("invalid payment reference: {0}")]
    InvalidReference(String),

    /// Malformed payout address.
    #[error("invalid payout address: {0}")]
    InvalidAddress(String),

    /// Arithmetic overflow.
    #[error("arithmetic overflow in ledger calculation")]
    Overflow,
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
