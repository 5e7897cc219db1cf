//! Credit ledger, settlement, and claim structures.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a purchase.
///
/// Credit purchases are inserted as [`PurchaseStatus::Completed`] because the
/// charge succeeds synchronously; `Pending` and `Failed` exist for payment
/// paths that confirm asynchronously.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PurchaseStatus {
    /// Stable string form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// The single source of truth for legal purchase-state transitions.
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }
}

/// Lifecycle state of a creator earning.
///
/// Settlement does not change this state: a settled purchase's earning stays
/// `Pending` until the creator claims it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(rename_all = "snake_case")]
pub enum EarningStatus {
    Pending,
    Claimed,
}

impl EarningStatus {
    /// Stable string form, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "claimed" => Some(Self::Claimed),
            _ => None,
        }
    }

    /// The single source of truth for legal earning-state transitions.
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!((self, next), (Self::Pending, Self::Claimed))
    }
}

/// A buyer's credit position.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct CreditBalance {
    pub owner: String,
    /// Current balance in micro-credits.
    pub balance: u64,
    /// The opening allowance the balance resets to at settlement.
    pub allowance: u64,
}

/// Result of a successful purchase.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct PurchaseReceipt {
    pub purchase_id: i64,
    /// Hex-encoded content id.
    pub content_id: String,
    /// Price charged, in micro-credits.
    pub amount: u64,
    /// The buyer's post-charge balance.
    pub new_balance: u64,
}

/// Result of a successful refund.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct RefundReceipt {
    pub purchase_id: i64,
    /// Amount restored to the buyer's balance (capped at the allowance).
    pub amount: u64,
    pub new_balance: u64,
}

/// Result of a successful settlement.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct SettlementReceipt {
    /// Sum of the settled purchases, in micro-credits.
    pub total_amount: u64,
    pub settled_purchase_count: u32,
    /// Post-settlement balance in micro-credits.
    pub new_balance: u64,
    /// The external payment reference that was recorded.
    pub reference: String,
}

/// Result of a successful claim.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct ClaimReceipt {
    /// Amount actually paid out, in micro-credits. Under whole-earning
    /// consumption this can exceed the requested amount by the tail of the
    /// last earning consumed.
    pub claimed_amount: u64,
    pub claimed_earnings_count: u32,
    /// Sum of earnings still pending after the claim.
    pub remaining_pending: u64,
    /// The payout provider's transaction reference.
    pub payout_reference: String,
}

/// Totals for one earning status bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
pub struct StatusTotals {
    /// Sum in micro-credits.
    pub amount: u64,
    pub count: u32,
}

/// A creator's earnings grouped by status.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ts_rs::TS)]
pub struct EarningsSummary {
    pub pending: StatusTotals,
    pub claimed: StatusTotals,
}
