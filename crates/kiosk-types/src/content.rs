//! Catalog and purchase-history structures.

use serde::{Deserialize, Serialize};

use crate::ledger::{EarningStatus, PurchaseStatus};

/// A catalog item as shown to buyers.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct ContentSummary {
    /// Hex-encoded 32-byte content id.
    pub content_id: String,
    pub creator: String,
    pub title: String,
    pub description: Option<String>,
    /// Price in micro-credits, snapshotted onto purchases.
    pub price: u64,
    pub sales_count: u32,
    pub published_at: u64,
}

/// A purchase as shown in a buyer's history.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct PurchaseView {
    pub purchase_id: i64,
    /// Hex-encoded content id.
    pub content_id: String,
    /// Price paid, in micro-credits.
    pub amount: u64,
    pub status: PurchaseStatus,
    /// Whether the credit used for this purchase has been settled.
    pub settled: bool,
    /// The external payment reference, once settled.
    pub settlement_reference: Option<String>,
    pub created_at: u64,
}

/// An earning as shown to its creator.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct EarningView {
    pub earning_id: i64,
    /// Hex-encoded content id.
    pub content_id: String,
    pub purchase_id: i64,
    /// Amount in micro-credits, equal to the purchase amount.
    pub amount: u64,
    pub status: EarningStatus,
    /// Set at settlement; the earning stays pending.
    pub settlement_reference: Option<String>,
    /// Set at claim time with the payout transaction reference.
    pub payout_reference: Option<String>,
    pub claimed_at: Option<u64>,
    pub created_at: u64,
}
