//! Account structures.

use serde::{Deserialize, Serialize};

/// An account profile with its denormalized lifetime aggregates.
///
/// `total_earnings` and `total_sales` are incremented at claim time inside
/// the claim transaction, so they always match the claimed-earnings ledger.
#[derive(Clone, Debug, Serialize, Deserialize, ts_rs::TS)]
pub struct AccountProfile {
    /// 0x-prefixed wallet address.
    pub account_id: String,
    pub display_name: String,
    /// Stablecoin address payouts are sent to. Claims fail while unset.
    pub payout_address: Option<String>,
    /// Lifetime claimed earnings in micro-credits.
    pub total_earnings: u64,
    /// Number of earnings consumed by claims.
    pub total_sales: u32,
    pub created_at: u64,
}
