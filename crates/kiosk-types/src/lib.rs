//! # kiosk-types
//!
//! Shared domain types used across the Kiosk workspace: identifiers,
//! amount constants, the closed status enums for purchases and earnings,
//! and the view structures returned over the RPC surface.

pub mod account;
pub mod content;
pub mod ledger;

/// Common type aliases.
///
/// Content items are addressed by a 32-byte hash; accounts by their
/// 0x-prefixed wallet address string. Purchases and earnings use the
/// storage layer's rowids.
pub type ContentId = [u8; 32];
pub type AccountId = String;
pub type PurchaseId = i64;
pub type EarningId = i64;

/// Micro-credits per credit (1 credit = 1,000,000 micro-credits).
pub const MICRO_CREDITS_PER_CREDIT: u64 = 1_000_000;

/// Opening credit allowance granted to every buyer (100 credits).
pub const CREDIT_ALLOWANCE_MICRO: u64 = 100 * MICRO_CREDITS_PER_CREDIT;

/// Maximum content title length in characters.
pub const MAX_TITLE_LEN: usize = 120;

/// Maximum content description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

#[cfg(test)]
mod tests {
    #[test]
    fn test_allowance_is_100_credits() {
        assert_eq!(
            super::CREDIT_ALLOWANCE_MICRO,
            100 * super::MICRO_CREDITS_PER_CREDIT
        );
    }

    #[test]
    #[ignore] // Run manually to generate bindings
    fn export_ts_bindings() {
        use ts_rs::TS;
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bindings");
        std::fs::create_dir_all(&dir).unwrap();
        crate::account::AccountProfile::export_all_to(&dir).unwrap();
        crate::content::ContentSummary::export_all_to(&dir).unwrap();
        crate::content::PurchaseView::export_all_to(&dir).unwrap();
        crate::content::EarningView::export_all_to(&dir).unwrap();
        crate::ledger::CreditBalance::export_all_to(&dir).unwrap();
        crate::ledger::PurchaseReceipt::export_all_to(&dir).unwrap();
        crate::ledger::RefundReceipt::export_all_to(&dir).unwrap();
        crate::ledger::SettlementReceipt::export_all_to(&dir).unwrap();
        crate::ledger::ClaimReceipt::export_all_to(&dir).unwrap();
        crate::ledger::EarningsSummary::export_all_to(&dir).unwrap();
    }
}
