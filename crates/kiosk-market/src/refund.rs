//! The refund workflow.
//!
//! A purchase can be refunded only while its credit is unsettled and its
//! earning still pending: the charge is restored to the buyer (capped at
//! the allowance), the purchase flips to refunded, the earning is voided,
//! and the sales counter steps back. One transaction covers all of it.

use rusqlite::Connection;

use kiosk_db::queries::{content, credit, earnings, purchases};
use kiosk_db::DbError;
use kiosk_types::ledger::{PurchaseStatus, RefundReceipt};
use kiosk_types::ContentId;

use crate::{MarketConfig, MarketError, Result};

/// Refund a buyer's purchase of a content item.
///
/// # Errors
///
/// - [`MarketError::PurchaseNotFound`] if no such purchase exists
/// - [`MarketError::NotRefundable`] if the purchase is settled, already
///   refunded, or its earning was claimed
pub fn refund_purchase(
    conn: &mut Connection,
    config: &MarketConfig,
    buyer: &str,
    content_id: &ContentId,
    now: u64,
) -> Result<RefundReceipt> {
    let tx = conn.transaction().map_err(DbError::Sqlite)?;

    let purchase = purchases::find_by_buyer_content(&tx, buyer, content_id)?
        .ok_or(MarketError::PurchaseNotFound)?;

    let status = PurchaseStatus::parse(&purchase.status)
        .ok_or_else(|| MarketError::InvalidInput(format!("unknown status {}", purchase.status)))?;
    if !status.can_transition_to(PurchaseStatus::Refunded) {
        return Err(MarketError::NotRefundable(format!(
            "purchase is {}",
            purchase.status
        )));
    }
    if purchase.settled {
        return Err(MarketError::NotRefundable(
            "credit already settled".to_string(),
        ));
    }

    // Voiding fails if the earning was already claimed.
    earnings::void_for_purchase(&tx, purchase.purchase_id).map_err(|e| match e {
        DbError::Constraint(_) => MarketError::NotRefundable("earning already claimed".to_string()),
        other => MarketError::Db(other),
    })?;

    purchases::set_status(&tx, purchase.purchase_id, PurchaseStatus::Refunded)?;

    let ledger = credit::find(&tx, buyer)?
        .ok_or_else(|| MarketError::LedgerNotFound(buyer.to_string()))?;
    let new_balance = ledger
        .balance
        .checked_add(purchase.amount)
        .ok_or(MarketError::AmountOverflow)?
        .min(config.allowance);
    credit::set_balance(&tx, buyer, new_balance, now)?;

    content::adjust_sales_count(&tx, content_id, -1)?;

    tx.commit().map_err(DbError::Sqlite)?;

    tracing::info!(
        buyer,
        content_id = %hex::encode(content_id),
        purchase_id = purchase.purchase_id,
        amount = purchase.amount,
        new_balance,
        "purchase refunded"
    );

    Ok(RefundReceipt {
        purchase_id: purchase.purchase_id,
        amount: purchase.amount,
        new_balance,
    })
}
