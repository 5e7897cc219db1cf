//! The settlement workflow.
//!
//! Settlement converts a buyer's outstanding credit usage into a recorded
//! external payment reference: the balance is restored per policy, the
//! affected purchases are marked settled, and the reference is stamped onto
//! their earnings. The earnings stay pending — settlement proves the buyer
//! paid, it does not pay the creator.

use rusqlite::Connection;

use kiosk_db::queries::{credit, earnings, purchases};
use kiosk_db::DbError;
use kiosk_ledger::{policy, reference};
use kiosk_types::ledger::SettlementReceipt;

use crate::{MarketConfig, MarketError, Result};

/// Settle a buyer's outstanding credit usage against an external payment
/// reference.
///
/// All mutations — balance reset, reference recording, purchase and earning
/// stamping — are one transaction. Replaying a reference fails before any
/// mutation and changes nothing.
///
/// # Errors
///
/// - [`MarketError::InvalidReference`] if the reference is not
///   transaction-hash shaped
/// - [`MarketError::LedgerNotFound`] if the buyer has no credit account
/// - [`MarketError::NothingToSettle`] if no unsettled purchases exist
/// - [`MarketError::DuplicateSettlement`] if the reference was already
///   applied for this buyer
pub fn settle_credit(
    conn: &mut Connection,
    config: &MarketConfig,
    buyer: &str,
    external_reference: &str,
    now: u64,
) -> Result<SettlementReceipt> {
    let tx = conn.transaction().map_err(DbError::Sqlite)?;

    let ledger = credit::find(&tx, buyer)?
        .ok_or_else(|| MarketError::LedgerNotFound(buyer.to_string()))?;

    let unsettled = purchases::list_unsettled(&tx, buyer)?;
    if unsettled.is_empty() {
        return Err(MarketError::NothingToSettle);
    }

    let mut total_amount: u64 = 0;
    for purchase in &unsettled {
        total_amount = total_amount
            .checked_add(purchase.amount)
            .ok_or(MarketError::AmountOverflow)?;
    }

    let reference = reference::normalize_tx_reference(external_reference)?;
    if credit::has_settled_reference(&tx, buyer, &reference)? {
        return Err(MarketError::DuplicateSettlement(reference));
    }

    let new_balance = policy::post_settlement_balance(
        config.settlement_policy,
        config.allowance,
        ledger.balance,
        total_amount,
    )?;

    credit::set_balance(&tx, buyer, new_balance, now)?;
    credit::insert_settled_reference(&tx, buyer, &reference, total_amount, now).map_err(
        |e| match e {
            // Primary-key backstop for a concurrent replay of the reference.
            DbError::Constraint(_) => MarketError::DuplicateSettlement(reference.clone()),
            other => MarketError::Db(other),
        },
    )?;

    let purchase_ids: Vec<i64> = unsettled.iter().map(|p| p.purchase_id).collect();
    purchases::mark_settled(&tx, &purchase_ids, &reference)?;
    earnings::attach_settlement_reference(&tx, &purchase_ids, &reference)?;

    tx.commit().map_err(DbError::Sqlite)?;

    tracing::info!(
        buyer,
        reference,
        total_amount,
        settled = purchase_ids.len(),
        new_balance,
        "credit settled"
    );

    Ok(SettlementReceipt {
        total_amount,
        settled_purchase_count: purchase_ids.len() as u32,
        new_balance,
        reference,
    })
}
