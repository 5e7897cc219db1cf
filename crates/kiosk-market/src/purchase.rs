//! The purchase workflow.
//!
//! Charging the ledger, inserting the purchase record, recording the
//! creator's pending earning, and bumping the sales counter are one
//! transaction: a failure at any step leaves no trace of the attempt.

use rusqlite::Connection;

use kiosk_db::queries::{accounts, content, credit, earnings, purchases};
use kiosk_db::DbError;
use kiosk_ledger::policy;
use kiosk_types::ledger::{PurchaseReceipt, PurchaseStatus};
use kiosk_types::ContentId;

use crate::{MarketConfig, MarketError, Result};

/// Purchase a content item on credit.
///
/// The buyer's credit account is created lazily at the full allowance on
/// first purchase. The purchase amount is a snapshot of the content price.
///
/// # Errors
///
/// - [`MarketError::AccountNotFound`] if the buyer is not registered
/// - [`MarketError::ContentNotFound`] if the content is missing or tombstoned
/// - [`MarketError::AlreadyPurchased`] on a repeat (buyer, content) pair
/// - [`MarketError::InsufficientCredit`] if the price exceeds the balance
pub fn purchase_content(
    conn: &mut Connection,
    config: &MarketConfig,
    buyer: &str,
    content_id: &ContentId,
    now: u64,
) -> Result<PurchaseReceipt> {
    let tx = conn.transaction().map_err(DbError::Sqlite)?;

    if !accounts::exists(&tx, buyer)? {
        return Err(MarketError::AccountNotFound(buyer.to_string()));
    }

    let item = content::lookup(&tx, content_id).map_err(|e| match e {
        DbError::NotFound(_) => MarketError::ContentNotFound,
        other => MarketError::Db(other),
    })?;

    if purchases::exists(&tx, buyer, content_id)? {
        return Err(MarketError::AlreadyPurchased);
    }

    let ledger = credit::get_or_create(&tx, buyer, config.allowance, now)?;
    let new_balance = policy::check_charge(ledger.balance, item.price)?;
    credit::set_balance(&tx, buyer, new_balance, now)?;

    let purchase_id = purchases::insert(
        &tx,
        buyer,
        content_id,
        item.price,
        PurchaseStatus::Completed,
        now,
    )
    .map_err(|e| match e {
        // Unique-index backstop for a concurrent insert of the same pair.
        DbError::Constraint(_) => MarketError::AlreadyPurchased,
        other => MarketError::Db(other),
    })?;

    earnings::record(&tx, &item.creator, content_id, purchase_id, item.price, now)?;
    content::adjust_sales_count(&tx, content_id, 1)?;

    tx.commit().map_err(DbError::Sqlite)?;

    tracing::info!(
        buyer,
        content_id = %hex::encode(content_id),
        purchase_id,
        amount = item.price,
        new_balance,
        "content purchased on credit"
    );

    Ok(PurchaseReceipt {
        purchase_id,
        content_id: hex::encode(content_id),
        amount: item.price,
        new_balance,
    })
}
