//! Purchase record query functions.
//!
//! One row per (buyer, content) pair, enforced by a unique index. The
//! credit-vs-settled state is an explicit `settled` flag plus a nullable
//! `settlement_reference`; `status` tracks the purchase lifecycle
//! separately and never changes at settlement.

use rusqlite::Connection;

use kiosk_types::ledger::PurchaseStatus;
use kiosk_types::PurchaseId;

use crate::{DbError, Result};

/// Insert a purchase. Returns the new purchase id.
///
/// A duplicate (buyer, content) pair surfaces as [`DbError::Constraint`].
pub fn insert(
    conn: &Connection,
    buyer: &str,
    content_id: &[u8; 32],
    amount: u64,
    status: PurchaseStatus,
    created_at: u64,
) -> Result<PurchaseId> {
    conn.execute(
        "INSERT INTO purchases (buyer, content_id, amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            buyer,
            content_id.as_slice(),
            amount as i64,
            status.as_str(),
            created_at as i64,
        ],
    )
    .map_err(|e| {
        if crate::is_unique_violation(&e) {
            DbError::Constraint(format!("buyer {buyer} already purchased this content"))
        } else {
            DbError::Sqlite(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// Whether a (buyer, content) purchase exists.
pub fn exists(conn: &Connection, buyer: &str, content_id: &[u8; 32]) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM purchases WHERE buyer = ?1 AND content_id = ?2",
        rusqlite::params![buyer, content_id.as_slice()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Fetch a purchase by id.
pub fn get(conn: &Connection, purchase_id: PurchaseId) -> Result<PurchaseRow> {
    conn.query_row(
        "SELECT purchase_id, buyer, content_id, amount, status, settled,
                settlement_reference, created_at
         FROM purchases WHERE purchase_id = ?1",
        [purchase_id],
        row_to_purchase,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            DbError::NotFound(format!("purchase {purchase_id}"))
        }
        other => DbError::Sqlite(other),
    })
}

/// Fetch a buyer's purchase of a specific content item, if any.
pub fn find_by_buyer_content(
    conn: &Connection,
    buyer: &str,
    content_id: &[u8; 32],
) -> Result<Option<PurchaseRow>> {
    conn.query_row(
        "SELECT purchase_id, buyer, content_id, amount, status, settled,
                settlement_reference, created_at
         FROM purchases WHERE buyer = ?1 AND content_id = ?2",
        rusqlite::params![buyer, content_id.as_slice()],
        row_to_purchase,
    )
    .map(Some)
    .or_else(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(DbError::Sqlite(other)),
    })
}

/// List a buyer's unsettled completed purchases, oldest first.
///
/// Refunded and failed purchases carry no credit debt and are excluded.
pub fn list_unsettled(conn: &Connection, buyer: &str) -> Result<Vec<PurchaseRow>> {
    let mut stmt = conn.prepare(
        "SELECT purchase_id, buyer, content_id, amount, status, settled,
                settlement_reference, created_at
         FROM purchases
         WHERE buyer = ?1 AND settled = 0 AND status = 'completed'
         ORDER BY created_at ASC, purchase_id ASC",
    )?;

    let rows = stmt
        .query_map([buyer], row_to_purchase)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// A buyer's purchase history, newest first.
pub fn history(conn: &Connection, buyer: &str) -> Result<Vec<PurchaseRow>> {
    let mut stmt = conn.prepare(
        "SELECT purchase_id, buyer, content_id, amount, status, settled,
                settlement_reference, created_at
         FROM purchases
         WHERE buyer = ?1
         ORDER BY created_at DESC, purchase_id DESC",
    )?;

    let rows = stmt
        .query_map([buyer], row_to_purchase)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Mark purchases settled with the given external reference.
pub fn mark_settled(
    conn: &Connection,
    purchase_ids: &[PurchaseId],
    reference: &str,
) -> Result<()> {
    let mut stmt = conn.prepare(
        "UPDATE purchases SET settled = 1, settlement_reference = ?1
         WHERE purchase_id = ?2 AND settled = 0",
    )?;
    for id in purchase_ids {
        let updated = stmt.execute(rusqlite::params![reference, id])?;
        if updated == 0 {
            return Err(DbError::Constraint(format!(
                "purchase {id} missing or already settled"
            )));
        }
    }
    Ok(())
}

/// Update a purchase's lifecycle status.
pub fn set_status(conn: &Connection, purchase_id: PurchaseId, status: PurchaseStatus) -> Result<()> {
    let updated = conn.execute(
        "UPDATE purchases SET status = ?1 WHERE purchase_id = ?2",
        rusqlite::params![status.as_str(), purchase_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("purchase {purchase_id}")));
    }
    Ok(())
}

fn row_to_purchase(row: &rusqlite::Row<'_>) -> std::result::Result<PurchaseRow, rusqlite::Error> {
    Ok(PurchaseRow {
        purchase_id: row.get(0)?,
        buyer: row.get(1)?,
        content_id: row.get::<_, Vec<u8>>(2)?,
        amount: row.get::<_, i64>(3)? as u64,
        status: row.get(4)?,
        settled: row.get(5)?,
        settlement_reference: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}

/// A raw purchase row. `status` is the stored string; parse with
/// [`PurchaseStatus::parse`].
#[derive(Debug, Clone)]
pub struct PurchaseRow {
    pub purchase_id: PurchaseId,
    pub buyer: String,
    pub content_id: Vec<u8>,
    pub amount: u64,
    pub status: String,
    pub settled: bool,
    pub settlement_reference: Option<String>,
    pub created_at: u64,
}
