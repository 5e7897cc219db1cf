//! Creator earnings query functions.
//!
//! One pending earning per purchase. Settlement stamps a reference but
//! leaves the status pending; only a claim flips it, oldest-first.

use rusqlite::Connection;

use kiosk_types::{EarningId, PurchaseId};

use crate::{DbError, Result};

/// Record a pending earning for a purchase. Returns the new earning id.
pub fn record(
    conn: &Connection,
    creator: &str,
    content_id: &[u8; 32],
    purchase_id: PurchaseId,
    amount: u64,
    created_at: u64,
) -> Result<EarningId> {
    conn.execute(
        "INSERT INTO earnings (creator, content_id, purchase_id, amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
        rusqlite::params![
            creator,
            content_id.as_slice(),
            purchase_id,
            amount as i64,
            created_at as i64,
        ],
    )
    .map_err(|e| {
        if crate::is_unique_violation(&e) {
            DbError::Constraint(format!("purchase {purchase_id} already has an earning"))
        } else {
            DbError::Sqlite(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// Totals per status bucket: `(pending_amount, pending_count, claimed_amount, claimed_count)`.
pub fn summarize(conn: &Connection, creator: &str) -> Result<(u64, u32, u64, u32)> {
    let mut stmt = conn.prepare(
        "SELECT status, COALESCE(SUM(amount), 0), COUNT(*)
         FROM earnings WHERE creator = ?1 GROUP BY status",
    )?;

    let mut pending = (0u64, 0u32);
    let mut claimed = (0u64, 0u32);
    let rows = stmt.query_map([creator], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)? as u64,
            row.get::<_, i64>(2)? as u32,
        ))
    })?;
    for row in rows {
        let (status, amount, count) = row?;
        match status.as_str() {
            "pending" => pending = (amount, count),
            "claimed" => claimed = (amount, count),
            _ => {}
        }
    }

    Ok((pending.0, pending.1, claimed.0, claimed.1))
}

/// Sum of a creator's pending earnings.
pub fn pending_total(conn: &Connection, creator: &str) -> Result<u64> {
    let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM earnings WHERE creator = ?1 AND status = 'pending'",
        [creator],
        |row| row.get(0),
    )?;
    Ok(total as u64)
}

/// A creator's pending earnings, oldest first.
///
/// This ordering is the claim-consumption order.
pub fn list_pending(conn: &Connection, creator: &str) -> Result<Vec<EarningRow>> {
    let mut stmt = conn.prepare(
        "SELECT earning_id, creator, content_id, purchase_id, amount, status,
                settlement_reference, payout_reference, claimed_at, created_at
         FROM earnings
         WHERE creator = ?1 AND status = 'pending'
         ORDER BY created_at ASC, earning_id ASC",
    )?;

    let rows = stmt
        .query_map([creator], row_to_earning)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// All of a creator's earnings, newest first.
pub fn list_for_creator(conn: &Connection, creator: &str) -> Result<Vec<EarningRow>> {
    let mut stmt = conn.prepare(
        "SELECT earning_id, creator, content_id, purchase_id, amount, status,
                settlement_reference, payout_reference, claimed_at, created_at
         FROM earnings
         WHERE creator = ?1
         ORDER BY created_at DESC, earning_id DESC",
    )?;

    let rows = stmt
        .query_map([creator], row_to_earning)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Stamp the settlement reference onto the earnings of the given purchases.
///
/// Status is deliberately untouched: settlement proves the buyer paid,
/// claiming is a separate creator action.
pub fn attach_settlement_reference(
    conn: &Connection,
    purchase_ids: &[PurchaseId],
    reference: &str,
) -> Result<()> {
    let mut stmt =
        conn.prepare("UPDATE earnings SET settlement_reference = ?1 WHERE purchase_id = ?2")?;
    for id in purchase_ids {
        let updated = stmt.execute(rusqlite::params![reference, id])?;
        if updated == 0 {
            return Err(DbError::NotFound(format!("earning for purchase {id}")));
        }
    }
    Ok(())
}

/// Mark earnings claimed with the payout reference.
///
/// Only pending earnings are touched; the mismatch error means another
/// claim consumed one of them first.
pub fn mark_claimed(
    conn: &Connection,
    earning_ids: &[EarningId],
    payout_reference: &str,
    claimed_at: u64,
) -> Result<()> {
    let mut stmt = conn.prepare(
        "UPDATE earnings SET status = 'claimed', payout_reference = ?1, claimed_at = ?2
         WHERE earning_id = ?3 AND status = 'pending'",
    )?;
    for id in earning_ids {
        let updated = stmt.execute(rusqlite::params![payout_reference, claimed_at as i64, id])?;
        if updated == 0 {
            return Err(DbError::Constraint(format!(
                "earning {id} missing or already claimed"
            )));
        }
    }
    Ok(())
}

/// Void the pending earning of a refunded purchase.
pub fn void_for_purchase(conn: &Connection, purchase_id: PurchaseId) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM earnings WHERE purchase_id = ?1 AND status = 'pending'",
        [purchase_id],
    )?;
    if deleted == 0 {
        return Err(DbError::Constraint(format!(
            "earning for purchase {purchase_id} missing or already claimed"
        )));
    }
    Ok(())
}

fn row_to_earning(row: &rusqlite::Row<'_>) -> std::result::Result<EarningRow, rusqlite::Error> {
    Ok(EarningRow {
        earning_id: row.get(0)?,
        creator: row.get(1)?,
        content_id: row.get::<_, Vec<u8>>(2)?,
        purchase_id: row.get(3)?,
        amount: row.get::<_, i64>(4)? as u64,
        status: row.get(5)?,
        settlement_reference: row.get(6)?,
        payout_reference: row.get(7)?,
        claimed_at: row.get::<_, Option<i64>>(8)?.map(|t| t as u64),
        created_at: row.get::<_, i64>(9)? as u64,
    })
}

/// A raw earning row. `status` is the stored string; parse with
/// [`kiosk_types::ledger::EarningStatus::parse`].
#[derive(Debug, Clone)]
pub struct EarningRow {
    pub earning_id: EarningId,
    pub creator: String,
    pub content_id: Vec<u8>,
    pub purchase_id: PurchaseId,
    pub amount: u64,
    pub status: String,
    pub settlement_reference: Option<String>,
    pub payout_reference: Option<String>,
    pub claimed_at: Option<u64>,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{accounts, content, purchases};
    use kiosk_types::ledger::PurchaseStatus;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        accounts::insert(&conn, "0xbuyer", "Buyer", None, 1000).expect("buyer");
        accounts::insert(&conn, "0xcreator", "Creator", None, 1000).expect("creator");
        conn
    }

    fn purchase(conn: &Connection, content_id: [u8; 32], amount: u64, at: u64) -> PurchaseId {
        content::insert(conn, &content_id, "0xcreator", "Item", None, amount, at)
            .expect("content");
        purchases::insert(conn, "0xbuyer", &content_id, amount, PurchaseStatus::Completed, at)
            .expect("purchase")
    }

    #[test]
    fn test_record_and_summarize() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        let p2 = purchase(&conn, [2u8; 32], 50, 2100);

        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");
        record(&conn, "0xcreator", &[2u8; 32], p2, 50, 2100).expect("record");

        let (pending_amount, pending_count, claimed_amount, claimed_count) =
            summarize(&conn, "0xcreator").expect("summarize");
        assert_eq!(pending_amount, 80);
        assert_eq!(pending_count, 2);
        assert_eq!(claimed_amount, 0);
        assert_eq!(claimed_count, 0);
    }

    #[test]
    fn test_one_earning_per_purchase() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");

        let err = record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000)
            .expect_err("second earning must fail");
        assert!(matches!(err, DbError::Constraint(_)));
    }

    #[test]
    fn test_list_pending_oldest_first() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2100);
        let p2 = purchase(&conn, [2u8; 32], 50, 2000);

        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2100).expect("record");
        record(&conn, "0xcreator", &[2u8; 32], p2, 50, 2000).expect("record");

        let pending = list_pending(&conn, "0xcreator").expect("list");
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].amount, 50, "older earning first");
        assert_eq!(pending[1].amount, 30);
    }

    #[test]
    fn test_attach_settlement_reference_keeps_pending() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");

        let reference = format!("0x{}", "ab".repeat(32));
        attach_settlement_reference(&conn, &[p1], &reference).expect("attach");

        let pending = list_pending(&conn, "0xcreator").expect("list");
        assert_eq!(pending.len(), 1, "settlement must not consume the earning");
        assert_eq!(
            pending[0].settlement_reference.as_deref(),
            Some(reference.as_str())
        );
    }

    #[test]
    fn test_mark_claimed() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        let id = record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");

        let payout_ref = format!("0x{}", "cd".repeat(32));
        mark_claimed(&conn, &[id], &payout_ref, 3000).expect("claim");

        assert!(list_pending(&conn, "0xcreator").expect("list").is_empty());
        let all = list_for_creator(&conn, "0xcreator").expect("list all");
        assert_eq!(all[0].status, "claimed");
        assert_eq!(all[0].payout_reference.as_deref(), Some(payout_ref.as_str()));
        assert_eq!(all[0].claimed_at, Some(3000));
    }

    #[test]
    fn test_mark_claimed_twice_fails() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        let id = record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");

        let payout_ref = format!("0x{}", "cd".repeat(32));
        mark_claimed(&conn, &[id], &payout_ref, 3000).expect("claim");
        assert!(mark_claimed(&conn, &[id], &payout_ref, 3100).is_err());
    }

    #[test]
    fn test_void_for_purchase() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");

        void_for_purchase(&conn, p1).expect("void");
        assert!(list_pending(&conn, "0xcreator").expect("list").is_empty());
    }

    #[test]
    fn test_void_claimed_earning_fails() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        let id = record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");
        mark_claimed(&conn, &[id], &format!("0x{}", "cd".repeat(32)), 3000).expect("claim");

        assert!(void_for_purchase(&conn, p1).is_err());
    }

    #[test]
    fn test_pending_total() {
        let conn = test_db();
        let p1 = purchase(&conn, [1u8; 32], 30, 2000);
        let p2 = purchase(&conn, [2u8; 32], 50, 2100);
        record(&conn, "0xcreator", &[1u8; 32], p1, 30, 2000).expect("record");
        let id = record(&conn, "0xcreator", &[2u8; 32], p2, 50, 2100).expect("record");

        assert_eq!(pending_total(&conn, "0xcreator").expect("total"), 80);

        mark_claimed(&conn, &[id], &format!("0x{}", "cd".repeat(32)), 3000).expect("claim");
        assert_eq!(pending_total(&conn, "0xcreator").expect("total"), 30);
    }
}
