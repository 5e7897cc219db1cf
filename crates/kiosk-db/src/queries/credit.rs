//! Credit ledger query functions.
//!
//! One row per buyer, created lazily at the opening allowance. Settled
//! references are the replay-rejection set: a reference that was already
//! applied for an owner can never be applied again.

use rusqlite::Connection;

use crate::{DbError, Result};

/// Fetch a buyer's credit account, creating it at `allowance` on first use.
pub fn get_or_create(
    conn: &Connection,
    owner: &str,
    allowance: u64,
    now: u64,
) -> Result<CreditRow> {
    if let Some(row) = find(conn, owner)? {
        return Ok(row);
    }

    conn.execute(
        "INSERT INTO credit_accounts (owner, balance, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)",
        rusqlite::params![owner, allowance as i64, now as i64],
    )?;
    tracing::info!(owner, allowance, "credit account created");

    Ok(CreditRow {
        owner: owner.to_string(),
        balance: allowance,
        created_at: now,
        updated_at: now,
    })
}

/// Fetch a buyer's credit account if it exists.
pub fn find(conn: &Connection, owner: &str) -> Result<Option<CreditRow>> {
    let row = conn
        .query_row(
            "SELECT owner, balance, created_at, updated_at
             FROM credit_accounts WHERE owner = ?1",
            [owner],
            |row| {
                Ok(CreditRow {
                    owner: row.get(0)?,
                    balance: row.get::<_, i64>(1)? as u64,
                    created_at: row.get::<_, i64>(2)? as u64,
                    updated_at: row.get::<_, i64>(3)? as u64,
                })
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(DbError::Sqlite(other)),
        })?;
    Ok(row)
}

/// Write a new balance.
pub fn set_balance(conn: &Connection, owner: &str, balance: u64, now: u64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE credit_accounts SET balance = ?1, updated_at = ?2 WHERE owner = ?3",
        rusqlite::params![balance as i64, now as i64, owner],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("credit account {owner}")));
    }
    Ok(())
}

/// Whether a settlement reference was already applied for this owner.
pub fn has_settled_reference(conn: &Connection, owner: &str, reference: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM settled_references WHERE owner = ?1 AND reference = ?2",
        rusqlite::params![owner, reference],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Record an applied settlement reference.
///
/// The `(owner, reference)` primary key is the backstop for replayed
/// settlements that slip past the pre-check.
pub fn insert_settled_reference(
    conn: &Connection,
    owner: &str,
    reference: &str,
    amount_settled: u64,
    now: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO settled_references (owner, reference, amount_settled, settled_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![owner, reference, amount_settled as i64, now as i64],
    )
    .map_err(|e| {
        if crate::is_unique_violation(&e) {
            DbError::Constraint(format!("reference {reference} already settled"))
        } else {
            DbError::Sqlite(e)
        }
    })?;
    Ok(())
}

/// A raw credit account row.
#[derive(Debug, Clone)]
pub struct CreditRow {
    pub owner: String,
    pub balance: u64,
    pub created_at: u64,
    pub updated_at: u64,
}
