//! Account query functions.

use rusqlite::Connection;

use crate::{DbError, Result};

/// Insert a new account.
pub fn insert(
    conn: &Connection,
    account_id: &str,
    display_name: &str,
    payout_address: Option<&str>,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO accounts (account_id, display_name, payout_address, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![account_id, display_name, payout_address, created_at as i64],
    )?;
    Ok(())
}

/// Fetch an account by id.
pub fn get(conn: &Connection, account_id: &str) -> Result<AccountRow> {
    conn.query_row(
        "SELECT account_id, display_name, payout_address, total_earnings, total_sales, created_at
         FROM accounts WHERE account_id = ?1",
        [account_id],
        |row| {
            Ok(AccountRow {
                account_id: row.get(0)?,
                display_name: row.get(1)?,
                payout_address: row.get(2)?,
                total_earnings: row.get::<_, i64>(3)? as u64,
                total_sales: row.get::<_, i64>(4)? as u32,
                created_at: row.get::<_, i64>(5)? as u64,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            DbError::NotFound(format!("account {account_id}"))
        }
        other => DbError::Sqlite(other),
    })
}

/// Whether an account exists.
pub fn exists(conn: &Connection, account_id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM accounts WHERE account_id = ?1",
        [account_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Set the payout address.
pub fn set_payout_address(conn: &Connection, account_id: &str, address: &str) -> Result<()> {
    let updated = conn.execute(
        "UPDATE accounts SET payout_address = ?1 WHERE account_id = ?2",
        rusqlite::params![address, account_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("account {account_id}")));
    }
    Ok(())
}

/// Add to the claim-time aggregates.
pub fn add_claimed_aggregates(
    conn: &Connection,
    account_id: &str,
    earned: u64,
    sales: u32,
) -> Result<()> {
    let updated = conn.execute(
        "UPDATE accounts
         SET total_earnings = total_earnings + ?1, total_sales = total_sales + ?2
         WHERE account_id = ?3",
        rusqlite::params![earned as i64, sales as i64, account_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound(format!("account {account_id}")));
    }
    Ok(())
}

/// A raw account row.
#[derive(Debug, Clone)]
pub struct AccountRow {
    pub account_id: String,
    pub display_name: String,
    pub payout_address: Option<String>,
    pub total_earnings: u64,
    pub total_sales: u32,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        insert(&conn, "0xalice", "Alice", Some("0xdeadbeef"), 1000).expect("insert");

        let account = get(&conn, "0xalice").expect("get");
        assert_eq!(account.display_name, "Alice");
        assert_eq!(account.payout_address.as_deref(), Some("0xdeadbeef"));
        assert_eq!(account.total_earnings, 0);
        assert_eq!(account.total_sales, 0);
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert!(matches!(get(&conn, "0xnobody"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_exists() {
        let conn = test_db();
        assert!(!exists(&conn, "0xalice").expect("exists"));
        insert(&conn, "0xalice", "Alice", None, 1000).expect("insert");
        assert!(exists(&conn, "0xalice").expect("exists"));
    }

    #[test]
    fn test_set_payout_address() {
        let conn = test_db();
        insert(&conn, "0xalice", "Alice", None, 1000).expect("insert");
        set_payout_address(&conn, "0xalice", "0xcafe").expect("set");

        let account = get(&conn, "0xalice").expect("get");
        assert_eq!(account.payout_address.as_deref(), Some("0xcafe"));
    }

    #[test]
    fn test_set_payout_address_missing_account() {
        let conn = test_db();
        assert!(set_payout_address(&conn, "0xnobody", "0xcafe").is_err());
    }

    #[test]
    fn test_add_claimed_aggregates() {
        let conn = test_db();
        insert(&conn, "0xalice", "Alice", None, 1000).expect("insert");
        add_claimed_aggregates(&conn, "0xalice", 30_000_000, 2).expect("add");
        add_claimed_aggregates(&conn, "0xalice", 10_000_000, 1).expect("add");

        let account = get(&conn, "0xalice").expect("get");
        assert_eq!(account.total_earnings, 40_000_000);
        assert_eq!(account.total_sales, 3);
    }
}
