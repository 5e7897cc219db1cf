//! Content catalog query functions.

use rusqlite::Connection;

use crate::{DbError, Result};

/// Insert a content item.
pub fn insert(
    conn: &Connection,
    content_id: &[u8; 32],
    creator: &str,
    title: &str,
    description: Option<&str>,
    price: u64,
    published_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO content_catalog
         (content_id, creator, title, description, price, published_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            content_id.as_slice(),
            creator,
            title,
            description,
            price as i64,
            published_at as i64,
        ],
    )?;
    Ok(())
}

/// Look up a content item by id. Tombstoned items count as missing.
pub fn lookup(conn: &Connection, content_id: &[u8; 32]) -> Result<ContentRow> {
    conn.query_row(
        "SELECT content_id, creator, title, description, price, sales_count,
                published_at, is_tombstoned
         FROM content_catalog
         WHERE content_id = ?1 AND is_tombstoned = 0",
        [content_id.as_slice()],
        row_to_content,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("content".to_string()),
        other => DbError::Sqlite(other),
    })
}

/// List visible catalog items, newest first.
pub fn list(conn: &Connection) -> Result<Vec<ContentRow>> {
    let mut stmt = conn.prepare(
        "SELECT content_id, creator, title, description, price, sales_count,
                published_at, is_tombstoned
         FROM content_catalog
         WHERE is_tombstoned = 0
         ORDER BY published_at DESC",
    )?;

    let rows = stmt
        .query_map([], row_to_content)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Tombstone a content item.
pub fn tombstone(conn: &Connection, content_id: &[u8; 32], tombstoned_at: u64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE content_catalog SET is_tombstoned = 1, tombstoned_at = ?1
         WHERE content_id = ?2 AND is_tombstoned = 0",
        rusqlite::params![tombstoned_at as i64, content_id.as_slice()],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("content".to_string()));
    }
    Ok(())
}

/// Adjust the sales counter (purchases add one, refunds subtract one).
pub fn adjust_sales_count(conn: &Connection, content_id: &[u8; 32], delta: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE content_catalog SET sales_count = sales_count + ?1 WHERE content_id = ?2",
        rusqlite::params![delta, content_id.as_slice()],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("content".to_string()));
    }
    Ok(())
}

fn row_to_content(row: &rusqlite::Row<'_>) -> std::result::Result<ContentRow, rusqlite::Error> {
    Ok(ContentRow {
        content_id: row.get::<_, Vec<u8>>(0)?,
        creator: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        price: row.get::<_, i64>(4)? as u64,
        sales_count: row.get::<_, i64>(5)? as u32,
        published_at: row.get::<_, i64>(6)? as u64,
        is_tombstoned: row.get(7)?,
    })
}

/// A raw content row.
#[derive(Debug, Clone)]
pub struct ContentRow {
    pub content_id: Vec<u8>,
    pub creator: String,
    pub title: String,
    pub description: Option<String>,
    pub price: u64,
    pub sales_count: u32,
    pub published_at: u64,
    pub is_tombstoned: bool,
}
