//! Catalog publishing and tombstoning.

use rusqlite::Connection;

use kiosk_db::queries::{accounts, content};
use kiosk_types::{ContentId, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

use crate::{MarketError, Result};

/// Publish a content item and return its id.
///
/// The id is a BLAKE3 hash over the creator, title, publish time, and a
/// random nonce; it stands in for the manifest hash a real upload pipeline
/// would produce.
pub fn publish_content(
    conn: &mut Connection,
    creator: &str,
    title: &str,
    description: Option<&str>,
    price: u64,
    now: u64,
) -> Result<ContentId> {
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(MarketError::InvalidInput(format!(
            "title must be 1..={MAX_TITLE_LEN} characters"
        )));
    }
    if let Some(desc) = description {
        if desc.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(MarketError::InvalidInput(format!(
                "description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    if price == 0 {
        return Err(MarketError::InvalidInput("price must be non-zero".to_string()));
    }

    let content_id = derive_content_id(creator, title, now);

    let tx = conn.transaction().map_err(kiosk_db::DbError::Sqlite)?;
    if !accounts::exists(&tx, creator)? {
        return Err(MarketError::AccountNotFound(creator.to_string()));
    }
    content::insert(&tx, &content_id, creator, title, description, price, now)?;
    tx.commit().map_err(kiosk_db::DbError::Sqlite)?;

    tracing::info!(
        creator,
        content_id = %hex::encode(content_id),
        price,
        "content published"
    );

    Ok(content_id)
}

/// Tombstone a content item. Only its creator may do so; existing
/// purchases are unaffected.
pub fn tombstone_content(
    conn: &mut Connection,
    caller: &str,
    content_id: &ContentId,
    now: u64,
) -> Result<()> {
    let tx = conn.transaction().map_err(kiosk_db::DbError::Sqlite)?;

    let item = content::lookup(&tx, content_id).map_err(|e| match e {
        kiosk_db::DbError::NotFound(_) => MarketError::ContentNotFound,
        other => MarketError::Db(other),
    })?;
    if item.creator != caller {
        return Err(MarketError::Forbidden(
            "only the creator may tombstone content".to_string(),
        ));
    }

    content::tombstone(&tx, content_id, now)?;
    tx.commit().map_err(kiosk_db::DbError::Sqlite)?;

    tracing::info!(caller, content_id = %hex::encode(content_id), "content tombstoned");

    Ok(())
}

fn derive_content_id(creator: &str, title: &str, now: u64) -> ContentId {
    let mut nonce = [0u8; 8];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut nonce);

    let mut hasher = blake3::Hasher::new();
    hasher.update(creator.as_bytes());
    hasher.update(title.as_bytes());
    hasher.update(&now.to_le_bytes());
    hasher.update(&nonce);
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_db::queries::accounts;

    fn test_db() -> Connection {
        let conn = kiosk_db::open_memory().expect("open test db");
        accounts::insert(&conn, "0xcreator", "Creator", None, 1000).expect("account");
        conn
    }

    #[test]
    fn test_publish_and_lookup() {
        let mut conn = test_db();
        let id = publish_content(&mut conn, "0xcreator", "Tape Loops", None, 30_000_000, 2000)
            .expect("publish");

        let item = content::lookup(&conn, &id).expect("lookup");
        assert_eq!(item.title, "Tape Loops");
        assert_eq!(item.price, 30_000_000);
    }

    #[test]
    fn test_publish_unique_ids() {
        let mut conn = test_db();
        let a = publish_content(&mut conn, "0xcreator", "Same Title", None, 10, 2000)
            .expect("publish");
        let b = publish_content(&mut conn, "0xcreator", "Same Title", None, 10, 2000)
            .expect("publish");
        assert_ne!(a, b);
    }

    #[test]
    fn test_publish_rejects_empty_title() {
        let mut conn = test_db();
        assert!(matches!(
            publish_content(&mut conn, "0xcreator", "", None, 10, 2000),
            Err(MarketError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_publish_rejects_zero_price() {
        let mut conn = test_db();
        assert!(matches!(
            publish_content(&mut conn, "0xcreator", "Item", None, 0, 2000),
            Err(MarketError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_publish_unknown_account() {
        let mut conn = test_db();
        assert!(matches!(
            publish_content(&mut conn, "0xnobody", "Item", None, 10, 2000),
            Err(MarketError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_tombstone_by_creator() {
        let mut conn = test_db();
        let id = publish_content(&mut conn, "0xcreator", "Item", None, 10, 2000)
            .expect("publish");
        tombstone_content(&mut conn, "0xcreator", &id, 3000).expect("tombstone");
        assert!(matches!(
            content::lookup(&conn, &id),
            Err(kiosk_db::DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_tombstone_by_stranger_forbidden() {
        let mut conn = test_db();
        accounts::insert(&conn, "0xother", "Other", None, 1000).expect("account");
        let id = publish_content(&mut conn, "0xcreator", "Item", None, 10, 2000)
            .expect("publish");
        assert!(matches!(
            tombstone_content(&mut conn, "0xother", &id, 3000),
            Err(MarketError::Forbidden(_))
        ));
    }
}
