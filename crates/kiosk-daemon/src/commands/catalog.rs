//! Catalog command handlers.

use std::sync::Arc;

use serde_json::Value;

use kiosk_market::{publish, views};

use crate::commands::{market_error, require_content_id, require_str, require_u64, Result};
use crate::events::Event;
use crate::rpc::RpcError;
use crate::{clock, DaemonState};

/// Publish a content item.
pub async fn publish_content(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let title = require_str(params, "title")?;
    let description = params.get("description").and_then(|v| v.as_str());
    let price = require_u64(params, "price")?;

    let now = clock::unix_now();
    let mut db = state.db.lock().await;
    let content_id = publish::publish_content(&mut db, account_id, title, description, price, now)
        .map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "ContentPublished".to_string(),
        timestamp: now,
        payload: serde_json::json!({
            "content_id": hex::encode(content_id),
            "creator": account_id,
            "price": price,
        }),
    });

    Ok(serde_json::json!({"content_id": hex::encode(content_id)}))
}

/// List the visible catalog.
pub async fn get_catalog(state: &Arc<DaemonState>) -> Result {
    let db = state.db.lock().await;
    let items = views::catalog(&db).map_err(market_error)?;

    serde_json::to_value(items).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Tombstone a content item.
pub async fn tombstone_content(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let content_id = require_content_id(params, "content_id")?;

    let now = clock::unix_now();
    let mut db = state.db.lock().await;
    publish::tombstone_content(&mut db, account_id, &content_id, now).map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "ContentTombstoned".to_string(),
        timestamp: now,
        payload: serde_json::json!({"content_id": hex::encode(content_id)}),
    });

    Ok(serde_json::json!({"tombstoned": true}))
}
