//! Credit ledger command handlers: purchase, balance, settlement,
//! earnings, claim, history, refund.

use std::sync::Arc;

use serde_json::Value;

use kiosk_market::{claim, purchase, refund, settlement, views};

use crate::commands::{market_error, require_content_id, require_str, require_u64, Result};
use crate::events::Event;
use crate::rpc::RpcError;
use crate::{clock, DaemonState};

/// Purchase a content item on credit.
pub async fn purchase_content(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let content_id = require_content_id(params, "content_id")?;

    let now = clock::unix_now();
    let mut db = state.db.lock().await;
    let receipt =
        purchase::purchase_content(&mut db, &state.market, account_id, &content_id, now)
            .map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "PurchaseCompleted".to_string(),
        timestamp: now,
        payload: serde_json::json!({
            "buyer": account_id,
            "content_id": receipt.content_id,
            "amount": receipt.amount,
        }),
    });

    serde_json::to_value(receipt).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Get the caller's credit balance, creating the ledger lazily.
pub async fn get_credit_balance(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;

    let db = state.db.lock().await;
    let balance = views::credit_balance(&db, &state.market, account_id, clock::unix_now())
        .map_err(market_error)?;

    serde_json::to_value(balance).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Settle outstanding credit usage with an external payment reference.
pub async fn settle_credit(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let transaction_hash = require_str(params, "transaction_hash")?;

    let now = clock::unix_now();
    let mut db = state.db.lock().await;
    let receipt =
        settlement::settle_credit(&mut db, &state.market, account_id, transaction_hash, now)
            .map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "CreditSettled".to_string(),
        timestamp: now,
        payload: serde_json::json!({
            "buyer": account_id,
            "reference": receipt.reference,
            "total_amount": receipt.total_amount,
        }),
    });

    serde_json::to_value(receipt).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Get a creator's earnings summary and list.
pub async fn get_creator_earnings(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;

    let db = state.db.lock().await;
    let (summary, earnings) =
        views::creator_earnings(&db, account_id).map_err(market_error)?;

    Ok(serde_json::json!({
        "summary": summary,
        "earnings": earnings,
    }))
}

/// Claim pending earnings, triggering a stablecoin payout.
pub async fn claim_earnings(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let amount = require_u64(params, "amount")?;

    let now = clock::unix_now();
    // The lock is held across the payout await so concurrent claims
    // against the same creator serialize.
    let mut db = state.db.lock().await;
    let receipt = claim::claim_earnings(
        &mut db,
        &state.market,
        state.payout.as_ref(),
        account_id,
        amount,
        now,
    )
    .await
    .map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "EarningsClaimed".to_string(),
        timestamp: now,
        payload: serde_json::json!({
            "creator": account_id,
            "claimed_amount": receipt.claimed_amount,
            "payout_reference": receipt.payout_reference,
        }),
    });

    serde_json::to_value(receipt).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Get the caller's purchase history.
pub async fn get_purchase_history(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;

    let db = state.db.lock().await;
    let history = views::purchase_history(&db, account_id).map_err(market_error)?;

    serde_json::to_value(history).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Refund an unsettled purchase.
pub async fn refund_purchase(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let content_id = require_content_id(params, "content_id")?;

    let now = clock::unix_now();
    let mut db = state.db.lock().await;
    let receipt = refund::refund_purchase(&mut db, &state.market, account_id, &content_id, now)
        .map_err(market_error)?;
    drop(db);

    state.event_bus.emit(Event {
        event_type: "PurchaseRefunded".to_string(),
        timestamp: now,
        payload: serde_json::json!({
            "buyer": account_id,
            "content_id": hex::encode(content_id),
            "amount": receipt.amount,
        }),
    });

    serde_json::to_value(receipt).map_err(|e| RpcError::internal_error(&e.to_string()))
}
