//! Account command handlers.

use std::sync::Arc;

use serde_json::Value;

use kiosk_db::queries::accounts;

use crate::commands::{market_error, require_str, Result};
use crate::rpc::RpcError;
use crate::{clock, DaemonState};

/// Register an account.
pub async fn register_account(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let display_name = require_str(params, "display_name")?;
    let payout_address = params.get("payout_address").and_then(|v| v.as_str());

    if account_id.is_empty() || account_id.len() > 128 {
        return Err(RpcError::invalid_params("account_id must be 1..=128 chars"));
    }
    if display_name.is_empty() {
        return Err(RpcError::invalid_params("display_name required"));
    }
    if let Some(address) = payout_address {
        kiosk_ledger::reference::validate_payout_address(address)
            .map_err(|e| RpcError::invalid_params(&e.to_string()))?;
    }

    let db = state.db.lock().await;
    accounts::insert(&db, account_id, display_name, payout_address, clock::unix_now()).map_err(
        |e| match e {
            kiosk_db::DbError::Sqlite(ref inner) if kiosk_db::is_unique_violation(inner) => {
                RpcError::conflict("account already registered")
            }
            other => RpcError::internal_error(&format!("db error: {other}")),
        },
    )?;

    Ok(serde_json::json!({"registered": true}))
}

/// Set or replace the payout address.
pub async fn set_payout_address(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;
    let address = require_str(params, "payout_address")?;

    kiosk_ledger::reference::validate_payout_address(address)
        .map_err(|e| RpcError::invalid_params(&e.to_string()))?;

    let db = state.db.lock().await;
    accounts::set_payout_address(&db, account_id, address).map_err(|e| match e {
        kiosk_db::DbError::NotFound(detail) => RpcError::not_found(&detail),
        other => RpcError::internal_error(&format!("db error: {other}")),
    })?;

    Ok(serde_json::json!({"updated": true}))
}

/// Get an account profile with its lifetime aggregates.
pub async fn get_account(state: &Arc<DaemonState>, params: &Value) -> Result {
    let account_id = require_str(params, "account_id")?;

    let db = state.db.lock().await;
    let profile = kiosk_market::views::account_profile(&db, account_id).map_err(market_error)?;

    serde_json::to_value(profile).map_err(|e| RpcError::internal_error(&e.to_string()))
}
