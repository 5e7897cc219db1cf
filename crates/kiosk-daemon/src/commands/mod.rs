//! Command handlers: thin adapters from JSON-RPC params to the
//! marketplace workflows, mapping domain errors to RPC codes.

pub mod accounts;
pub mod catalog;
pub mod market;

use serde_json::Value;

use kiosk_market::MarketError;
use kiosk_types::ContentId;

use crate::rpc::RpcError;

pub(crate) type Result = std::result::Result<Value, RpcError>;

/// Map a workflow error to its RPC error code.
pub(crate) fn market_error(err: MarketError) -> RpcError {
    match err {
        MarketError::InvalidInput(detail) | MarketError::InvalidReference(detail) => {
            RpcError::invalid_params(&detail)
        }
        MarketError::AccountNotFound(_)
        | MarketError::ContentNotFound
        | MarketError::LedgerNotFound(_)
        | MarketError::PurchaseNotFound => RpcError::not_found(&err.to_string()),
        MarketError::InsufficientCredit { required, available } => RpcError::conflict_with(
            "insufficient credit",
            serde_json::json!({"required": required, "available": available}),
        ),
        MarketError::ExceedsAvailable { requested, available } => RpcError::conflict_with(
            "claim exceeds available earnings",
            serde_json::json!({"requested": requested, "available": available}),
        ),
        MarketError::AlreadyPurchased
        | MarketError::NothingToSettle
        | MarketError::DuplicateSettlement(_)
        | MarketError::NoPayoutAddress
        | MarketError::NoPendingEarnings
        | MarketError::UnalignedClaim { .. }
        | MarketError::NotRefundable(_) => RpcError::conflict(&err.to_string()),
        MarketError::Forbidden(detail) => RpcError::forbidden(&detail),
        MarketError::PayoutFailed(detail) => RpcError::upstream_failed(&detail),
        MarketError::AmountOverflow | MarketError::Db(_) => {
            RpcError::internal_error(&err.to_string())
        }
    }
}

/// Extract a required string parameter.
pub(crate) fn require_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

/// Extract a required u64 parameter.
pub(crate) fn require_u64(params: &Value, key: &str) -> std::result::Result<u64, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

/// Parse a hex-encoded 32-byte content id parameter.
pub(crate) fn require_content_id(
    params: &Value,
    key: &str,
) -> std::result::Result<ContentId, RpcError> {
    let hex_str = require_str(params, key)?;
    let bytes = hex::decode(hex_str)
        .map_err(|_| RpcError::invalid_params(&format!("invalid hex for {key}")))?;
    bytes
        .try_into()
        .map_err(|_| RpcError::invalid_params(&format!("{key} must be 32 bytes")))
}
