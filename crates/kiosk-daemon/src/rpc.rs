//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC method calls to the command handlers. A
//! connection that calls `subscribe_events` also receives event
//! notifications interleaved with its responses.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::events::Event;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
///
/// Application codes mirror REST status semantics: `-32602` ≈ 400,
/// `-32001` ≈ 404, `-32002` ≈ 409, `-32004` ≈ 403, `-32003` ≈ 502,
/// `-32603` ≈ 500.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Missing account, content, ledger, or purchase (-32001).
    pub fn not_found(detail: &str) -> Self {
        Self {
            code: -32001,
            message: "NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// State conflict: already purchased, duplicate settlement, and the
    /// like (-32002).
    pub fn conflict(detail: &str) -> Self {
        Self {
            code: -32002,
            message: "CONFLICT".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Conflict with structured amounts (-32002).
    pub fn conflict_with(detail: &str, data: serde_json::Value) -> Self {
        Self {
            code: -32002,
            message: "CONFLICT".to_string(),
            data: Some(serde_json::json!({"detail": detail, "amounts": data})),
        }
    }

    /// Payout or other upstream service failure (-32003).
    pub fn upstream_failed(detail: &str) -> Self {
        Self {
            code: -32003,
            message: "UPSTREAM_FAILED".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Caller does not own the target resource (-32004).
    pub fn forbidden(detail: &str) -> Self {
        Self {
            code: -32004,
            message: "FORBIDDEN".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// What a connection turn produced: a request line or a bus event.
enum Turn {
    Line(usize),
    Event(std::result::Result<Event, broadcast::error::RecvError>),
}

/// Handle a single client connection.
///
/// Request lines and (for subscribed connections) event notifications are
/// interleaved on the same stream; notifications carry no `id`.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let mut subscription: Option<broadcast::Receiver<Event>> = None;

    loop {
        // Wait for the next line or, when subscribed, the next event. The
        // receiver borrow ends here so request handling below may swap the
        // subscription.
        let turn = match subscription.as_mut() {
            Some(rx) => tokio::select! {
                bytes_read = reader.read_line(&mut line) => Turn::Line(bytes_read?),
                event = rx.recv() => Turn::Event(event),
            },
            None => Turn::Line(reader.read_line(&mut line).await?),
        };

        match turn {
            Turn::Line(0) => break, // EOF
            Turn::Line(_) => {
                let response = match serde_json::from_str::<RpcRequest>(&line) {
                    Ok(request) => {
                        handle_request(state.clone(), request, &mut subscription).await
                    }
                    Err(_) => {
                        RpcResponse::error(serde_json::Value::Null, RpcError::parse_error())
                    }
                };
                line.clear();

                let mut response_json = serde_json::to_string(&response)?;
                response_json.push('\n');
                writer.write_all(response_json.as_bytes()).await?;
                writer.flush().await?;
            }
            Turn::Event(Ok(event)) => {
                let mut notification = serde_json::to_string(&serde_json::json!({
                    "jsonrpc": "2.0",
                    "method": "event",
                    "params": {
                        "category": crate::events::categorize_event(&event.event_type),
                        "event": event,
                    },
                }))?;
                notification.push('\n');
                writer.write_all(notification.as_bytes()).await?;
                writer.flush().await?;
            }
            Turn::Event(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                warn!(skipped, "event subscriber lagged");
            }
            Turn::Event(Err(broadcast::error::RecvError::Closed)) => {
                subscription = None;
            }
        }
    }

    Ok(())
}

/// Handle one request, intercepting the subscription methods that need
/// access to this connection's receiver.
async fn handle_request(
    state: Arc<DaemonState>,
    request: RpcRequest,
    subscription: &mut Option<broadcast::Receiver<Event>>,
) -> RpcResponse {
    let id = request.id.clone();

    match request.method.as_str() {
        "subscribe_events" => {
            *subscription = Some(state.event_bus.subscribe());
            RpcResponse::success(
                id,
                serde_json::json!({
                    "subscribed": true,
                    "sequence": state.event_bus.sequence(),
                }),
            )
        }
        "unsubscribe_events" => {
            *subscription = None;
            RpcResponse::success(id, serde_json::json!({"subscribed": false}))
        }
        _ => dispatch_request(state, request).await,
    }
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Account commands
        "register_account" => commands::accounts::register_account(&state, &request.params).await,
        "set_payout_address" => {
            commands::accounts::set_payout_address(&state, &request.params).await
        }
        "get_account" => commands::accounts::get_account(&state, &request.params).await,

        // Catalog commands
        "publish_content" => commands::catalog::publish_content(&state, &request.params).await,
        "get_catalog" => commands::catalog::get_catalog(&state).await,
        "tombstone_content" => {
            commands::catalog::tombstone_content(&state, &request.params).await
        }

        // Market commands (credit ledger core)
        "purchase_content" => commands::market::purchase_content(&state, &request.params).await,
        "get_credit_balance" => {
            commands::market::get_credit_balance(&state, &request.params).await
        }
        "settle_credit" => commands::market::settle_credit(&state, &request.params).await,
        "get_creator_earnings" => {
            commands::market::get_creator_earnings(&state, &request.params).await
        }
        "claim_earnings" => commands::market::claim_earnings(&state, &request.params).await,
        "get_purchase_history" => {
            commands::market::get_purchase_history(&state, &request.params).await
        }
        "refund_purchase" => commands::market::refund_purchase(&state, &request.params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(RpcError::parse_error().code, -32700);
        assert_eq!(RpcError::method_not_found("unknown").code, -32601);
        assert_eq!(RpcError::invalid_params("x").code, -32602);
        assert_eq!(RpcError::internal_error("x").code, -32603);
        assert_eq!(RpcError::not_found("x").code, -32001);
        assert_eq!(RpcError::conflict("x").code, -32002);
        assert_eq!(RpcError::upstream_failed("x").code, -32003);
        assert_eq!(RpcError::forbidden("x").code, -32004);
    }

    #[test]
    fn test_rpc_response_success() {
        let resp = RpcResponse::success(
            serde_json::json!(1),
            serde_json::json!({"balance": 1000}),
        );
        assert!(resp.result.is_some());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_rpc_response_error() {
        let resp = RpcResponse::error(
            serde_json::json!(1),
            RpcError::internal_error("test"),
        );
        assert!(resp.result.is_none());
        assert!(resp.error.is_some());
    }

    #[test]
    fn test_conflict_with_amounts() {
        let err = RpcError::conflict_with(
            "insufficient credit",
            serde_json::json!({"required": 50, "available": 20}),
        );
        assert_eq!(err.code, -32002);
        let data = err.data.expect("data");
        assert_eq!(data["amounts"]["required"], 50);
    }
}
