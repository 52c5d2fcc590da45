//! Envelope response format for all RPC responses.
//!
//! Every response carries a success flag, the operation's payload fields (on
//! success) or an error (on failure), and request metadata:
//! ```json
//! {
//!   "success": true,
//!   "id": 42,
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 1 }
//! }
//! ```

use serde::Serialize;

/// Envelope wrapping every RPC result.
#[derive(Debug, Serialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,

    /// Operation payload, inlined next to `success`.
    #[serde(flatten)]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorDetail>,

    pub meta: RpcMeta,
}

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct RpcMeta {
    /// Unique request identifier for tracing.
    pub request_id: String,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
    /// Response time in milliseconds.
    pub response_time_ms: u64,
}

/// Error detail of a failed call.
#[derive(Debug, Serialize)]
pub struct RpcErrorDetail {
    /// Machine-readable error code, stable across releases.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Payload of calls that only report success.
#[derive(Debug, Serialize)]
pub struct Ack {}

impl RpcMeta {
    pub fn new(request_id: String, response_time_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_time_ms,
        }
    }
}

impl<T: Serialize> RpcResponse<T> {
    /// Create a success response with data.
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: RpcMeta::new(request_id, response_time_ms),
        }
    }
}

impl RpcResponse<Ack> {
    /// Create a success response without payload.
    pub fn ack(request_id: String, response_time_ms: u64) -> Self {
        Self::success(Ack {}, request_id, response_time_ms)
    }

    /// Create an error response (no data).
    pub fn failure(code: &str, message: &str, request_id: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(RpcErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            }),
            meta: RpcMeta::new(request_id, 0),
        }
    }
}

/// Generate a time-sortable request id.
pub fn new_request_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Milliseconds since `start`, saturating at `u64::MAX`.
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
