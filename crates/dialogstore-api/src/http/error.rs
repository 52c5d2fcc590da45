//! RPC error type mapping domain errors to HTTP status codes and the
//! envelope format.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use dialogstore_types::error::DialogError;

use crate::http::response::{RpcResponse, new_request_id};

/// Error returned by RPC handlers.
#[derive(Debug)]
pub enum RpcError {
    /// Failure reported by the dialog service.
    Dialog(DialogError),
    /// The request body could not be decoded into the call's message.
    Validation { status: StatusCode, message: String },
}

impl From<DialogError> for RpcError {
    fn from(e: DialogError) -> Self {
        RpcError::Dialog(e)
    }
}

impl From<JsonRejection> for RpcError {
    fn from(rejection: JsonRejection) -> Self {
        RpcError::Validation {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::Dialog(err) => match err {
                DialogError::InvalidId { .. } | DialogError::EmptyMessage => {
                    StatusCode::BAD_REQUEST
                }
                DialogError::NotFound(_) => StatusCode::NOT_FOUND,
                DialogError::AlreadyExists(_) | DialogError::AlreadyReplied(_) => {
                    StatusCode::CONFLICT
                }
                DialogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RpcError::Validation { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RpcError::Dialog(err) => err.code(),
            RpcError::Validation { .. } => "INVALID_REQUEST",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            // Storage internals stay in the log, callers get a stable message.
            RpcError::Dialog(err @ DialogError::Storage(_)) => {
                tracing::error!(error = ?err, "storage failure while serving rpc");
                "storage failure".to_string()
            }
            RpcError::Dialog(err) => err.to_string(),
            RpcError::Validation { message, .. } => message,
        };

        let body = RpcResponse::failure(code, &message, new_request_id());
        (status, Json(body)).into_response()
    }
}
