//! Dialog RPC handlers.
//!
//! Every call is a `POST` with a JSON request message. Handlers never decide
//! outcomes themselves: validation and state rules live in the service and
//! the entity, and errors are encoded by [`RpcError`]. Bodies that do not
//! decode are rejected inside the same envelope.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use dialogstore_types::dialog::{CreateDialogRequest, Dialog};

use crate::http::error::RpcError;
use crate::http::response::{Ack, RpcResponse, elapsed_ms, new_request_id};
use crate::state::AppState;

/// Request naming a single dialog.
#[derive(Debug, Deserialize)]
pub struct DialogIdRequest {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetReplyRequest {
    pub id: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct Found {
    pub dialog: Dialog,
}

/// POST /rpc/dialog/Create - Start a dialog.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateDialogRequest>, JsonRejection>,
) -> Result<Json<RpcResponse<Created>>, RpcError> {
    let start = Instant::now();
    let request_id = new_request_id();
    let Json(body) = payload?;

    let id = state.dialog_service.create(body).await?;

    Ok(Json(RpcResponse::success(
        Created { id },
        request_id,
        elapsed_ms(start),
    )))
}

/// POST /rpc/dialog/Get - Fetch a dialog by id.
#[tracing::instrument(skip_all)]
pub async fn get(
    State(state): State<AppState>,
    payload: Result<Json<DialogIdRequest>, JsonRejection>,
) -> Result<Json<RpcResponse<Found>>, RpcError> {
    let start = Instant::now();
    let request_id = new_request_id();
    let Json(body) = payload?;

    let dialog = state.dialog_service.get(body.id).await?;

    Ok(Json(RpcResponse::success(
        Found { dialog },
        request_id,
        elapsed_ms(start),
    )))
}

/// POST /rpc/dialog/Delete - Remove a dialog.
#[tracing::instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    payload: Result<Json<DialogIdRequest>, JsonRejection>,
) -> Result<Json<RpcResponse<Ack>>, RpcError> {
    let start = Instant::now();
    let request_id = new_request_id();
    let Json(body) = payload?;

    state.dialog_service.delete(body.id).await?;

    Ok(Json(RpcResponse::ack(request_id, elapsed_ms(start))))
}

/// POST /rpc/dialog/SetReply - Record the one reply a dialog accepts.
#[tracing::instrument(skip_all)]
pub async fn set_reply(
    State(state): State<AppState>,
    payload: Result<Json<SetReplyRequest>, JsonRejection>,
) -> Result<Json<RpcResponse<Ack>>, RpcError> {
    let start = Instant::now();
    let request_id = new_request_id();
    let Json(body) = payload?;

    state
        .dialog_service
        .set_reply(body.id, &body.message)
        .await?;

    Ok(Json(RpcResponse::ack(request_id, elapsed_ms(start))))
}
