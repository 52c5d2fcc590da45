//! Axum router configuration with middleware.
//!
//! Dialog calls are under `/rpc/dialog/`, one `POST` route per operation.
//! Middleware: tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete RPC router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let dialog_routes = Router::new()
        .route("/Create", post(handlers::dialog::create))
        .route("/Get", post(handlers::dialog::get))
        .route("/Delete", post(handlers::dialog::delete))
        .route("/SetReply", post(handlers::dialog::set_reply));

    Router::new()
        .nest("/rpc/dialog", dialog_routes)
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
