use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tracing::info;

use super::ingest::IngestError;
use super::view::OfferEngine;

/// Router exposing the offer view computation.
pub fn offer_router(engine: Arc<OfferEngine>) -> Router {
    Router::new()
        .route("/api/v1/offers/view", post(view_handler))
        .with_state(engine)
}

pub(crate) async fn view_handler(
    State(engine): State<Arc<OfferEngine>>,
    axum::Json(raw): axum::Json<Value>,
) -> Response {
    match engine.compute(&raw) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => invalid_offer(error),
    }
}

/// Body of the "invalid offer" card: a typed state, not a server failure.
pub(crate) fn invalid_offer(error: IngestError) -> Response {
    info!(%error, "rejected offer");
    let payload = json!({
        "error": error.to_string(),
        "state": "invalid_offer",
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}
