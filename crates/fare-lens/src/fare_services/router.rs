use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::gateway::{FareServiceGateway, FetchError};
use super::service::FareServices;
use super::tracker::LookupState;

/// Router builder exposing the fare-rules and upsell lookups.
pub fn fare_services_router<G>(services: Arc<FareServices<G>>) -> Router
where
    G: FareServiceGateway + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/offers/:offer_id/fare-rules",
            get(fare_rules_handler::<G>).delete(dismiss_fare_rules_handler::<G>),
        )
        .route(
            "/api/v1/offers/:offer_id/fare-rules/retry",
            post(retry_fare_rules_handler::<G>),
        )
        .route("/api/v1/offers/upsell", post(upsell_handler::<G>))
        .route("/api/v1/offers/upsell/retry", post(retry_upsell_handler::<G>))
        .route(
            "/api/v1/offers/:offer_id/upsell",
            delete(dismiss_upsell_handler::<G>),
        )
        .with_state(services)
}

pub(crate) async fn fare_rules_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    Path(offer_id): Path<String>,
) -> Response
where
    G: FareServiceGateway + ?Sized + 'static,
{
    lookup_response(services.fare_rules(&offer_id).await)
}

pub(crate) async fn retry_fare_rules_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    Path(offer_id): Path<String>,
) -> Response
where
    G: FareServiceGateway + ?Sized + 'static,
{
    lookup_response(services.retry_fare_rules(&offer_id).await)
}

pub(crate) async fn dismiss_fare_rules_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    Path(offer_id): Path<String>,
) -> StatusCode
where
    G: FareServiceGateway + ?Sized + 'static,
{
    services.dismiss_fare_rules(&offer_id);
    StatusCode::NO_CONTENT
}

pub(crate) async fn upsell_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    axum::Json(offer): axum::Json<Value>,
) -> Response
where
    G: FareServiceGateway + ?Sized + 'static,
{
    lookup_response(services.upsell(&offer).await)
}

pub(crate) async fn retry_upsell_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    axum::Json(offer): axum::Json<Value>,
) -> Response
where
    G: FareServiceGateway + ?Sized + 'static,
{
    lookup_response(services.retry_upsell(&offer).await)
}

pub(crate) async fn dismiss_upsell_handler<G>(
    State(services): State<Arc<FareServices<G>>>,
    Path(offer_id): Path<String>,
) -> StatusCode
where
    G: FareServiceGateway + ?Sized + 'static,
{
    services.dismiss_upsell(&offer_id);
    StatusCode::NO_CONTENT
}

fn lookup_response<T: Serialize>(outcome: Result<LookupState<T>, FetchError>) -> Response {
    match outcome {
        Ok(state @ LookupState::Resolved(_)) => (StatusCode::OK, axum::Json(state)).into_response(),
        Ok(state @ (LookupState::Pending | LookupState::Idle)) => {
            (StatusCode::ACCEPTED, axum::Json(state)).into_response()
        }
        Ok(LookupState::Failed(reason)) => {
            let payload = json!({
                "state": "failed",
                "error": reason,
                "retryable": true,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let status = match error {
                FetchError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            let payload = json!({
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}
