use super::common::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::fare_services::router::fare_services_router;
use crate::fare_services::service::{DisabledGateway, FareServices};
use crate::fare_services::FareServiceGateway;
use crate::offers::OfferEngine;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn fare_rules_route_returns_resolved_rules() {
    let (services, _) = services(MockGateway::default());
    let router = fare_services_router(services);

    let response = router
        .oneshot(get("/api/v1/offers/offer-1/fare-rules"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["state"], "resolved");
    assert_eq!(body["data"]["changeFee"], 75.0);
    assert_eq!(body["data"]["refundable"], false);
}

#[tokio::test]
async fn failed_lookup_is_a_dismissible_bad_gateway() {
    let (services, _) = services(MockGateway::failing(reqwest::StatusCode::SERVICE_UNAVAILABLE));

    let response = fare_services_router(services.clone())
        .oneshot(get("/api/v1/offers/offer-9/fare-rules"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["state"], "failed");
    assert_eq!(body["retryable"], true);

    let dismissed = fare_services_router(services.clone())
        .oneshot(
            Request::delete("/api/v1/offers/offer-9/fare-rules")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(dismissed.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn retry_route_refetches() {
    let (services, gateway) = services(MockGateway::failing(reqwest::StatusCode::BAD_GATEWAY));
    services.fare_rules("offer-5").await.expect("configured");
    gateway.recover();

    let response = fare_services_router(services)
        .oneshot(
            Request::post("/api/v1/offers/offer-5/fare-rules/retry")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upsell_route_answers_with_normalized_options() {
    let (services, _) = services(MockGateway::with_options(vec![raw_offer("up-1", "FLEX")]));

    let response = fare_services_router(services)
        .oneshot(
            Request::post("/api/v1/offers/upsell")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&raw_offer("base", "LIGHT")).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["fare_family"], "Flexible");
}

#[tokio::test]
async fn unconfigured_services_answer_unavailable() {
    let gateway: Arc<dyn FareServiceGateway> = Arc::new(DisabledGateway);
    let services = Arc::new(FareServices::new(gateway, Arc::new(OfferEngine::default())));

    let response = fare_services_router(services)
        .oneshot(get("/api/v1/offers/offer-1/fare-rules"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializes")))
        .expect("request builds")
}

#[tokio::test]
async fn failed_upsell_is_retried_over_http() {
    let (services, gateway) = services(MockGateway::failing(reqwest::StatusCode::BAD_GATEWAY));
    let offer = raw_offer("base", "LIGHT");

    let failed = fare_services_router(services.clone())
        .oneshot(post_json("/api/v1/offers/upsell", &offer))
        .await
        .expect("router responds");
    assert_eq!(failed.status(), StatusCode::BAD_GATEWAY);

    gateway.recover();
    let retried = fare_services_router(services)
        .oneshot(post_json("/api/v1/offers/upsell/retry", &offer))
        .await
        .expect("router responds");
    assert_eq!(retried.status(), StatusCode::OK);
}

#[tokio::test]
async fn failed_upsell_is_dismissed_over_http() {
    let (services, gateway) = services(MockGateway::failing(reqwest::StatusCode::BAD_GATEWAY));
    let offer = raw_offer("base", "LIGHT");
    services.upsell(&offer).await.expect("configured");

    let dismissed = fare_services_router(services.clone())
        .oneshot(
            Request::delete("/api/v1/offers/base/upsell")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(dismissed.status(), StatusCode::NO_CONTENT);

    gateway.recover();
    let fresh = fare_services_router(services)
        .oneshot(post_json("/api/v1/offers/upsell", &offer))
        .await
        .expect("router responds");
    assert_eq!(fresh.status(), StatusCode::OK);
}
