use crate::cli::ServeArgs;
use crate::infra::{build_fare_services, AppState};
use crate::routes::with_offer_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fare_lens::config::AppConfig;
use fare_lens::error::AppError;
use fare_lens::offers::OfferEngine;
use fare_lens::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(OfferEngine::new(config.pricing.clone()));
    let fare_services = build_fare_services(&config.fare_services, engine.clone())?;

    let app = with_offer_routes(engine, fare_services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fare_services = config.fare_services.base_url.is_some(),
        "fare lens api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
