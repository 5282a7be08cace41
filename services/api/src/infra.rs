use fare_lens::config::FareServicesConfig;
use fare_lens::fare_services::{
    DisabledGateway, FareServiceGateway, FareServices, HttpFareServiceClient,
};
use fare_lens::offers::OfferEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SharedFareServices = Arc<FareServices<dyn FareServiceGateway>>;

/// HTTP-backed lookups when a service URL is configured, disabled ones otherwise.
pub(crate) fn build_fare_services(
    config: &FareServicesConfig,
    engine: Arc<OfferEngine>,
) -> Result<SharedFareServices, fare_lens::fare_services::FetchError> {
    let gateway: Arc<dyn FareServiceGateway> = match config.base_url.as_deref() {
        Some(base) => Arc::new(HttpFareServiceClient::new(base)?),
        None => {
            warn!("FARE_SERVICE_URL not set, fare rules and upsell lookups are disabled");
            Arc::new(DisabledGateway)
        }
    };
    Ok(Arc::new(FareServices::with_cache_capacity(
        gateway,
        engine,
        config.cache_capacity,
    )))
}
