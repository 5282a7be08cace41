use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::fare_services::domain::{FareRules, UpsellResponse};
use crate::fare_services::gateway::{FareServiceGateway, FetchError};
use crate::fare_services::service::FareServices;
use crate::offers::OfferEngine;

pub(super) fn fare_rules() -> FareRules {
    FareRules {
        refundable: false,
        refund_fee: None,
        refund_policy: "Non-refundable".to_string(),
        changeable: true,
        change_fee: Some(75.0),
        change_policy: "Changes allowed for a fee".to_string(),
        cancellation_policy: "24-hour free cancellation".to_string(),
        restrictions: vec!["Name changes not permitted".to_string()],
    }
}

pub(super) fn raw_offer(id: &str, fare_option: &str) -> Value {
    json!({
        "id": id,
        "itineraries": [{
            "duration": "PT2H",
            "segments": [{
                "departure": {"iataCode": "DFW", "at": "2025-11-02T08:00:00"},
                "arrival": {"iataCode": "ATL", "at": "2025-11-02T11:00:00"},
                "carrierCode": "DL",
                "number": "88"
            }]
        }],
        "price": {"total": "210.00", "currency": "USD"},
        "travelerPricings": [{
            "fareDetailsBySegment": [{"cabin": "ECONOMY", "fareOption": fare_option}]
        }]
    })
}

/// Scripted gateway counting calls. When `gate` is set, fare-rules calls
/// wait for a notification before answering.
#[derive(Default)]
pub(super) struct MockGateway {
    pub(super) fare_rules_calls: AtomicUsize,
    pub(super) upsell_calls: AtomicUsize,
    pub(super) fail_with: Mutex<Option<StatusCode>>,
    pub(super) fare_options: Mutex<Vec<Value>>,
    pub(super) gate: Option<Arc<Notify>>,
}

impl MockGateway {
    pub(super) fn failing(status: StatusCode) -> Self {
        Self {
            fail_with: Mutex::new(Some(status)),
            ..Self::default()
        }
    }

    pub(super) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub(super) fn with_options(options: Vec<Value>) -> Self {
        Self {
            fare_options: Mutex::new(options),
            ..Self::default()
        }
    }

    pub(super) fn recover(&self) {
        *self.fail_with.lock().expect("mock mutex poisoned") = None;
    }

    fn scripted_failure(&self) -> Option<FetchError> {
        let status = *self.fail_with.lock().expect("mock mutex poisoned");
        status.map(FetchError::Status)
    }
}

#[async_trait]
impl FareServiceGateway for MockGateway {
    async fn fare_rules(&self, _offer_id: &str) -> Result<FareRules, FetchError> {
        self.fare_rules_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.scripted_failure() {
            Some(error) => Err(error),
            None => Ok(fare_rules()),
        }
    }

    async fn upsell(&self, _offer: &Value) -> Result<UpsellResponse, FetchError> {
        self.upsell_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.scripted_failure() {
            return Err(error);
        }
        Ok(UpsellResponse {
            success: true,
            fare_options: self.fare_options.lock().expect("mock mutex poisoned").clone(),
        })
    }
}

pub(super) fn services(gateway: MockGateway) -> (Arc<FareServices<MockGateway>>, Arc<MockGateway>) {
    let gateway = Arc::new(gateway);
    let services = Arc::new(FareServices::new(
        gateway.clone(),
        Arc::new(OfferEngine::default()),
    ));
    (services, gateway)
}
