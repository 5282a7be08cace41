use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::domain::{FareRules, UpsellResponse};
use super::gateway::{FareServiceGateway, FetchError};
use super::tracker::{Admission, LookupState, RequestTracker, DEFAULT_CAPACITY};
use crate::offers::{OfferEngine, OfferViewModel};

/// Fare-rules and upsell lookups for the offers a traveler is looking at.
///
/// Each lookup is deduplicated per offer id. Failures are kept until the
/// caller retries or dismisses them; nothing is retried automatically.
pub struct FareServices<G: ?Sized> {
    gateway: Arc<G>,
    engine: Arc<OfferEngine>,
    fare_rules: RequestTracker<FareRules>,
    upsells: RequestTracker<Vec<OfferViewModel>>,
}

impl<G> FareServices<G>
where
    G: FareServiceGateway + ?Sized + 'static,
{
    pub fn new(gateway: Arc<G>, engine: Arc<OfferEngine>) -> Self {
        Self::with_cache_capacity(gateway, engine, DEFAULT_CAPACITY)
    }

    /// Like [`FareServices::new`], remembering at most `capacity` settled
    /// lookups of each kind.
    pub fn with_cache_capacity(gateway: Arc<G>, engine: Arc<OfferEngine>, capacity: usize) -> Self {
        Self {
            gateway,
            engine,
            fare_rules: RequestTracker::with_capacity(capacity),
            upsells: RequestTracker::with_capacity(capacity),
        }
    }

    /// Fetches fare rules unless a request is already pending or settled.
    ///
    /// Only [`FetchError::NotConfigured`] escapes as an error; every other
    /// failure is recorded and returned as [`LookupState::Failed`]. If the
    /// returned future is dropped mid-request the slot goes back to idle.
    pub async fn fare_rules(&self, offer_id: &str) -> Result<LookupState<FareRules>, FetchError> {
        let slot = match self.fare_rules.begin(offer_id) {
            Admission::Start(slot) => slot,
            Admission::InFlight => return Ok(LookupState::Pending),
            Admission::Cached(rules) => return Ok(LookupState::Resolved(rules)),
            Admission::Failed(reason) => return Ok(LookupState::Failed(reason)),
        };

        match self.gateway.fare_rules(offer_id).await {
            Ok(rules) => {
                slot.complete(rules.clone());
                Ok(LookupState::Resolved(rules))
            }
            Err(FetchError::NotConfigured) => {
                slot.release();
                Err(FetchError::NotConfigured)
            }
            Err(error) => {
                warn!(offer_id, %error, "fare rules lookup failed");
                let reason = error.to_string();
                slot.fail(reason.clone());
                Ok(LookupState::Failed(reason))
            }
        }
    }

    pub async fn retry_fare_rules(
        &self,
        offer_id: &str,
    ) -> Result<LookupState<FareRules>, FetchError> {
        info!(offer_id, "retrying fare rules lookup");
        self.fare_rules.reset(offer_id);
        self.fare_rules(offer_id).await
    }

    pub fn dismiss_fare_rules(&self, offer_id: &str) {
        self.fare_rules.reset(offer_id);
    }

    pub fn fare_rules_state(&self, offer_id: &str) -> LookupState<FareRules> {
        self.fare_rules.state(offer_id)
    }

    /// Requests alternative fares and runs each through the offer engine.
    /// Options the engine rejects are dropped. Offers without an id are
    /// fetched without deduplication.
    pub async fn upsell(
        &self,
        offer: &Value,
    ) -> Result<LookupState<Vec<OfferViewModel>>, FetchError> {
        let key = offer_key(offer);

        let slot = match key.as_deref() {
            Some(key) => match self.upsells.begin(key) {
                Admission::Start(slot) => Some(slot),
                Admission::InFlight => return Ok(LookupState::Pending),
                Admission::Cached(options) => return Ok(LookupState::Resolved(options)),
                Admission::Failed(reason) => return Ok(LookupState::Failed(reason)),
            },
            None => None,
        };

        match self.gateway.upsell(offer).await {
            Ok(response) => {
                let options = self.normalize_options(&response.fare_options);
                if let Some(slot) = slot {
                    slot.complete(options.clone());
                }
                Ok(LookupState::Resolved(options))
            }
            Err(FetchError::NotConfigured) => {
                if let Some(slot) = slot {
                    slot.release();
                }
                Err(FetchError::NotConfigured)
            }
            Err(error) => {
                warn!(offer_id = key.as_deref().unwrap_or("-"), %error, "upsell lookup failed");
                let reason = error.to_string();
                if let Some(slot) = slot {
                    slot.fail(reason.clone());
                }
                Ok(LookupState::Failed(reason))
            }
        }
    }

    /// Clears whatever is remembered for the offer and asks again.
    pub async fn retry_upsell(
        &self,
        offer: &Value,
    ) -> Result<LookupState<Vec<OfferViewModel>>, FetchError> {
        if let Some(key) = offer_key(offer) {
            info!(offer_id = %key, "retrying upsell lookup");
            self.upsells.reset(&key);
        }
        self.upsell(offer).await
    }

    pub fn dismiss_upsell(&self, offer_id: &str) {
        self.upsells.reset(offer_id);
    }

    pub fn upsell_state(&self, offer_id: &str) -> LookupState<Vec<OfferViewModel>> {
        self.upsells.state(offer_id)
    }

    fn normalize_options(&self, options: &[Value]) -> Vec<OfferViewModel> {
        options
            .iter()
            .enumerate()
            .filter_map(|(index, option)| match self.engine.compute(option) {
                Ok(view) => Some(view),
                Err(error) => {
                    warn!(index, %error, "dropping invalid upsell option");
                    None
                }
            })
            .collect()
    }
}

fn offer_key(offer: &Value) -> Option<String> {
    match offer.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Gateway used when no fare service URL is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

#[async_trait::async_trait]
impl FareServiceGateway for DisabledGateway {
    async fn fare_rules(&self, _offer_id: &str) -> Result<FareRules, FetchError> {
        Err(FetchError::NotConfigured)
    }

    async fn upsell(&self, _offer: &Value) -> Result<UpsellResponse, FetchError> {
        Err(FetchError::NotConfigured)
    }
}
