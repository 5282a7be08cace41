use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::domain::{FareRules, FareRulesEnvelope, UpsellRequest, UpsellResponse};

const USER_AGENT: &str = concat!("fare-lens/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fare services are not configured")]
    NotConfigured,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("fare service answered {0}")]
    Status(StatusCode),
    #[error("fare service response missing data")]
    MissingData,
    #[error("upsell service reported failure")]
    Unsuccessful,
}

/// Remote fare-rules and fare-upsell endpoints.
#[async_trait]
pub trait FareServiceGateway: Send + Sync {
    async fn fare_rules(&self, offer_id: &str) -> Result<FareRules, FetchError>;

    async fn upsell(&self, offer: &Value) -> Result<UpsellResponse, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpFareServiceClient {
    http: Client,
    base_url: Url,
}

impl HttpFareServiceClient {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        // Url::join drops the last path segment unless the base ends in '/'.
        let base_url = if base.ends_with('/') {
            Url::parse(base)?
        } else {
            Url::parse(&format!("{base}/"))?
        };
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn fare_rules_url(&self, offer_id: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.join("fare-rules")?;
        url.query_pairs_mut().append_pair("flightOfferId", offer_id);
        Ok(url)
    }

    pub(crate) fn upsell_url(&self) -> Result<Url, FetchError> {
        Ok(self.base_url.join("flights/upselling")?)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, FetchError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response)
    }
}

#[async_trait]
impl FareServiceGateway for HttpFareServiceClient {
    async fn fare_rules(&self, offer_id: &str) -> Result<FareRules, FetchError> {
        let url = self.fare_rules_url(offer_id)?;
        debug!(%url, "fetching fare rules");
        let envelope: FareRulesEnvelope = self.send(self.http.get(url)).await?.json().await?;
        envelope.data.ok_or(FetchError::MissingData)
    }

    async fn upsell(&self, offer: &Value) -> Result<UpsellResponse, FetchError> {
        let url = self.upsell_url()?;
        debug!(%url, "requesting fare upsell");
        let body = UpsellRequest {
            flight_offer: offer,
        };
        let response: UpsellResponse = self
            .send(self.http.post(url).json(&body))
            .await?
            .json()
            .await?;

        if !response.success {
            return Err(FetchError::Unsuccessful);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_resolve_under_the_base_path() {
        let client = HttpFareServiceClient::new("https://fares.example.com/api").expect("client");
        assert_eq!(
            client.fare_rules_url("offer 1").expect("url").as_str(),
            "https://fares.example.com/api/fare-rules?flightOfferId=offer+1"
        );
        assert_eq!(
            client.upsell_url().expect("url").as_str(),
            "https://fares.example.com/api/flights/upselling"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(matches!(
            HttpFareServiceClient::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
