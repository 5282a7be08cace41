use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Refund and change conditions of an offer, as reported by the fare-rules service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRules {
    pub refundable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_fee: Option<f64>,
    #[serde(default)]
    pub refund_policy: String,
    pub changeable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_fee: Option<f64>,
    #[serde(default)]
    pub change_policy: String,
    #[serde(default)]
    pub cancellation_policy: String,
    #[serde(default)]
    pub restrictions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FareRulesEnvelope {
    pub(crate) data: Option<FareRules>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpsellRequest<'a> {
    pub(crate) flight_offer: &'a Value,
}

/// Alternative fares for an offer; each option is itself a raw offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub fare_options: Vec<Value>,
}
