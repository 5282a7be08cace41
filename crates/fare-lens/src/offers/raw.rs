//! Provider-shaped records. Every field is optional or defaulted because
//! aggregators omit, null out, or retype fields freely; the ingest step turns
//! these into the typed domain model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Structured field that may be absent, well-formed, or of the wrong JSON
/// shape. A wrong shape keeps the raw value so ingest can report it.
#[derive(Debug)]
pub(crate) enum Field<T> {
    Absent,
    Present(T),
    Malformed(Value),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(Field::Absent);
        }

        Ok(match T::deserialize(&value) {
            Ok(parsed) => Field::Present(parsed),
            Err(_) => Field::Malformed(value),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOffer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) itineraries: Vec<Field<RawItinerary>>,
    #[serde(default)]
    pub(crate) price: Field<RawPrice>,
    #[serde(default)]
    pub(crate) traveler_pricings: Field<Vec<RawTravelerPricing>>,
    #[serde(default)]
    pub(crate) validating_airline_codes: Field<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub(crate) deal_score: Option<f64>,
    #[serde(default)]
    pub(crate) co2_emissions: Option<Value>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub(crate) viewing_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawItinerary {
    #[serde(default)]
    pub(crate) duration: Field<String>,
    #[serde(default)]
    pub(crate) segments: Field<Vec<RawSegment>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSegment {
    #[serde(default)]
    pub(crate) departure: Field<RawEndpoint>,
    #[serde(default)]
    pub(crate) arrival: Field<RawEndpoint>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) carrier_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) number: Option<String>,
    #[serde(default)]
    pub(crate) aircraft: Field<RawAircraft>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawEndpoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) iata_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) terminal: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAircraft {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawPrice {
    #[serde(default)]
    pub(crate) total: Option<Value>,
    #[serde(default)]
    pub(crate) base: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) currency: Option<String>,
    #[serde(default)]
    pub(crate) fees: Field<Vec<RawFee>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawFee {
    #[serde(default)]
    pub(crate) amount: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub(crate) kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTravelerPricing {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) traveler_id: Option<String>,
    #[serde(default)]
    pub(crate) fare_details_by_segment: Field<Vec<RawFareDetails>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFareDetails {
    #[serde(default)]
    pub(crate) cabin: Field<String>,
    #[serde(default)]
    pub(crate) fare_option: Field<String>,
    #[serde(default)]
    pub(crate) branded_fare: Field<String>,
    #[serde(default)]
    pub(crate) fare_basis: Field<String>,
    #[serde(default)]
    pub(crate) included_checked_bags: Field<RawCheckedBags>,
    #[serde(default)]
    pub(crate) included_cabin_bags: Field<RawCabinBags>,
    #[serde(default)]
    pub(crate) amenities: Field<Vec<RawAmenity>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCheckedBags {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub(crate) quantity: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub(crate) weight: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) weight_unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCabinBags {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub(crate) quantity: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAmenity {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) amenity_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub(crate) is_chargeable: bool,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text).filter(|text| !text.trim().is_empty()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}
