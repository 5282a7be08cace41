use super::amenities::{self, AmenitySet};
use super::domain::{Cabin, FareDetails, Itinerary, ItineraryIndex, NormalizedOffer};
use super::fare_family::{self, FareFamily};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_CHECKED_WEIGHT_KG: u32 = 23;
pub const STANDARD_CARRY_ON_KG: u32 = 10;
pub const PREMIUM_CARRY_ON_KG: u32 = 18;
const SAFE_DEFAULT_FARE_TYPE: &str = "STANDARD";

/// Where a policy's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySource {
    FareDetails,
    SafeDefault,
}

/// Resolved baggage entitlement and amenities of one itinerary leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaggagePolicy {
    pub carry_on: bool,
    pub carry_on_weight_kg: u32,
    pub carry_on_quantity: u32,
    pub checked_quantity: u32,
    pub checked_weight_kg: u32,
    pub fare_type: String,
    pub fare_family: FareFamily,
    pub cabin: Cabin,
    pub amenities: AmenitySet,
    pub source: PolicySource,
}

impl BaggagePolicy {
    /// Returned whenever a leg's fare details cannot be read.
    pub fn safe_default() -> Self {
        Self {
            carry_on: true,
            carry_on_weight_kg: STANDARD_CARRY_ON_KG,
            carry_on_quantity: 2,
            checked_quantity: 1,
            checked_weight_kg: DEFAULT_CHECKED_WEIGHT_KG,
            fare_type: SAFE_DEFAULT_FARE_TYPE.to_string(),
            fare_family: FareFamily::Standard,
            cabin: Cabin::Economy,
            amenities: AmenitySet::unknown(),
            source: PolicySource::SafeDefault,
        }
    }

    pub fn is_basic_economy(&self) -> bool {
        self.fare_family == FareFamily::BasicEconomy
    }
}

/// Reads the fare details of a single leg into a [`BaggagePolicy`].
///
/// `fare_details` is the per-itinerary array of one traveler; the entry at
/// `itinerary_index` belongs to `itinerary`.
pub fn resolve(
    fare_details: &[FareDetails],
    itinerary: &Itinerary,
    itinerary_index: ItineraryIndex,
) -> BaggagePolicy {
    let Some(details) = fare_details.get(itinerary_index.get()) else {
        warn!(
            itinerary = itinerary_index.get(),
            available = fare_details.len(),
            "fare details missing for itinerary, falling back to safe baggage default"
        );
        return BaggagePolicy::safe_default();
    };

    let cabin = details.cabin;
    let classification = fare_family::classify(details.fare_code.as_deref().unwrap_or(""), cabin);
    let fare_type = details
        .fare_code
        .clone()
        .unwrap_or_else(|| SAFE_DEFAULT_FARE_TYPE.to_string());

    let (checked_quantity, checked_weight_kg) = match &details.included_checked_bags {
        Some(bags) => (
            bags.quantity.unwrap_or(0),
            bags.weight
                .map(|weight| to_kilograms(weight, bags.weight_unit.as_deref()))
                .unwrap_or(DEFAULT_CHECKED_WEIGHT_KG),
        ),
        None => (0, DEFAULT_CHECKED_WEIGHT_KG),
    };

    let cabin_bag_quantity = details.included_cabin_bags.unwrap_or(0);
    let carry_on = cabin_bag_quantity >= 2 || !classification.is_basic_economy;
    let carry_on_quantity = match details.included_cabin_bags {
        Some(quantity) => quantity,
        None if carry_on => 2,
        None => 1,
    };
    let carry_on_weight_kg = if cabin.is_premium() {
        PREMIUM_CARRY_ON_KG
    } else {
        STANDARD_CARRY_ON_KG
    };

    let aircraft_code = itinerary
        .first_segment()
        .and_then(|segment| segment.aircraft_code.as_deref());
    let amenities = amenities::estimate(&details.amenities, aircraft_code, cabin);

    BaggagePolicy {
        carry_on,
        carry_on_weight_kg,
        carry_on_quantity,
        checked_quantity,
        checked_weight_kg,
        fare_type,
        fare_family: classification.fare_family,
        cabin,
        amenities,
        source: PolicySource::FareDetails,
    }
}

/// One policy per itinerary, in itinerary order.
pub fn resolve_all(offer: &NormalizedOffer) -> Vec<BaggagePolicy> {
    let fare_details = offer.fare_details();
    offer
        .itineraries
        .iter()
        .enumerate()
        .map(|(idx, itinerary)| resolve(fare_details, itinerary, ItineraryIndex(idx)))
        .collect()
}

fn to_kilograms(weight: u32, unit: Option<&str>) -> u32 {
    match unit.map(|unit| unit.trim().to_ascii_uppercase()) {
        Some(unit) if unit == "LB" || unit == "LBS" => {
            // 1 lb = 0.45359237 kg, rounded to the nearest kilogram
            ((u64::from(weight) * 45_359_237 + 50_000_000) / 100_000_000) as u32
        }
        _ => weight,
    }
}
