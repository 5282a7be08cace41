use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Position of an itinerary (leg) inside an offer.
///
/// `fareDetailsBySegment` is indexed by itinerary, not by the flattened
/// segment list, so every lookup into fare details goes through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ItineraryIndex(pub usize);

impl ItineraryIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItineraryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leg {}", self.0 + 1)
    }
}

/// Service tier of a fare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cabin {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl Cabin {
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        match key.as_str() {
            "ECONOMY" | "COACH" => Some(Self::Economy),
            "PREMIUMECONOMY" => Some(Self::PremiumEconomy),
            "BUSINESS" => Some(Self::Business),
            "FIRST" => Some(Self::First),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cabin::Economy => "ECONOMY",
            Cabin::PremiumEconomy => "PREMIUM_ECONOMY",
            Cabin::Business => "BUSINESS",
            Cabin::First => "FIRST",
        }
    }

    /// Business and first, the cabins that get the larger carry-on allowance
    /// and the amenity gap filling.
    pub fn is_premium(self) -> bool {
        matches!(self, Cabin::Business | Cabin::First)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub iata_code: String,
    pub terminal: Option<String>,
    pub at: Option<NaiveDateTime>,
}

impl Endpoint {
    /// First two characters of the IATA code, used as a rough country key.
    pub fn country_prefix(&self) -> &str {
        let code = self.iata_code.as_str();
        match code.char_indices().nth(2) {
            Some((idx, _)) => &code[..idx],
            None => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub departure: Endpoint,
    pub arrival: Endpoint,
    pub carrier_code: String,
    pub number: String,
    pub aircraft_code: Option<String>,
}

impl Segment {
    pub fn flight_designator(&self) -> String {
        format!("{}{}", self.carrier_code, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    /// Raw ISO-8601 duration token as supplied by the provider.
    pub duration: String,
    pub segments: Vec<Segment>,
}

impl Itinerary {
    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&Segment> {
        self.segments.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fee {
    pub amount: Decimal,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Price {
    pub total: Decimal,
    pub base: Option<Decimal>,
    pub currency: String,
    pub fees: Vec<Fee>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amenity {
    pub description: String,
    pub amenity_type: Option<String>,
    pub is_chargeable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckedBags {
    pub quantity: Option<u32>,
    pub weight: Option<u32>,
    pub weight_unit: Option<String>,
}

/// Per-leg fare details of one traveler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareDetails {
    pub cabin: Cabin,
    /// First present of `fareOption`, `brandedFare`, `fareBasis`.
    pub fare_code: Option<String>,
    pub included_checked_bags: Option<CheckedBags>,
    pub included_cabin_bags: Option<u32>,
    pub amenities: Vec<Amenity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelerPricing {
    pub traveler_id: Option<String>,
    pub fare_details_by_segment: Vec<FareDetails>,
}

/// Fields computed by collaborators outside the engine, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OfferEnrichment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_emissions: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewing_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedOffer {
    pub id: Option<String>,
    pub itineraries: Vec<Itinerary>,
    pub price: Price,
    pub traveler_pricings: Vec<TravelerPricing>,
    pub validating_airline_codes: Vec<String>,
    pub enrichment: OfferEnrichment,
    pub warnings: Vec<ParseWarning>,
}

impl NormalizedOffer {
    /// Fare details of the first traveler; the engine reads entitlements from it.
    pub fn fare_details(&self) -> &[FareDetails] {
        self.traveler_pricings
            .first()
            .map(|pricing| pricing.fare_details_by_segment.as_slice())
            .unwrap_or(&[])
    }
}

/// Data-shape problem that was defaulted instead of failing the offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    MalformedDuration {
        itinerary: usize,
        token: String,
    },
    MalformedAmount {
        field: String,
        value: String,
    },
    MalformedField {
        field: String,
        value: String,
    },
    MalformedTimestamp {
        itinerary: usize,
        segment: usize,
        value: String,
    },
    UnknownCabin {
        itinerary: usize,
        value: String,
    },
    FareDetailsShortfall {
        itineraries: usize,
        fare_details: usize,
    },
    MissingFareDetails {
        itinerary: usize,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::MalformedDuration { itinerary, token } => {
                write!(f, "itinerary {itinerary} has unparseable duration '{token}'")
            }
            ParseWarning::MalformedAmount { field, value } => {
                write!(f, "{field} is not a decimal amount ('{value}')")
            }
            ParseWarning::MalformedField { field, value } => {
                write!(f, "{field} has an unexpected shape ({value}), using default")
            }
            ParseWarning::MalformedTimestamp {
                itinerary,
                segment,
                value,
            } => write!(
                f,
                "segment {segment} of itinerary {itinerary} has unparseable timestamp '{value}'"
            ),
            ParseWarning::UnknownCabin { itinerary, value } => {
                write!(f, "fare details {itinerary} carry unknown cabin '{value}'")
            }
            ParseWarning::FareDetailsShortfall {
                itineraries,
                fare_details,
            } => write!(
                f,
                "{fare_details} fare detail entries for {itineraries} itineraries"
            ),
            ParseWarning::MissingFareDetails { itinerary } => {
                write!(f, "no fare details for itinerary {itinerary}, using safe default")
            }
        }
    }
}
