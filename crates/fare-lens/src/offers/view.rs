use super::baggage::{self, BaggagePolicy, PolicySource};
use super::consistency::{self, ConsistencyReport};
use super::domain::{Itinerary, NormalizedOffer, OfferEnrichment, ParseWarning};
use super::duration::{self, DurationParts};
use super::fare_family::FareFamily;
use super::ingest::{self, IngestError};
use super::pricing::{PriceBreakdown, PriceDecomposer, PricingHeuristics};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Connection between two consecutive segments of a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layover {
    pub airport: String,
    /// `None` when either side's local timestamp was unreadable.
    pub minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegView {
    pub origin: String,
    pub destination: String,
    pub departure_at: Option<NaiveDateTime>,
    pub arrival_at: Option<NaiveDateTime>,
    pub duration: DurationParts,
    pub duration_label: String,
    pub stops: usize,
    pub carriers: Vec<String>,
    pub flights: Vec<String>,
    pub layovers: Vec<Layover>,
    pub baggage: BaggagePolicy,
}

/// Everything a flight card needs, derived fresh from one offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferViewModel {
    pub id: Option<String>,
    pub currency: String,
    pub legs: Vec<LegView>,
    pub price: PriceBreakdown,
    pub fare_family: FareFamily,
    pub is_basic_economy: bool,
    pub consistency: ConsistencyReport,
    pub validating_airline: Option<String>,
    #[serde(flatten)]
    pub enrichment: OfferEnrichment,
    pub warnings: Vec<ParseWarning>,
}

/// Composes ingest, baggage, amenities, pricing and consistency into a view.
#[derive(Debug, Clone, Default)]
pub struct OfferEngine {
    decomposer: PriceDecomposer,
}

impl OfferEngine {
    pub fn new(heuristics: PricingHeuristics) -> Self {
        Self {
            decomposer: PriceDecomposer::new(heuristics),
        }
    }

    pub fn heuristics(&self) -> &PricingHeuristics {
        self.decomposer.heuristics()
    }

    pub fn compute(&self, raw: &Value) -> Result<OfferViewModel, IngestError> {
        let offer = ingest::parse(raw)?;
        Ok(self.view(&offer))
    }

    pub fn view(&self, offer: &NormalizedOffer) -> OfferViewModel {
        let policies = baggage::resolve_all(offer);

        let mut warnings = offer.warnings.clone();
        warnings.extend(
            policies
                .iter()
                .enumerate()
                .filter(|(_, policy)| policy.source == PolicySource::SafeDefault)
                .map(|(itinerary, _)| ParseWarning::MissingFareDetails { itinerary }),
        );

        let headline = policies
            .first()
            .cloned()
            .unwrap_or_else(BaggagePolicy::safe_default);
        let price = self
            .decomposer
            .decompose(&offer.price, &offer.itineraries, &headline);
        let consistency = consistency::check(&policies);

        let legs = offer
            .itineraries
            .iter()
            .zip(policies)
            .map(|(itinerary, policy)| leg_view(itinerary, policy))
            .collect();

        OfferViewModel {
            id: offer.id.clone(),
            currency: offer.price.currency.clone(),
            legs,
            price,
            is_basic_economy: headline.is_basic_economy(),
            fare_family: headline.fare_family,
            consistency,
            validating_airline: offer.validating_airline_codes.first().cloned(),
            enrichment: offer.enrichment.clone(),
            warnings,
        }
    }
}

fn leg_view(itinerary: &Itinerary, baggage: BaggagePolicy) -> LegView {
    let first = itinerary.first_segment();
    let last = itinerary.last_segment();
    let duration = duration::parse_duration(&itinerary.duration);

    let mut carriers: Vec<String> = Vec::new();
    for segment in &itinerary.segments {
        if !segment.carrier_code.is_empty() && !carriers.contains(&segment.carrier_code) {
            carriers.push(segment.carrier_code.clone());
        }
    }

    LegView {
        origin: first
            .map(|segment| segment.departure.iata_code.clone())
            .unwrap_or_default(),
        destination: last
            .map(|segment| segment.arrival.iata_code.clone())
            .unwrap_or_default(),
        departure_at: first.and_then(|segment| segment.departure.at),
        arrival_at: last.and_then(|segment| segment.arrival.at),
        duration_label: duration.label(),
        duration,
        stops: itinerary.stops(),
        carriers,
        flights: itinerary
            .segments
            .iter()
            .map(|segment| segment.flight_designator())
            .collect(),
        layovers: layovers(itinerary),
        baggage,
    }
}

fn layovers(itinerary: &Itinerary) -> Vec<Layover> {
    itinerary
        .segments
        .windows(2)
        .map(|pair| {
            let (inbound, outbound) = (&pair[0], &pair[1]);
            // Both timestamps are local to the connecting airport.
            let minutes = match (inbound.arrival.at, outbound.departure.at) {
                (Some(arrived), Some(departs)) => {
                    u32::try_from((departs - arrived).num_minutes()).ok()
                }
                _ => None,
            };
            Layover {
                airport: inbound.arrival.iata_code.clone(),
                minutes,
            }
        })
        .collect()
}
