mod config;
mod rules;

pub use config::PricingHeuristics;
pub use rules::SplitRule;

use super::baggage::BaggagePolicy;
use super::domain::{Itinerary, Price};
use rust_decimal::Decimal;
use serde::Serialize;

/// Price decomposition shown next to an offer. Recomputed on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub currency: String,
    pub total: Decimal,
    pub base_price: Decimal,
    pub fees: Decimal,
    pub fees_percentage: u32,
    pub estimated_baggage_fee: Decimal,
    pub estimated_seat_fee: Decimal,
    /// Total plus the add-ons most travelers end up buying.
    pub true_price: Decimal,
    pub rule: SplitRule,
    pub is_international: bool,
}

/// Stateless decomposer applying the configured heuristics.
#[derive(Debug, Clone, Default)]
pub struct PriceDecomposer {
    heuristics: PricingHeuristics,
}

impl PriceDecomposer {
    pub fn new(heuristics: PricingHeuristics) -> Self {
        Self { heuristics }
    }

    pub fn heuristics(&self) -> &PricingHeuristics {
        &self.heuristics
    }

    /// `baggage_policy` is the first leg's policy; it decides whether a
    /// checked bag still has to be bought.
    pub fn decompose(
        &self,
        price: &Price,
        itineraries: &[Itinerary],
        baggage_policy: &BaggagePolicy,
    ) -> PriceBreakdown {
        let split = rules::split_base_and_fees(price, &self.heuristics);
        let fees_percentage = rules::fees_percentage(split.fees, price.total);

        let is_international = itineraries
            .first()
            .map(is_international)
            .unwrap_or(false);

        let estimated_baggage_fee = if baggage_policy.checked_quantity > 0 {
            Decimal::ZERO
        } else if is_international {
            self.heuristics.international_bag_fee
        } else {
            self.heuristics.domestic_bag_fee
        };

        let estimated_seat_fee = if baggage_policy.is_basic_economy() {
            self.heuristics.basic_economy_seat_fee
        } else {
            Decimal::ZERO
        };

        PriceBreakdown {
            currency: price.currency.clone(),
            total: price.total,
            base_price: split.base,
            fees: split.fees,
            fees_percentage,
            estimated_baggage_fee,
            estimated_seat_fee,
            true_price: price.total + estimated_baggage_fee + estimated_seat_fee,
            rule: split.rule,
            is_international,
        }
    }
}

/// A leg counts as international when any of its segments connects airports
/// whose two-character code prefixes differ.
pub fn is_international(itinerary: &Itinerary) -> bool {
    itinerary.segments.iter().any(|segment| {
        !segment
            .departure
            .country_prefix()
            .eq_ignore_ascii_case(segment.arrival.country_prefix())
    })
}
