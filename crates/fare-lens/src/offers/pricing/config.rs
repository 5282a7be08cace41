use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Business guesses used where the offer itself is silent. None of these are
/// derived from fare rules; override them per deployment through `AppConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingHeuristics {
    /// Share of the total attributed to taxes and fees when no base is quoted.
    pub fallback_fee_share: Decimal,
    pub domestic_bag_fee: Decimal,
    pub international_bag_fee: Decimal,
    /// Seat selection a basic-economy traveler usually ends up paying for.
    pub basic_economy_seat_fee: Decimal,
}

impl Default for PricingHeuristics {
    fn default() -> Self {
        Self {
            fallback_fee_share: Decimal::new(15, 2),
            domestic_bag_fee: Decimal::from(35),
            international_bag_fee: Decimal::from(60),
            basic_economy_seat_fee: Decimal::from(30),
        }
    }
}
