use super::baggage::BaggagePolicy;
use serde::Serialize;

/// Fields compared across legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyField {
    CheckedQuantity,
    FareFamily,
    Wifi,
    CarryOn,
}

impl ConsistencyField {
    const ALL: [ConsistencyField; 4] = [
        ConsistencyField::CheckedQuantity,
        ConsistencyField::FareFamily,
        ConsistencyField::Wifi,
        ConsistencyField::CarryOn,
    ];

    fn differs(self, baseline: &BaggagePolicy, leg: &BaggagePolicy) -> bool {
        match self {
            ConsistencyField::CheckedQuantity => leg.checked_quantity != baseline.checked_quantity,
            ConsistencyField::FareFamily => leg.fare_family != baseline.fare_family,
            ConsistencyField::Wifi => leg.amenities.wifi != baseline.amenities.wifi,
            ConsistencyField::CarryOn => leg.carry_on != baseline.carry_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyReport {
    pub differs: bool,
    pub per_leg: Vec<BaggagePolicy>,
}

impl ConsistencyReport {
    /// Fields on which at least one later leg departs from leg 0.
    pub fn divergent_fields(&self) -> Vec<ConsistencyField> {
        let Some((baseline, rest)) = self.per_leg.split_first() else {
            return Vec::new();
        };

        ConsistencyField::ALL
            .into_iter()
            .filter(|field| rest.iter().any(|leg| field.differs(baseline, leg)))
            .collect()
    }
}

fn differs_from(baseline: &BaggagePolicy, leg: &BaggagePolicy) -> bool {
    ConsistencyField::ALL
        .into_iter()
        .any(|field| field.differs(baseline, leg))
}

/// Flags an offer whose later legs disagree with the first one. Legs are only
/// compared against leg 0, never pairwise.
pub fn check(policies: &[BaggagePolicy]) -> ConsistencyReport {
    let differs = match policies.split_first() {
        Some((baseline, rest)) => rest.iter().any(|leg| differs_from(baseline, leg)),
        None => false,
    };

    ConsistencyReport {
        differs,
        per_leg: policies.to_vec(),
    }
}
