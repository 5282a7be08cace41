use serde_json::{json, Value};

use crate::offers::view::{OfferEngine, OfferViewModel};

pub(super) fn segment(from: &str, to: &str, departs: &str, arrives: &str, aircraft: &str) -> Value {
    json!({
        "departure": {"iataCode": from, "at": departs},
        "arrival": {"iataCode": to, "at": arrives},
        "carrierCode": "XA",
        "number": "101",
        "aircraft": {"code": aircraft}
    })
}

pub(super) fn itinerary(duration: &str, segments: Vec<Value>) -> Value {
    json!({ "duration": duration, "segments": segments })
}

pub(super) fn fare_details(cabin: &str, fare_option: &str, checked_bags: u32) -> Value {
    json!({
        "cabin": cabin,
        "fareOption": fare_option,
        "includedCheckedBags": {"quantity": checked_bags},
        "includedCabinBags": {"quantity": 1}
    })
}

pub(super) fn offer(itineraries: Vec<Value>, total: &str, fare_details: Vec<Value>) -> Value {
    json!({
        "id": "offer-1",
        "itineraries": itineraries,
        "price": {"total": total, "currency": "USD"},
        "travelerPricings": [{
            "travelerId": "1",
            "fareDetailsBySegment": fare_details
        }],
        "validatingAirlineCodes": ["XA"]
    })
}

/// One-leg economy offer, no checked bag. LAX and LAS share the two-letter
/// prefix the international check compares.
pub(super) fn domestic_offer(fare_option: &str) -> Value {
    offer(
        vec![itinerary(
            "PT1H30M",
            vec![segment(
                "LAX",
                "LAS",
                "2025-11-02T08:00:00",
                "2025-11-02T09:30:00",
                "320",
            )],
        )],
        "300.00",
        vec![fare_details("ECONOMY", fare_option, 0)],
    )
}

/// JFK to GRU, which the two-letter prefix heuristic reads as international.
pub(super) fn international_offer(fare_option: &str) -> Value {
    offer(
        vec![itinerary(
            "PT10H5M",
            vec![segment(
                "JFK",
                "GRU",
                "2025-11-02T21:00:00",
                "2025-11-03T09:05:00",
                "77W",
            )],
        )],
        "850.00",
        vec![fare_details("ECONOMY", fare_option, 0)],
    )
}

pub(super) fn round_trip(outbound_fare: &str, return_fare: &str) -> Value {
    offer(
        vec![
            itinerary(
                "PT5H20M",
                vec![segment(
                    "BOS",
                    "SEA",
                    "2025-11-02T07:00:00",
                    "2025-11-02T10:20:00",
                    "73H",
                )],
            ),
            itinerary(
                "PT5H5M",
                vec![segment(
                    "SEA",
                    "BOS",
                    "2025-11-09T12:00:00",
                    "2025-11-09T20:05:00",
                    "73H",
                )],
            ),
        ],
        "540.00",
        vec![
            fare_details("ECONOMY", outbound_fare, 1),
            fare_details("ECONOMY", return_fare, 1),
        ],
    )
}

pub(super) fn compute(raw: &Value) -> OfferViewModel {
    OfferEngine::default()
        .compute(raw)
        .expect("fixture offers are valid")
}
