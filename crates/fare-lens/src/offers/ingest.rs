use super::domain::{
    Amenity, Cabin, CheckedBags, Endpoint, Fee, FareDetails, Itinerary, NormalizedOffer,
    OfferEnrichment, ParseWarning, Price, Segment, TravelerPricing,
};
use super::duration;
use super::raw::{
    Field, RawEndpoint, RawFareDetails, RawItinerary, RawOffer, RawPrice, RawSegment,
    RawTravelerPricing,
};
use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::str::FromStr;
use tracing::warn;

/// Offer that cannot be rendered at all. Callers show an "invalid offer" card.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("offer has no itineraries")]
    MissingItineraries,
    #[error("itinerary {index} has no segments")]
    EmptyItinerary { index: usize },
    #[error("offer must be a JSON object")]
    NotAnObject,
    #[error("offer document is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a provider offer, defaulting every absent or wrongly shaped field
/// except the itinerary list.
pub fn parse(raw: &Value) -> Result<NormalizedOffer, IngestError> {
    if !raw.is_object() {
        return Err(IngestError::NotAnObject);
    }

    match raw.get("itineraries") {
        Some(Value::Array(items)) if !items.is_empty() => {}
        _ => return Err(IngestError::MissingItineraries),
    }

    let offer = RawOffer::deserialize(raw)?;
    normalize(offer)
}

pub fn parse_str(raw: &str) -> Result<NormalizedOffer, IngestError> {
    let value: Value = serde_json::from_str(raw)?;
    parse(&value)
}

pub fn parse_reader<R: Read>(reader: R) -> Result<NormalizedOffer, IngestError> {
    let value: Value = serde_json::from_reader(reader)?;
    parse(&value)
}

fn normalize(offer: RawOffer) -> Result<NormalizedOffer, IngestError> {
    let mut warnings = Vec::new();

    let itineraries = offer
        .itineraries
        .into_iter()
        .enumerate()
        .map(|(index, itinerary)| {
            let itinerary = take(itinerary, || format!("itineraries[{index}]"), &mut warnings)
                .unwrap_or_default();
            itinerary_from_raw(index, itinerary, &mut warnings)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let price = take(offer.price, || "price".to_string(), &mut warnings).unwrap_or_default();
    let price = price_from_raw(price, &mut warnings);
    let traveler_pricings: Vec<TravelerPricing> =
        take(offer.traveler_pricings, || "travelerPricings".to_string(), &mut warnings)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, pricing)| traveler_pricing_from_raw(index, pricing, &mut warnings))
            .collect();
    let validating_airline_codes = take(
        offer.validating_airline_codes,
        || "validatingAirlineCodes".to_string(),
        &mut warnings,
    )
    .unwrap_or_default();

    let fare_details = traveler_pricings
        .first()
        .map(|pricing| pricing.fare_details_by_segment.len())
        .unwrap_or(0);
    if fare_details < itineraries.len() {
        warnings.push(ParseWarning::FareDetailsShortfall {
            itineraries: itineraries.len(),
            fare_details,
        });
    }

    for warning in &warnings {
        warn!(offer_id = offer.id.as_deref().unwrap_or("-"), %warning, "offer data defaulted");
    }

    Ok(NormalizedOffer {
        id: offer.id,
        itineraries,
        price,
        traveler_pricings,
        validating_airline_codes,
        enrichment: OfferEnrichment {
            deal_score: offer.deal_score,
            co2_emissions: offer.co2_emissions,
            viewing_count: offer.viewing_count,
        },
        warnings,
    })
}

fn itinerary_from_raw(
    index: usize,
    itinerary: RawItinerary,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Itinerary, IngestError> {
    let segments = take(
        itinerary.segments,
        || format!("itineraries[{index}].segments"),
        warnings,
    )
    .unwrap_or_default();
    if segments.is_empty() {
        return Err(IngestError::EmptyItinerary { index });
    }

    let duration = match itinerary.duration {
        Field::Present(token) => token,
        Field::Absent => String::new(),
        Field::Malformed(value) => value.to_string(),
    };
    if duration::try_parse(&duration).is_none() {
        warnings.push(ParseWarning::MalformedDuration {
            itinerary: index,
            token: duration.clone(),
        });
    }

    let segments = segments
        .into_iter()
        .enumerate()
        .map(|(segment_index, segment)| segment_from_raw(index, segment_index, segment, warnings))
        .collect();

    Ok(Itinerary { duration, segments })
}

fn segment_from_raw(
    itinerary: usize,
    segment: usize,
    raw: RawSegment,
    warnings: &mut Vec<ParseWarning>,
) -> Segment {
    let path = |field: &str| format!("itineraries[{itinerary}].segments[{segment}].{field}");
    let departure = take(raw.departure, || path("departure"), warnings).unwrap_or_default();
    let arrival = take(raw.arrival, || path("arrival"), warnings).unwrap_or_default();
    let aircraft = take(raw.aircraft, || path("aircraft"), warnings);

    Segment {
        departure: endpoint_from_raw(itinerary, segment, departure, warnings),
        arrival: endpoint_from_raw(itinerary, segment, arrival, warnings),
        carrier_code: raw.carrier_code.unwrap_or_default(),
        number: raw.number.unwrap_or_default(),
        aircraft_code: aircraft.and_then(|aircraft| aircraft.code),
    }
}

fn endpoint_from_raw(
    itinerary: usize,
    segment: usize,
    raw: RawEndpoint,
    warnings: &mut Vec<ParseWarning>,
) -> Endpoint {
    let at = raw.at.and_then(|value| {
        let parsed = parse_timestamp(&value);
        if parsed.is_none() {
            warnings.push(ParseWarning::MalformedTimestamp {
                itinerary,
                segment,
                value,
            });
        }
        parsed
    });

    Endpoint {
        iata_code: raw
            .iata_code
            .map(|code| code.trim().to_ascii_uppercase())
            .unwrap_or_default(),
        terminal: raw.terminal,
        at,
    }
}

/// Provider timestamps are airport-local without offset; RFC 3339 values keep
/// their local wall-clock time.
fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    None
}

fn price_from_raw(raw: RawPrice, warnings: &mut Vec<ParseWarning>) -> Price {
    let total = parse_amount("price.total", raw.total.as_ref(), warnings).unwrap_or(Decimal::ZERO);
    let base = parse_amount("price.base", raw.base.as_ref(), warnings);

    let fees = take(raw.fees, || "price.fees".to_string(), warnings)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(idx, fee)| {
            let field = format!("price.fees[{idx}].amount");
            parse_amount(&field, fee.amount.as_ref(), warnings).map(|amount| Fee {
                amount,
                kind: fee.kind,
            })
        })
        .collect();

    Price {
        total,
        base,
        currency: raw.currency.unwrap_or_default(),
        fees,
    }
}

fn parse_amount(
    field: &str,
    value: Option<&Value>,
    warnings: &mut Vec<ParseWarning>,
) -> Option<Decimal> {
    let parsed = match value? {
        Value::Null => return None,
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => decimal_from_text(text.trim()),
        Value::Number(number) => decimal_from_text(&number.to_string()),
        _ => None,
    };

    if parsed.is_none() {
        warnings.push(ParseWarning::MalformedAmount {
            field: field.to_string(),
            value: value.map(Value::to_string).unwrap_or_default(),
        });
    }
    parsed
}

fn decimal_from_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Unwraps a structured field, recording a wrong JSON shape as a warning.
fn take<T>(
    field: Field<T>,
    path: impl FnOnce() -> String,
    warnings: &mut Vec<ParseWarning>,
) -> Option<T> {
    match field {
        Field::Absent => None,
        Field::Present(value) => Some(value),
        Field::Malformed(value) => {
            warnings.push(ParseWarning::MalformedField {
                field: path(),
                value: value.to_string(),
            });
            None
        }
    }
}

fn traveler_pricing_from_raw(
    traveler: usize,
    raw: RawTravelerPricing,
    warnings: &mut Vec<ParseWarning>,
) -> TravelerPricing {
    let fare_details = take(
        raw.fare_details_by_segment,
        || format!("travelerPricings[{traveler}].fareDetailsBySegment"),
        warnings,
    )
    .unwrap_or_default();

    TravelerPricing {
        traveler_id: raw.traveler_id,
        fare_details_by_segment: fare_details
            .into_iter()
            .enumerate()
            .map(|(index, details)| fare_details_from_raw(traveler, index, details, warnings))
            .collect(),
    }
}

fn fare_details_from_raw(
    traveler: usize,
    itinerary: usize,
    raw: RawFareDetails,
    warnings: &mut Vec<ParseWarning>,
) -> FareDetails {
    let path =
        |field: &str| format!("travelerPricings[{traveler}].fareDetailsBySegment[{itinerary}].{field}");

    let cabin = take(raw.cabin, || path("cabin"), warnings);
    let cabin = match cabin.as_deref() {
        None => Cabin::Economy,
        Some(value) => Cabin::parse(value).unwrap_or_else(|| {
            warnings.push(ParseWarning::UnknownCabin {
                itinerary,
                value: value.to_string(),
            });
            Cabin::Economy
        }),
    };

    let fare_code = [
        take(raw.fare_option, || path("fareOption"), warnings),
        take(raw.branded_fare, || path("brandedFare"), warnings),
        take(raw.fare_basis, || path("fareBasis"), warnings),
    ]
    .into_iter()
    .flatten()
    .map(|code| code.trim().to_string())
    .find(|code| !code.is_empty());

    let checked_bags = take(raw.included_checked_bags, || path("includedCheckedBags"), warnings);
    let cabin_bags = take(raw.included_cabin_bags, || path("includedCabinBags"), warnings);
    let amenities = take(raw.amenities, || path("amenities"), warnings).unwrap_or_default();

    FareDetails {
        cabin,
        fare_code,
        included_checked_bags: checked_bags.map(|bags| CheckedBags {
            quantity: bags.quantity,
            weight: bags.weight,
            weight_unit: bags.weight_unit,
        }),
        included_cabin_bags: cabin_bags.and_then(|bags| bags.quantity),
        amenities: amenities
            .into_iter()
            .map(|amenity| Amenity {
                description: amenity.description.unwrap_or_default(),
                amenity_type: amenity.amenity_type,
                is_chargeable: amenity.is_chargeable,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "itineraries": [{
                "duration": "PT2H10M",
                "segments": [{
                    "departure": {"iataCode": "lax", "at": "2025-11-02T08:00:00"},
                    "arrival": {"iataCode": "LAS", "at": "2025-11-02T09:10:00"},
                    "carrierCode": "AA",
                    "number": 1234
                }]
            }],
            "price": {"total": "120.50", "currency": "USD"}
        })
    }

    #[test]
    fn missing_or_empty_itineraries_are_rejected() {
        for raw in [
            json!({"price": {"total": "10"}}),
            json!({"itineraries": []}),
            json!({"itineraries": "soon"}),
            json!({"itineraries": null}),
        ] {
            assert!(matches!(parse(&raw), Err(IngestError::MissingItineraries)));
        }
    }

    #[test]
    fn non_objects_are_rejected() {
        assert!(matches!(parse(&json!([1, 2])), Err(IngestError::NotAnObject)));
    }

    #[test]
    fn itinerary_without_segments_is_rejected() {
        let raw = json!({"itineraries": [{"duration": "PT1H", "segments": []}]});
        assert!(matches!(
            parse(&raw),
            Err(IngestError::EmptyItinerary { index: 0 })
        ));
    }

    #[test]
    fn absent_fields_get_typed_defaults() {
        let offer = parse(&minimal()).expect("minimal offer parses");
        assert!(offer.validating_airline_codes.is_empty());
        assert!(offer.traveler_pricings.is_empty());
        assert_eq!(offer.price.total, Decimal::new(12_050, 2));
        assert!(offer.price.base.is_none());
        assert!(offer.price.fees.is_empty());

        let segment = &offer.itineraries[0].segments[0];
        assert_eq!(segment.departure.iata_code, "LAX");
        assert_eq!(segment.number, "1234");
        assert!(segment.aircraft_code.is_none());
        assert!(segment.departure.at.is_some());
    }

    #[test]
    fn shortfall_of_fare_details_is_a_warning() {
        let offer = parse(&minimal()).expect("parses");
        assert!(offer.warnings.contains(&ParseWarning::FareDetailsShortfall {
            itineraries: 1,
            fare_details: 0,
        }));
    }

    #[test]
    fn malformed_fields_become_warnings() {
        let mut raw = minimal();
        raw["itineraries"][0]["duration"] = json!("two hours");
        raw["itineraries"][0]["segments"][0]["arrival"]["at"] = json!("tomorrow");
        raw["price"]["base"] = json!("n/a");

        let offer = parse(&raw).expect("still parses");
        assert!(offer.price.base.is_none());
        assert!(offer
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::MalformedDuration { itinerary: 0, .. })));
        assert!(offer
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::MalformedTimestamp { segment: 0, .. })));
        assert!(offer
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::MalformedAmount { field, .. } if field == "price.base")));
    }

    #[test]
    fn wrongly_typed_fields_are_defaulted_not_fatal() {
        let mut raw = minimal();
        raw["price"] = json!("300");
        raw["validatingAirlineCodes"] = json!("AA");
        raw["travelerPricings"] = json!("n/a");
        raw["itineraries"][0]["segments"][0]["aircraft"] = json!(320);

        let offer = parse(&raw).expect("shape problems are recoverable");
        assert_eq!(offer.price.total, Decimal::ZERO);
        assert!(offer.validating_airline_codes.is_empty());
        assert!(offer.traveler_pricings.is_empty());
        assert!(offer.itineraries[0].segments[0].aircraft_code.is_none());

        let malformed: Vec<&str> = offer
            .warnings
            .iter()
            .filter_map(|w| match w {
                ParseWarning::MalformedField { field, .. } => Some(field.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            malformed,
            vec![
                "itineraries[0].segments[0].aircraft",
                "price",
                "travelerPricings",
                "validatingAirlineCodes",
            ]
        );
    }

    #[test]
    fn wrongly_typed_fare_detail_fields_fall_back() {
        let mut raw = minimal();
        raw["travelerPricings"] = json!([{
            "fareDetailsBySegment": [{
                "cabin": {"code": "Y"},
                "fareOption": ["FLEX"],
                "fareBasis": "YFLEX",
                "includedCheckedBags": 2,
                "includedCabinBags": "one",
                "amenities": "wifi"
            }]
        }]);
        raw["price"]["fees"] = json!({"amount": "10"});

        let offer = parse(&raw).expect("parses");
        let details = &offer.fare_details()[0];
        assert_eq!(details.cabin, Cabin::Economy);
        assert_eq!(details.fare_code.as_deref(), Some("YFLEX"));
        assert!(details.included_checked_bags.is_none());
        assert!(details.included_cabin_bags.is_none());
        assert!(details.amenities.is_empty());
        assert!(offer.price.fees.is_empty());

        let count = offer
            .warnings
            .iter()
            .filter(|w| matches!(w, ParseWarning::MalformedField { .. }))
            .count();
        assert_eq!(count, 6);
    }

    #[test]
    fn non_object_itinerary_counts_as_empty() {
        let raw = json!({"itineraries": ["LAX-LAS"]});
        assert!(matches!(
            parse(&raw),
            Err(IngestError::EmptyItinerary { index: 0 })
        ));
    }

    #[test]
    fn numeric_duration_is_reported_as_malformed() {
        let mut raw = minimal();
        raw["itineraries"][0]["duration"] = json!(130);

        let offer = parse(&raw).expect("parses");
        assert!(offer.warnings.contains(&ParseWarning::MalformedDuration {
            itinerary: 0,
            token: "130".to_string(),
        }));
    }

    #[test]
    fn fare_code_prefers_fare_option_then_branded_fare() {
        let mut raw = minimal();
        raw["travelerPricings"] = json!([{
            "travelerId": 1,
            "fareDetailsBySegment": [
                {"cabin": "ECONOMY", "brandedFare": "LIGHT", "fareBasis": "QNN7"},
                {"cabin": "lounge", "fareOption": "", "fareBasis": "YFLEX"}
            ]
        }]);

        let offer = parse(&raw).expect("parses");
        let details = offer.fare_details();
        assert_eq!(details[0].fare_code.as_deref(), Some("LIGHT"));
        assert_eq!(details[1].fare_code.as_deref(), Some("YFLEX"));
        assert_eq!(details[1].cabin, Cabin::Economy);
        assert!(offer
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::UnknownCabin { itinerary: 1, .. })));
        assert_eq!(offer.traveler_pricings[0].traveler_id.as_deref(), Some("1"));
    }

    #[test]
    fn parse_str_surfaces_json_errors() {
        assert!(matches!(parse_str("{not json"), Err(IngestError::Json(_))));
    }

    #[test]
    fn timestamps_accept_minutes_and_offsets() {
        assert!(parse_timestamp("2025-11-02T08:00").is_some());
        let with_offset = parse_timestamp("2025-11-02T08:00:00-05:00").expect("rfc3339");
        assert_eq!(with_offset.format("%H:%M").to_string(), "08:00");
        assert!(parse_timestamp("").is_none());
    }
}
