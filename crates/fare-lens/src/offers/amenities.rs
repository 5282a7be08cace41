use super::domain::{Amenity, Cabin};
use serde::Serialize;

/// Onboard catering level, ordered from nothing to a full multi-course service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MealService {
    None,
    Snack,
    Refreshments,
    SnackOrMeal,
    Meal,
    HotMeal,
    MultiCourseMeal,
}

impl MealService {
    /// Catering a cabin is assumed to get when the provider says nothing.
    pub fn cabin_minimum(cabin: Cabin) -> Self {
        match cabin {
            Cabin::First => MealService::MultiCourseMeal,
            Cabin::Business => MealService::HotMeal,
            Cabin::PremiumEconomy => MealService::Meal,
            Cabin::Economy => MealService::SnackOrMeal,
        }
    }

    fn is_light(self) -> bool {
        matches!(self, MealService::Snack | MealService::Refreshments)
    }
}

/// Amenities of one leg. `is_estimated` is set when nothing came from the
/// provider and the whole set was read off the aircraft/cabin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmenitySet {
    pub wifi: bool,
    pub power: bool,
    pub entertainment: bool,
    pub meal: MealService,
    pub is_estimated: bool,
}

impl AmenitySet {
    /// Nothing known, nothing promised.
    pub fn unknown() -> Self {
        Self {
            wifi: false,
            power: false,
            entertainment: false,
            meal: MealService::None,
            is_estimated: true,
        }
    }
}

/// Equipment buckets used by the estimate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AircraftClass {
    Widebody,
    ModernNarrowbody,
    Narrowbody,
    Regional,
    Unknown,
}

// IATA equipment code prefixes, checked in order.
const AIRCRAFT_PREFIXES: &[(&str, AircraftClass)] = &[
    ("74", AircraftClass::Widebody),
    ("76", AircraftClass::Widebody),
    ("77", AircraftClass::Widebody),
    ("78", AircraftClass::Widebody),
    ("33", AircraftClass::Widebody),
    ("34", AircraftClass::Widebody),
    ("35", AircraftClass::Widebody),
    ("38", AircraftClass::Widebody),
    ("32N", AircraftClass::ModernNarrowbody),
    ("32Q", AircraftClass::ModernNarrowbody),
    ("31N", AircraftClass::ModernNarrowbody),
    ("7M", AircraftClass::ModernNarrowbody),
    ("22", AircraftClass::ModernNarrowbody),
    ("32", AircraftClass::Narrowbody),
    ("31", AircraftClass::Narrowbody),
    ("73", AircraftClass::Narrowbody),
    ("75", AircraftClass::Narrowbody),
    ("E7", AircraftClass::Regional),
    ("E9", AircraftClass::Regional),
    ("CR", AircraftClass::Regional),
    ("DH", AircraftClass::Regional),
    ("AT", AircraftClass::Regional),
];

pub(crate) fn classify_aircraft(code: Option<&str>) -> AircraftClass {
    let code = match code.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_ascii_uppercase(),
        _ => return AircraftClass::Unknown,
    };

    AIRCRAFT_PREFIXES
        .iter()
        .find(|(prefix, _)| code.starts_with(prefix))
        .map(|(_, class)| *class)
        .unwrap_or(AircraftClass::Unknown)
}

/// Aircraft/cabin estimate, used wholesale when the provider sent nothing and
/// as a gap filler for premium cabins otherwise.
pub(crate) fn estimate_from_equipment(aircraft_code: Option<&str>, cabin: Cabin) -> AmenitySet {
    let class = classify_aircraft(aircraft_code);
    let premium = cabin.is_premium();

    let (wifi, power, entertainment) = match class {
        AircraftClass::Widebody => (true, true, true),
        AircraftClass::ModernNarrowbody => (true, true, premium),
        AircraftClass::Narrowbody => (premium, premium, premium),
        AircraftClass::Regional => (false, premium, false),
        AircraftClass::Unknown => (premium, premium, premium),
    };

    AmenitySet {
        wifi,
        power,
        entertainment,
        meal: MealService::cabin_minimum(cabin),
        is_estimated: true,
    }
}

const WIFI_KEYWORDS: &[&str] = &["wifi", "wi-fi", "internet"];
const POWER_KEYWORDS: &[&str] = &["power", "outlet", "usb"];

fn mentions(amenity: &Amenity, keywords: &[&str]) -> bool {
    let description = amenity.description.to_ascii_lowercase();
    keywords.iter().any(|keyword| description.contains(keyword))
}

fn has_type(amenity: &Amenity, amenity_type: &str) -> bool {
    amenity
        .amenity_type
        .as_deref()
        .map(|value| value.trim().eq_ignore_ascii_case(amenity_type))
        .unwrap_or(false)
}

/// Builds the amenity set for one leg from the provider's list, falling back
/// to the equipment table when the list is empty.
pub fn estimate(raw_amenities: &[Amenity], aircraft_code: Option<&str>, cabin: Cabin) -> AmenitySet {
    if raw_amenities.is_empty() {
        return estimate_from_equipment(aircraft_code, cabin);
    }

    let mut wifi = raw_amenities.iter().any(|a| mentions(a, WIFI_KEYWORDS));
    let mut power = raw_amenities.iter().any(|a| mentions(a, POWER_KEYWORDS));
    let mut entertainment = raw_amenities
        .iter()
        .any(|a| has_type(a, "ENTERTAINMENT"));

    if cabin.is_premium() {
        let fallback = estimate_from_equipment(aircraft_code, cabin);
        wifi |= fallback.wifi;
        power |= fallback.power;
        entertainment |= fallback.entertainment;
    }

    AmenitySet {
        wifi,
        power,
        entertainment,
        meal: resolve_meal(raw_amenities, cabin),
        is_estimated: false,
    }
}

// Ordered: the first keyword found in the description decides.
const MEAL_KEYWORDS: &[(&str, MealService)] = &[
    ("multi-course", MealService::MultiCourseMeal),
    ("gourmet", MealService::MultiCourseMeal),
    ("hot meal", MealService::HotMeal),
    ("meal", MealService::Meal),
    ("snack", MealService::Snack),
];

/// Reads the MEAL amenity and lifts light catering to the cabin floor for
/// business and first.
pub fn resolve_meal(amenities: &[Amenity], cabin: Cabin) -> MealService {
    let Some(meal) = amenities.iter().find(|a| has_type(a, "MEAL")) else {
        return MealService::cabin_minimum(cabin);
    };

    let description = meal.description.to_ascii_lowercase();
    let classified = MEAL_KEYWORDS
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|(_, service)| *service)
        .unwrap_or(MealService::Refreshments);

    if cabin.is_premium() && classified.is_light() {
        MealService::cabin_minimum(cabin)
    } else {
        classified
    }
}
