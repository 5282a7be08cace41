use super::domain::Cabin;
use serde::{Serialize, Serializer};
use std::fmt;

/// Human-facing fare bucket derived from the provider's fare code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FareFamily {
    BasicEconomy,
    Standard,
    Flexible,
    Premium,
    /// Unrecognised code, title-cased for display.
    Other(String),
}

impl FareFamily {
    pub fn label(&self) -> &str {
        match self {
            FareFamily::BasicEconomy => "Basic Economy",
            FareFamily::Standard => "Standard",
            FareFamily::Flexible => "Flexible",
            FareFamily::Premium => "Premium",
            FareFamily::Other(label) => label,
        }
    }
}

impl fmt::Display for FareFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for FareFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FareClassification {
    pub fare_family: FareFamily,
    pub is_basic_economy: bool,
}

/// One row of the classification table: any keyword hit selects the family.
struct FareRule {
    keywords: &'static [&'static str],
    family: FareFamily,
    basic_economy: bool,
}

// Order matters: basic is checked first so that "BASIC_FLEX" stays restrictive.
const FARE_RULES: &[FareRule] = &[
    FareRule {
        keywords: &["BASIC", "LIGHT", "SAVER"],
        family: FareFamily::BasicEconomy,
        basic_economy: true,
    },
    FareRule {
        keywords: &["FLEX", "FLEXIBLE"],
        family: FareFamily::Flexible,
        basic_economy: false,
    },
    FareRule {
        keywords: &["STANDARD", "MAIN", "CLASSIC"],
        family: FareFamily::Standard,
        basic_economy: false,
    },
    FareRule {
        keywords: &["PREMIUM", "PLUS"],
        family: FareFamily::Premium,
        basic_economy: false,
    },
];

/// Maps a raw fare code to its fare family. A blank code falls back to the
/// cabin: premium cabins read as `Premium`, economy as `Standard`.
pub fn classify(fare_code_raw: &str, cabin: Cabin) -> FareClassification {
    let code = fare_code_raw.trim();
    if code.is_empty() {
        let fare_family = match cabin {
            Cabin::Economy => FareFamily::Standard,
            Cabin::PremiumEconomy | Cabin::Business | Cabin::First => FareFamily::Premium,
        };
        return FareClassification {
            fare_family,
            is_basic_economy: false,
        };
    }

    let upper = code.to_ascii_uppercase();
    for rule in FARE_RULES {
        if rule.keywords.iter().any(|keyword| upper.contains(keyword)) {
            return FareClassification {
                fare_family: rule.family.clone(),
                is_basic_economy: rule.basic_economy,
            };
        }
    }

    FareClassification {
        fare_family: FareFamily::Other(title_case(code)),
        is_basic_economy: false,
    }
}

fn title_case(raw: &str) -> String {
    raw.split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
