use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

static ISO_DURATION: OnceLock<Regex> = OnceLock::new();

fn iso_duration() -> &'static Regex {
    ISO_DURATION.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:\d+(?:\.\d+)?S)?)?$")
            .expect("duration pattern compiles")
    })
}

/// Hours and minutes of a flight duration; `minutes` is always below 60.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DurationParts {
    pub hours: u32,
    pub minutes: u32,
}

impl DurationParts {
    pub fn from_minutes(total: u32) -> Self {
        Self {
            hours: total / 60,
            minutes: total % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }

    /// Short label such as `7h 30m`, `2h` or `45m`.
    pub fn label(&self) -> String {
        match (self.hours, self.minutes) {
            (0, minutes) => format!("{minutes}m"),
            (hours, 0) => format!("{hours}h"),
            (hours, minutes) => format!("{hours}h {minutes}m"),
        }
    }
}

/// Strict variant used by ingest to tell malformed tokens apart from `PT0M`.
pub(crate) fn try_parse(token: &str) -> Option<DurationParts> {
    let trimmed = token.trim().to_ascii_uppercase();
    // a bare "P" or "PT" matches the pattern but carries no components
    if trimmed.len() <= 2 && !trimmed.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let captures = iso_duration().captures(&trimmed)?;
    let component = |idx: usize| -> Option<u32> {
        match captures.get(idx) {
            Some(found) => found.as_str().parse::<u32>().ok(),
            None => Some(0),
        }
    };

    let days = component(1)?;
    let hours = component(2)?;
    let minutes = component(3)?;

    let total = days
        .checked_mul(24 * 60)?
        .checked_add(hours.checked_mul(60)?)?
        .checked_add(minutes)?;
    Some(DurationParts::from_minutes(total))
}

/// Parses an ISO-8601 duration token (`PT7H30M`, `P1DT2H`). Unparseable
/// tokens yield zero rather than an error.
pub fn parse_duration(token: &str) -> DurationParts {
    try_parse(token).unwrap_or_default()
}

pub fn to_minutes(token: &str) -> u32 {
    parse_duration(token).total_minutes()
}
