//! Flight offer normalization and pricing.
//!
//! Raw provider offers go through [`ingest::parse`] into a [`NormalizedOffer`],
//! and [`OfferEngine`] derives per-leg baggage and amenities, a price
//! breakdown and cross-leg diagnostics from it. Everything here is pure and
//! recomputed on every call.

pub mod amenities;
pub mod baggage;
pub mod consistency;
pub mod domain;
pub mod duration;
pub mod fare_family;
pub mod ingest;
pub mod pricing;
mod raw;
pub mod router;
pub mod view;

#[cfg(test)]
mod tests;

pub use amenities::{AmenitySet, MealService};
pub use baggage::{BaggagePolicy, PolicySource};
pub use consistency::{ConsistencyField, ConsistencyReport};
pub use domain::{
    Cabin, Endpoint, FareDetails, Itinerary, ItineraryIndex, NormalizedOffer, ParseWarning, Price,
    Segment,
};
pub use duration::{parse_duration, to_minutes, DurationParts};
pub use fare_family::{classify, FareClassification, FareFamily};
pub use ingest::{parse, IngestError};
pub use pricing::{PriceBreakdown, PriceDecomposer, PricingHeuristics, SplitRule};
pub use router::offer_router;
pub use view::{Layover, LegView, OfferEngine, OfferViewModel};
