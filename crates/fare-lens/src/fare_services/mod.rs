//! Boundary to the remote fare-rules and fare-upsell services.
//!
//! The offer engine never calls these itself; callers go through
//! [`FareServices`], which deduplicates requests per offer and keeps
//! failures visible until they are retried or dismissed.

pub mod domain;
pub mod gateway;
pub mod router;
pub mod service;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use domain::{FareRules, UpsellResponse};
pub use gateway::{FareServiceGateway, FetchError, HttpFareServiceClient};
pub use router::fare_services_router;
pub use service::{DisabledGateway, FareServices};
pub use tracker::{Admission, LookupState, PendingSlot, RequestTracker};
