pub mod config;
pub mod error;
pub mod fare_services;
pub mod offers;
pub mod telemetry;
