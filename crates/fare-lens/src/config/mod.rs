use crate::fare_services::tracker::DEFAULT_CAPACITY;
use crate::offers::PricingHeuristics;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingHeuristics,
    pub fare_services: FareServicesConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let include_targets = env::var("APP_LOG_TARGETS")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let pricing = load_pricing_heuristics()?;

        let base_url = env::var("FARE_SERVICE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let cache_capacity = match env::var("FARE_SERVICE_CACHE_CAPACITY") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or(ConfigError::InvalidCacheCapacity)?,
            Err(_) => DEFAULT_CAPACITY,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets,
            },
            pricing,
            fare_services: FareServicesConfig {
                base_url,
                cache_capacity,
            },
        })
    }
}

fn load_pricing_heuristics() -> Result<PricingHeuristics, ConfigError> {
    let defaults = PricingHeuristics::default();

    let fallback_fee_share = decimal_var("PRICING_FALLBACK_FEE_SHARE")?
        .unwrap_or(defaults.fallback_fee_share);
    if fallback_fee_share < Decimal::ZERO || fallback_fee_share > Decimal::ONE {
        return Err(ConfigError::InvalidHeuristic {
            key: "PRICING_FALLBACK_FEE_SHARE",
            value: fallback_fee_share.to_string(),
        });
    }

    Ok(PricingHeuristics {
        fallback_fee_share,
        domestic_bag_fee: decimal_var("PRICING_DOMESTIC_BAG_FEE")?
            .unwrap_or(defaults.domestic_bag_fee),
        international_bag_fee: decimal_var("PRICING_INTERNATIONAL_BAG_FEE")?
            .unwrap_or(defaults.international_bag_fee),
        basic_economy_seat_fee: decimal_var("PRICING_BASIC_SEAT_FEE")?
            .unwrap_or(defaults.basic_economy_seat_fee),
    })
}

fn decimal_var(key: &'static str) -> Result<Option<Decimal>, ConfigError> {
    match env::var(key) {
        Ok(raw) => {
            let parsed = Decimal::from_str(raw.trim()).map_err(|_| {
                ConfigError::InvalidHeuristic {
                    key,
                    value: raw.clone(),
                }
            })?;
            if parsed.is_sign_negative() {
                return Err(ConfigError::InvalidHeuristic { key, value: raw });
            }
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub include_targets: bool,
}

/// Location of the remote fare-rules and upsell services. Absent means the
/// lookups are disabled and the API answers 503 for them.
#[derive(Debug, Clone)]
pub struct FareServicesConfig {
    pub base_url: Option<String>,
    /// Settled lookups remembered per lookup kind.
    pub cache_capacity: usize,
}

impl Default for FareServicesConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidHeuristic { key: &'static str, value: String },
    InvalidCacheCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHeuristic { key, value } => {
                write!(f, "{key} is not an acceptable decimal (got '{value}')")
            }
            ConfigError::InvalidCacheCapacity => {
                write!(f, "FARE_SERVICE_CACHE_CAPACITY must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidHeuristic { .. }
            | ConfigError::InvalidCacheCapacity => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_TARGETS",
            "FARE_SERVICE_URL",
            "FARE_SERVICE_CACHE_CAPACITY",
            "PRICING_FALLBACK_FEE_SHARE",
            "PRICING_DOMESTIC_BAG_FEE",
            "PRICING_INTERNATIONAL_BAG_FEE",
            "PRICING_BASIC_SEAT_FEE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.fare_services.base_url.is_none());
        assert_eq!(config.fare_services.cache_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.pricing, PricingHeuristics::default());
    }

    #[test]
    fn pricing_overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_FALLBACK_FEE_SHARE", "0.2");
        env::set_var("PRICING_INTERNATIONAL_BAG_FEE", "75");
        env::set_var("FARE_SERVICE_URL", "http://fares.internal/api/");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.pricing.fallback_fee_share, Decimal::new(2, 1));
        assert_eq!(config.pricing.international_bag_fee, Decimal::from(75));
        assert_eq!(config.pricing.domestic_bag_fee, Decimal::from(35));
        assert_eq!(
            config.fare_services.base_url.as_deref(),
            Some("http://fares.internal/api/")
        );
        reset_env();
    }

    #[test]
    fn rejects_fee_share_outside_unit_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRICING_FALLBACK_FEE_SHARE", "1.5");

        match AppConfig::load() {
            Err(ConfigError::InvalidHeuristic { key, .. }) => {
                assert_eq!(key, "PRICING_FALLBACK_FEE_SHARE")
            }
            other => panic!("expected heuristic error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn cache_capacity_must_be_positive() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FARE_SERVICE_CACHE_CAPACITY", "64");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.fare_services.cache_capacity, 64);

        env::set_var("FARE_SERVICE_CACHE_CAPACITY", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidCacheCapacity)
        ));
        reset_env();
    }
}
