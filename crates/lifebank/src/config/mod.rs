use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::supply::domain::StockThresholds;
use crate::workflows::supply::donors::EligibilityConfig;
use crate::workflows::supply::inventory::InventoryPolicy;
use crate::workflows::supply::requests::FulfillmentPolicy;

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
    pub policies: PolicyConfig,
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

        let policies = PolicyConfig {
            minimum_donor_age: parse_env("APP_MINIMUM_DONOR_AGE", 17)?,
            donations_to_complete: parse_env("APP_DONATIONS_TO_COMPLETE", 50)?,
            unit_volume_min_ml: parse_env("APP_UNIT_VOLUME_MIN_ML", 50)?,
            unit_volume_max_ml: parse_env("APP_UNIT_VOLUME_MAX_ML", 1_000)?,
            expiry_horizon_days: parse_env("APP_EXPIRY_HORIZON_DAYS", 7)?,
            low_stock_ml: parse_env("APP_LOW_STOCK_ML", 2_000)?,
            critical_stock_ml: parse_env("APP_CRITICAL_STOCK_ML", 800)?,
            allow_payment_hold: env::var("APP_ALLOW_PAYMENT_HOLD")
                .map(|value| value.trim() != "0" && !value.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            policies,
        })
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Copy,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidPolicy { key }),
        Err(_) => Ok(default),
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
}

/// Business-policy dials read from the environment.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub minimum_donor_age: u32,
    pub donations_to_complete: u32,
    pub unit_volume_min_ml: u32,
    pub unit_volume_max_ml: u32,
    pub expiry_horizon_days: i64,
    pub low_stock_ml: u32,
    pub critical_stock_ml: u32,
    pub allow_payment_hold: bool,
}

impl PolicyConfig {
    pub fn eligibility(&self) -> EligibilityConfig {
        EligibilityConfig {
            minimum_age_years: self.minimum_donor_age,
            donations_to_complete: self.donations_to_complete,
        }
    }

    pub fn inventory(&self) -> InventoryPolicy {
        InventoryPolicy::new(
            self.unit_volume_min_ml,
            self.unit_volume_max_ml,
            self.expiry_horizon_days,
        )
    }

    pub fn stock_thresholds(&self) -> StockThresholds {
        StockThresholds::new(self.low_stock_ml, self.critical_stock_ml)
    }

    pub fn fulfillment(&self) -> FulfillmentPolicy {
        FulfillmentPolicy {
            allow_payment_hold: self.allow_payment_hold,
            stock: self.stock_thresholds(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPolicy { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPolicy { key } => {
                write!(f, "{key} must be a valid number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPolicy { .. } => None,
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
            "APP_MINIMUM_DONOR_AGE",
            "APP_UNIT_VOLUME_MIN_ML",
            "APP_LOW_STOCK_ML",
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
        assert_eq!(config.policies.minimum_donor_age, 17);
        assert!(config.policies.allow_payment_hold);
    }

    #[test]
    fn policy_overrides_flow_into_typed_policies() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MINIMUM_DONOR_AGE", "18");
        env::set_var("APP_LOW_STOCK_ML", "3000");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.policies.eligibility().minimum_age_years, 18);
        assert_eq!(config.policies.stock_thresholds().low_ml, 3_000);
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
}
