//! Coordinator configuration.
//!
//! [`CoordinatorConfig`] carries the tunable protocol parameters with
//! sane defaults. [`AppConfig`] is the process-level configuration loaded
//! from the environment at startup; a missing required variable is a
//! fatal [`ConfigError`].

use crate::domain::batch::{DEFAULT_COMMITMENT_DURATION_MINS, DEFAULT_REVEAL_DURATION_MINS};
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Tunable protocol parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Default commitment window for new batches, in minutes.
    pub commitment_duration_mins: u64,
    /// Default reveal window for new batches, in minutes.
    pub reveal_duration_mins: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            commitment_duration_mins: DEFAULT_COMMITMENT_DURATION_MINS,
            reveal_duration_mins: DEFAULT_REVEAL_DURATION_MINS,
        }
    }
}

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process-level configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface the API layer binds to.
    pub api_host: String,
    /// Port the API layer binds to.
    pub api_port: u16,
    /// Connection string of the durable store.
    pub database_url: String,
    /// Connection string of the cache.
    pub redis_url: String,
    /// Secret for API token signing.
    pub jwt_secret: String,
    /// API token lifetime, as accepted by the API layer.
    pub jwt_expires_in: String,
    /// RPC endpoint of the Sepolia node.
    pub sepolia_rpc_url: String,
    /// Hex-encoded operator signing key.
    pub private_key: String,
    /// Etherscan API key for receipt lookups.
    pub etherscan_api_key: String,
    /// Deployed fair-ordering contract, when present.
    pub fair_ordering_contract_address: Option<String>,
    /// Deployed commit-reveal contract, when present.
    pub commit_reveal_contract_address: Option<String>,
    /// Deployed threshold-decryption contract, when present.
    pub threshold_decryption_contract_address: Option<String>,
    /// Protocol parameters.
    pub coordinator: CoordinatorConfig,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVariable(name))
}

impl AppConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_port_raw = required("API_PORT")?;
        let api_port = api_port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "API_PORT",
                value: api_port_raw,
            })?;

        Ok(Self {
            api_host: required("API_HOST")?,
            api_port,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expires_in: required("JWT_EXPIRES_IN")?,
            sepolia_rpc_url: required("SEPOLIA_RPC_URL")?,
            private_key: required("PRIVATE_KEY")?,
            etherscan_api_key: required("ETHERSCAN_API_KEY")?,
            fair_ordering_contract_address: env::var("FAIR_ORDERING_CONTRACT_ADDRESS").ok(),
            commit_reveal_contract_address: env::var("COMMIT_REVEAL_CONTRACT_ADDRESS").ok(),
            threshold_decryption_contract_address: env::var("THRESHOLD_DECRYPTION_CONTRACT_ADDRESS")
                .ok(),
            coordinator: CoordinatorConfig::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize these tests.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const REQUIRED: &[(&str, &str)] = &[
        ("API_HOST", "0.0.0.0"),
        ("API_PORT", "3000"),
        ("DATABASE_URL", "postgres://localhost/fairbatch"),
        ("REDIS_URL", "redis://localhost:6379"),
        ("JWT_SECRET", "test-secret"),
        ("JWT_EXPIRES_IN", "24h"),
        ("SEPOLIA_RPC_URL", "https://rpc.sepolia.example"),
        ("PRIVATE_KEY", "0x01"),
        ("ETHERSCAN_API_KEY", "key"),
    ];

    fn set_all() {
        for (name, value) in REQUIRED {
            env::set_var(name, value);
        }
        env::remove_var("FAIR_ORDERING_CONTRACT_ADDRESS");
        env::remove_var("COMMIT_REVEAL_CONTRACT_ADDRESS");
        env::remove_var("THRESHOLD_DECRYPTION_CONTRACT_ADDRESS");
    }

    #[test]
    fn test_loads_complete_environment() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.database_url, "postgres://localhost/fairbatch");
        assert!(config.commit_reveal_contract_address.is_none());
        assert_eq!(config.coordinator.commitment_duration_mins, 30);
    }

    #[test]
    fn test_missing_required_variable_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();
        env::remove_var("JWT_SECRET");

        let result = AppConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::MissingVariable("JWT_SECRET"))
        ));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();
        env::set_var("API_PORT", "not-a-port");

        let result = AppConfig::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "API_PORT", .. })
        ));
    }

    #[test]
    fn test_optional_contract_addresses() {
        let _guard = ENV_LOCK.lock().unwrap();
        set_all();
        env::set_var("COMMIT_REVEAL_CONTRACT_ADDRESS", "0xdeadbeef");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.commit_reveal_contract_address.as_deref(),
            Some("0xdeadbeef")
        );

        env::remove_var("COMMIT_REVEAL_CONTRACT_ADDRESS");
    }

    #[test]
    fn test_default_coordinator_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.commitment_duration_mins, 30);
        assert_eq!(config.reveal_duration_mins, 15);
    }
}
