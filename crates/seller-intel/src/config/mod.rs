use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Distinguishes runtime behavior for different stages of the pipeline.
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

/// Top-level configuration for the runner binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            environment,
            telemetry: TelemetryConfig { log_level },
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Named numeric parameters driving the scoring engine.
///
/// Constructed once at run start (defaults merged with store overrides) and
/// passed by reference to every scoring function; no ambient state.
///
/// The six propensity weights are expected to sum to roughly 1.0 but this is
/// deliberately not enforced, matching how operators tune the config table
/// today. The four TD-Fit weights are fixed constants in the scoring rules
/// and are not configurable here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub market_value_multiplier: f64,
    pub hot_threshold: u8,
    pub warm_threshold: u8,
    pub min_years_owned: f64,
    pub min_equity: f64,
    pub target_price_min: f64,
    pub target_price_max: f64,
    pub weight_years_owned: f64,
    pub weight_equity_gain: f64,
    pub weight_neighborhood_turnover: f64,
    pub weight_owner_occupied: f64,
    pub weight_price_tier: f64,
    pub weight_home_age: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            market_value_multiplier: 1.1,
            hot_threshold: 80,
            warm_threshold: 50,
            min_years_owned: 3.0,
            min_equity: 30_000.0,
            target_price_min: 200_000.0,
            target_price_max: 750_000.0,
            weight_years_owned: 0.25,
            weight_equity_gain: 0.25,
            weight_neighborhood_turnover: 0.15,
            weight_owner_occupied: 0.10,
            weight_price_tier: 0.15,
            weight_home_age: 0.10,
        }
    }
}

impl ScoringConfig {
    /// Merge overrides from an external config store onto the defaults.
    ///
    /// Only recognized keys are applied; anything else in the store is
    /// ignored. A store failure keeps the defaults and logs a warning, since
    /// silently different weights change every score distribution downstream.
    pub fn load<S: ConfigStore + ?Sized>(store: &S) -> Self {
        let mut config = Self::default();

        match store.fetch() {
            Ok(overrides) => {
                config.apply_overrides(&overrides);
                tracing::info!(?config, "loaded scoring config");
            }
            Err(err) => {
                tracing::warn!(error = %err, "config store unavailable, using default scoring config");
            }
        }

        config
    }

    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, f64>) {
        for (key, value) in overrides {
            match key.as_str() {
                "market_value_multiplier" => self.market_value_multiplier = *value,
                "hot_threshold" => self.hot_threshold = clamp_score(*value),
                "warm_threshold" => self.warm_threshold = clamp_score(*value),
                "min_years_owned" => self.min_years_owned = *value,
                "min_equity" => self.min_equity = *value,
                "target_price_min" => self.target_price_min = *value,
                "target_price_max" => self.target_price_max = *value,
                "weight_years_owned" => self.weight_years_owned = *value,
                "weight_equity_gain" => self.weight_equity_gain = *value,
                "weight_neighborhood_turnover" => self.weight_neighborhood_turnover = *value,
                "weight_owner_occupied" => self.weight_owner_occupied = *value,
                "weight_price_tier" => self.weight_price_tier = *value,
                "weight_home_age" => self.weight_home_age = *value,
                other => {
                    tracing::debug!(key = other, "ignoring unrecognized config key");
                }
            }
        }
    }
}

fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// External key-value config source (the suite keeps this in a spreadsheet
/// config tab; tests and the CLI use file- or map-backed stores).
pub trait ConfigStore {
    fn fetch(&self) -> Result<BTreeMap<String, f64>, ConfigStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("config store unreachable: {0}")]
    Unreachable(String),
    #[error("config store returned malformed data: {0}")]
    Malformed(String),
}

/// Store backed by a JSON object of `{"key": number}` pairs on disk.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn fetch(&self) -> Result<BTreeMap<String, f64>, ConfigStoreError> {
        let file = File::open(&self.path)
            .map_err(|err| ConfigStoreError::Unreachable(format!("{}: {err}", self.path.display())))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|err| ConfigStoreError::Malformed(format!("{}: {err}", self.path.display())))
    }
}

/// In-memory store for tests and fully-specified runs.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigStore {
    overrides: BTreeMap<String, f64>,
}

impl StaticConfigStore {
    pub fn new(overrides: BTreeMap<String, f64>) -> Self {
        Self { overrides }
    }
}

impl ConfigStore for StaticConfigStore {
    fn fetch(&self) -> Result<BTreeMap<String, f64>, ConfigStoreError> {
        Ok(self.overrides.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl ConfigStore for FailingStore {
        fn fetch(&self) -> Result<BTreeMap<String, f64>, ConfigStoreError> {
            Err(ConfigStoreError::Unreachable("offline".to_string()))
        }
    }

    #[test]
    fn app_config_defaults_when_env_missing() {
        use std::sync::{Mutex, OnceLock};
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        let _lock = GUARD.get_or_init(|| Mutex::new(())).lock().expect("env mutex poisoned");

        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        let config = AppConfig::load();
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ScoringConfig::default();
        assert_eq!(config.market_value_multiplier, 1.1);
        assert_eq!(config.hot_threshold, 80);
        assert_eq!(config.warm_threshold, 50);
        assert_eq!(config.min_equity, 30_000.0);
        let weight_sum = config.weight_years_owned
            + config.weight_equity_gain
            + config.weight_neighborhood_turnover
            + config.weight_owner_occupied
            + config.weight_price_tier
            + config.weight_home_age;
        assert!((weight_sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn overrides_apply_and_unknown_keys_are_ignored() {
        let mut overrides = BTreeMap::new();
        overrides.insert("hot_threshold".to_string(), 90.0);
        overrides.insert("min_years_owned".to_string(), 5.0);
        overrides.insert("no_such_knob".to_string(), 42.0);

        let config = ScoringConfig::load(&StaticConfigStore::new(overrides));
        assert_eq!(config.hot_threshold, 90);
        assert_eq!(config.min_years_owned, 5.0);
        assert_eq!(config.warm_threshold, 50);
    }

    #[test]
    fn store_failure_falls_back_to_defaults() {
        let config = ScoringConfig::load(&FailingStore);
        assert_eq!(config, ScoringConfig::default());
    }
}
