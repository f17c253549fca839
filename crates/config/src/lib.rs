//! Configuration loading, validation, and management for TripWeaver.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. Validates all settings at load time: retry and backoff
//! policy, circuit breaker thresholds, per-capability pool sizes, the
//! per-slot alternatives cap, and the geography tables (district→area
//! hierarchy, adjacency sets, and the adjacent-district fallback list).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tripweaver_core::error::{Error, Result};

/// The root configuration structure.
///
/// Maps directly to `tripweaver.toml`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Remote provisioning service settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Planner settings
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Geography tables
    #[serde(default)]
    pub geography: GeographyConfig,
}

/// Settings for the remote provisioning service and the resilience layer
/// wrapped around it.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the provisioning service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for the provisioning service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Caller deadline for one capability invocation, covering pool wait,
    /// network round trips, and retry backoff sleeps
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Retry and backoff policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Circuit breaker policy
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Per-capability pool sizes (max concurrent in-flight calls)
    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            call_timeout_secs: default_call_timeout_secs(),
            retry: RetryConfig::default(),
            breaker: BreakerConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8700".into()
}
fn default_call_timeout_secs() -> u64 {
    10
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("call_timeout_secs", &self.call_timeout_secs)
            .field("retry", &self.retry)
            .field("breaker", &self.breaker)
            .field("pool", &self.pool)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; a capability that fails every
    /// attempt makes at most `max_retries + 1` calls
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff delay ceiling in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    200
}
fn default_max_delay_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the breaker open
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds the breaker stays open before admitting a probe call
    #[serde(default = "default_recovery_timeout_secs")]
    pub recovery_timeout_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout_secs(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    5
}
fn default_recovery_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Max concurrent search invocations
    #[serde(default = "default_pool_permits")]
    pub search: usize,

    /// Max concurrent rank invocations
    #[serde(default = "default_pool_permits")]
    pub rank: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            search: default_pool_permits(),
            rank: default_pool_permits(),
        }
    }
}

fn default_pool_permits() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Max alternatives retained per slot for caller display
    #[serde(default = "default_alternatives_cap")]
    pub alternatives_cap: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            alternatives_cap: default_alternatives_cap(),
        }
    }
}

fn default_alternatives_cap() -> usize {
    10
}

/// The district/area hierarchy and adjacency tables.
///
/// This is data, not logic: the location matcher and the provisioning
/// fallback ladder are driven entirely by these tables, so extending the
/// city coverage is a config change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographyConfig {
    /// area → districts it contains
    #[serde(default = "default_areas")]
    pub areas: HashMap<String, Vec<String>>,

    /// district → districts treated as interchangeable for travel-time
    /// purposes
    #[serde(default = "default_adjacent")]
    pub adjacent: HashMap<String, Vec<String>>,

    /// Districts searched when the anchor districts yield nothing
    #[serde(default = "default_fallback_districts")]
    pub fallback_districts: Vec<String>,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            areas: default_areas(),
            adjacent: default_adjacent(),
            fallback_districts: default_fallback_districts(),
        }
    }
}

fn default_areas() -> HashMap<String, Vec<String>> {
    let mut areas = HashMap::new();
    areas.insert(
        "west".into(),
        vec!["Wanhua".into(), "Datong".into(), "Zhongzheng".into()],
    );
    areas.insert(
        "east".into(),
        vec!["Xinyi".into(), "Songshan".into(), "Nangang".into()],
    );
    areas.insert("central".into(), vec!["Da'an".into(), "Zhongshan".into()]);
    areas.insert(
        "north".into(),
        vec!["Shilin".into(), "Beitou".into(), "Neihu".into()],
    );
    areas.insert("south".into(), vec!["Wenshan".into()]);
    areas
}

fn default_adjacent() -> HashMap<String, Vec<String>> {
    let mut adjacent = HashMap::new();
    adjacent.insert("Zhongzheng".into(), vec!["Wanhua".into(), "Da'an".into()]);
    adjacent.insert("Wanhua".into(), vec!["Zhongzheng".into(), "Datong".into()]);
    adjacent.insert("Da'an".into(), vec!["Zhongzheng".into(), "Xinyi".into()]);
    adjacent.insert("Xinyi".into(), vec!["Da'an".into(), "Songshan".into()]);
    adjacent.insert("Zhongshan".into(), vec!["Datong".into(), "Songshan".into()]);
    adjacent.insert("Songshan".into(), vec!["Xinyi".into(), "Zhongshan".into()]);
    adjacent.insert("Shilin".into(), vec!["Beitou".into()]);
    adjacent.insert("Beitou".into(), vec!["Shilin".into()]);
    adjacent
}

fn default_fallback_districts() -> Vec<String> {
    vec![
        "Zhongzheng".into(),
        "Da'an".into(),
        "Xinyi".into(),
        "Zhongshan".into(),
    ]
}

impl AppConfig {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (no env overrides, no
    /// validation).
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config {
            message: format!("Invalid configuration: {e}"),
        })
    }

    /// Defaults with environment overrides applied and validated. Used when
    /// no config file is present.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TRIPWEAVER_REMOTE_URL") {
            self.remote.base_url = url;
        }
        if let Ok(key) = std::env::var("TRIPWEAVER_API_KEY") {
            self.remote.api_key = Some(key);
        }
    }

    /// Validate threshold and bound settings.
    pub fn validate(&self) -> Result<()> {
        fn invalid(message: impl Into<String>) -> Error {
            Error::Config {
                message: message.into(),
            }
        }

        if self.remote.base_url.trim().is_empty() {
            return Err(invalid("remote.base_url must not be empty"));
        }
        if self.remote.call_timeout_secs == 0 {
            return Err(invalid("remote.call_timeout_secs must be at least 1"));
        }
        if self.remote.retry.base_delay_ms == 0 {
            return Err(invalid("remote.retry.base_delay_ms must be at least 1"));
        }
        if self.remote.retry.base_delay_ms > self.remote.retry.max_delay_ms {
            return Err(invalid(
                "remote.retry.base_delay_ms must not exceed remote.retry.max_delay_ms",
            ));
        }
        if self.remote.breaker.failure_threshold == 0 {
            return Err(invalid("remote.breaker.failure_threshold must be at least 1"));
        }
        if self.remote.pool.search == 0 || self.remote.pool.rank == 0 {
            return Err(invalid("remote.pool sizes must be at least 1"));
        }
        if self.planner.alternatives_cap == 0 {
            return Err(invalid("planner.alternatives_cap must be at least 1"));
        }

        // Every fallback district must belong to a known area, otherwise
        // the location matcher cannot score it.
        for district in &self.geography.fallback_districts {
            let known = self
                .geography
                .areas
                .values()
                .any(|districts| districts.iter().any(|d| d == district));
            if !known {
                return Err(invalid(format!(
                    "geography.fallback_districts contains unknown district '{district}'"
                )));
            }
        }

        Ok(())
    }
}
