use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

/// Environment prefix; nested keys are separated by `__`,
/// e.g. `DBCREDS_ISSUER__DEFAULT_LEASE_SECS=1800`.
pub const ENV_PREFIX: &str = "DBCREDS_";

/// Lease applied when no lease configuration has been written.
pub const DEFAULT_LEASE: Duration = Duration::from_secs(60 * 60);

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::from_env().expect("FATAL: invalid dbcreds configuration"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub issuer: IssuerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Shared key required on every management and issuance route.
    /// Left empty, all authenticated routes reject.
    pub api_key: String,
    /// Policy store holding roles and the lease configuration.
    pub database_url: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            api_key: String::new(),
            database_url: "sqlite://dbcreds.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Database in which role SQL provisions credentials.
    pub target_database_url: String,
    /// Catalog selected at the start of every issuance transaction.
    pub default_catalog: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub default_lease_secs: u64,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            target_database_url: "sqlite://target.db?mode=rwc".to_string(),
            default_catalog: None,
            max_connections: 5,
            acquire_timeout_secs: 30,
            default_lease_secs: DEFAULT_LEASE.as_secs(),
        }
    }
}

impl IssuerConfig {
    pub fn default_lease(&self) -> Duration {
        if self.default_lease_secs == 0 {
            DEFAULT_LEASE
        } else {
            Duration::from_secs(self.default_lease_secs)
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Config {
    /// Defaults overlaid with `DBCREDS_*` environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
