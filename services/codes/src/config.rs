use std::fmt;
use std::time::Duration;

use chrono::TimeDelta;

const DEFAULT_CODES_PORT: u16 = 3114;
const DEFAULT_CODE_TTL_SECS: i64 = 30 * 60;
const MAX_CODE_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Codes service configuration, loaded once at process start.
pub struct CodesConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Shared secret for `/redeem` and `/list`. Env var: `ADMIN_TOKEN`.
    /// When unset every admin request is rejected.
    pub admin_token: Option<String>,
    /// TCP port to listen on (default 3114). Env var: `CODES_PORT`.
    pub codes_port: u16,
    /// Validity window of a freshly issued code (default 30 minutes, at most
    /// 24 hours). Env var: `CODE_TTL_SECS`.
    pub code_ttl: TimeDelta,
    /// Upper bound for a single store round trip (default 5s). Env var: `STORE_TIMEOUT_MS`.
    pub store_timeout: Duration,
}

impl CodesConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let codes_port = match get("CODES_PORT") {
            Some(v) => parse(&v, "CODES_PORT")?,
            None => DEFAULT_CODES_PORT,
        };

        let ttl_secs: i64 = match get("CODE_TTL_SECS") {
            Some(v) => parse(&v, "CODE_TTL_SECS")?,
            None => DEFAULT_CODE_TTL_SECS,
        };
        let code_ttl = TimeDelta::try_seconds(ttl_secs)
            .filter(|_| (1..=MAX_CODE_TTL_SECS).contains(&ttl_secs))
            .ok_or_else(|| ConfigError::Invalid {
                name: "CODE_TTL_SECS",
                value: ttl_secs.to_string(),
            })?;

        let store_timeout_ms: u64 = match get("STORE_TIMEOUT_MS") {
            Some(v) => parse(&v, "STORE_TIMEOUT_MS")?,
            None => DEFAULT_STORE_TIMEOUT_MS,
        };
        if store_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "STORE_TIMEOUT_MS",
                value: store_timeout_ms.to_string(),
            });
        }

        Ok(Self {
            database_url,
            admin_token: get("ADMIN_TOKEN"),
            codes_port,
            code_ttl,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }
}

fn parse<T: std::str::FromStr>(value: &str, name: &'static str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_owned(),
    })
}

impl fmt::Debug for CodesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodesConfig")
            .field("database_url", &"<redacted>")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("codes_port", &self.codes_port)
            .field("code_ttl", &self.code_ttl)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}
