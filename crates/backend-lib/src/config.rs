// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::cookie::DEFAULT_COOKIE_NAME;
use crate::auth::password::{PasswordHasher, DEFAULT_LOG_N};


/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "NOTES_";

/// Config file read from the working directory by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Longest accepted cookie or token lifetime
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("session.jwt_secret must be set and non-empty")]
    MissingSecret,

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Prometheus scrape address. No exporter runs when unset.
    pub metrics_addr: Option<SocketAddr>,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Session token and cookie settings
    pub session: SessionSettings,
    /// Request admission control
    pub rate_limit: RateLimitSettings,
    /// Password hashing cost
    pub password: PasswordSettings,
}

/// Session settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Shared HMAC secret. Required.
    pub jwt_secret: String,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Lifetime of the cookie in seconds
    pub cookie_ttl_secs: u64,
    /// Lifetime of the token inside the cookie in seconds
    pub jwt_ttl_secs: u64,
}

/// Token bucket settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Bucket capacity (burst size)
    pub capacity: u32,
    /// Tokens added per second
    pub refill_per_sec: u32,
}

/// Password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    /// scrypt `log2(N)`
    pub scrypt_log_n: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            metrics_addr: None,
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            session: SessionSettings::default(),
            rate_limit: RateLimitSettings::default(),
            password: PasswordSettings::default(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_ttl_secs: 10 * 60,
            jwt_ttl_secs: 5 * 60,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            capacity: 4,
            refill_per_sec: 1,
        }
    }
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            scrypt_log_n: DEFAULT_LOG_N,
        }
    }
}

// The secret never reaches a log line.
impl fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSettings")
            .field("jwt_secret", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("cookie_ttl_secs", &self.cookie_ttl_secs)
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .finish()
    }
}

impl SessionSettings {
    pub fn cookie_ttl(&self) -> Duration {
        Duration::from_secs(self.cookie_ttl_secs)
    }

    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt_ttl_secs)
    }

    /// Check the parts of the session config the service cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        if self.cookie_name.is_empty()
            || !self
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid {
                field: "session.cookie_name",
                reason: "must be non-empty and contain only [A-Za-z0-9_-]".to_string(),
            });
        }

        for (field, secs) in [
            ("session.cookie_ttl_secs", self.cookie_ttl_secs),
            ("session.jwt_ttl_secs", self.jwt_ttl_secs),
        ] {
            if !(1..=MAX_TTL_SECS).contains(&secs) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be between 1 and {MAX_TTL_SECS} seconds"),
                });
            }
        }

        Ok(())
    }
}

impl Settings {
    /// Load settings from `config.toml` and `NOTES_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from the given file and `NOTES_*` environment variables.
    /// A missing file is not an error; defaults and the environment still apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(settings)
    }

    /// Validate settings. Startup must stop on any error returned here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        if self.rate_limit.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.capacity",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.rate_limit.refill_per_sec == 0 {
            return Err(ConfigError::Invalid {
                field: "rate_limit.refill_per_sec",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.metrics_addr == Some(self.bind_addr) {
            return Err(ConfigError::Invalid {
                field: "metrics_addr",
                reason: "must differ from bind_addr".to_string(),
            });
        }

        PasswordHasher::new(self.password.scrypt_log_n).map_err(|e| ConfigError::Invalid {
            field: "password.scrypt_log_n",
            reason: e.to_string(),
        })?;

        if self.session.jwt_ttl_secs > self.session.cookie_ttl_secs {
            tracing::warn!(
                jwt_ttl_secs = self.session.jwt_ttl_secs,
                cookie_ttl_secs = self.session.cookie_ttl_secs,
                "token outlives its cookie; sessions will end at cookie expiry"
            );
        }

        Ok(())
    }
}
