//! Application configuration

use std::env;
use std::fmt;
use std::time::Duration;

use redis::{ConnectionInfo, IntoConnectionInfo};

use crate::routing::HostPolicy;
use crate::store::RedisTimeouts;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:80";
const DEFAULT_REDIS_ADDR: &str = "redis:6379";
const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;
const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Resolver configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// How long a keep-alive connection may sit between requests
    pub idle_timeout: Duration,
    pub shutdown_timeout: Duration,

    // Redis
    pub redis: RedisSettings,

    // Routing
    pub host_policy: HostPolicy,

    // Logging
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            redis: RedisSettings::default(),
            host_policy: HostPolicy::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            // Server
            bind_address: match env::var("PORT") {
                Ok(port) => {
                    let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
                        var: "PORT",
                        reason: format!("not a port number: {port}"),
                    })?;
                    format!("0.0.0.0:{port}")
                }
                Err(_) => env::var("BIND_ADDRESS")
                    .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            },
            read_timeout: secs_from_env("READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS),
            write_timeout: secs_from_env("WRITE_TIMEOUT_SECS", DEFAULT_WRITE_TIMEOUT_SECS),
            idle_timeout: secs_from_env("IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS),
            shutdown_timeout: secs_from_env(
                "SHUTDOWN_TIMEOUT_SECS",
                DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            ),

            // Redis
            redis: RedisSettings {
                url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                addr: env::var("REDIS_ADDR").unwrap_or_else(|_| DEFAULT_REDIS_ADDR.to_string()),
                password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
                db: match env::var("REDIS_DB") {
                    Ok(db) => db.parse().map_err(|_| ConfigError::Invalid {
                        var: "REDIS_DB",
                        reason: format!("not a database index: {db}"),
                    })?,
                    Err(_) => 0,
                },
                timeouts: {
                    let defaults = RedisTimeouts::default();
                    RedisTimeouts {
                        connect: duration_from_env("REDIS_CONNECT_TIMEOUT_SECS", defaults.connect),
                        response: duration_from_env(
                            "REDIS_RESPONSE_TIMEOUT_SECS",
                            defaults.response,
                        ),
                    }
                },
            },

            // Routing
            // A malformed trust chain must never fall back to a default silently
            host_policy: match env::var("TRUSTED_HOST_HEADERS") {
                Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                    var: "TRUSTED_HOST_HEADERS",
                    reason: format!("{e}"),
                })?,
                Err(_) => HostPolicy::default(),
            },

            // Logging
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        // A lookup has to fail as a store error before the handler deadline hits
        if config.redis.timeouts.total() >= config.write_timeout {
            return Err(ConfigError::Invalid {
                var: "WRITE_TIMEOUT_SECS",
                reason: format!(
                    "{:?} leaves no room for Redis connect + response timeouts of {:?}",
                    config.write_timeout,
                    config.redis.timeouts.total()
                ),
            });
        }

        Ok(config)
    }
}

fn secs_from_env(var: &str, default: u64) -> Duration {
    duration_from_env(var, Duration::from_secs(default))
}

fn duration_from_env(var: &str, default: Duration) -> Duration {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

/// Redis connection settings
#[derive(Clone)]
pub struct RedisSettings {
    /// Full `redis://` URL; takes precedence over `addr`/`password`/`db`
    pub url: Option<String>,
    pub addr: String,
    pub password: Option<String>,
    pub db: i64,
    pub timeouts: RedisTimeouts,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: None,
            addr: DEFAULT_REDIS_ADDR.to_string(),
            password: None,
            db: 0,
            timeouts: RedisTimeouts::default(),
        }
    }
}

impl RedisSettings {
    pub fn connection_info(&self) -> Result<ConnectionInfo, ConfigError> {
        if let Some(url) = &self.url {
            return url
                .as_str()
                .into_connection_info()
                .map_err(|e| ConfigError::Invalid {
                    var: "REDIS_URL",
                    reason: e.to_string(),
                });
        }

        let mut info = format!("redis://{}/{}", self.addr, self.db)
            .into_connection_info()
            .map_err(|e| ConfigError::Invalid {
                var: "REDIS_ADDR",
                reason: e.to_string(),
            })?;
        info.redis.password = self.password.clone();
        Ok(info)
    }
}

// Keeps the credential out of logs
impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("addr", &self.addr)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("db", &self.db)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
