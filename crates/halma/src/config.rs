//! Server configuration, from code or from the environment.
//!
//! | Variable              | Meaning                                   | Default        |
//! |-----------------------|-------------------------------------------|----------------|
//! | `HALMA_BIND`          | full listen address, wins over `PORT`     | unset          |
//! | `PORT`                | port on `0.0.0.0`                         | `3000`         |
//! | `HALMA_ROOM_CODE_LEN` | room code length, 1 to 16                 | `4`            |
//! | `HALMA_WIN_RULE`      | `strict` or `count-blocked`               | `strict`       |

use std::net::SocketAddr;

use halma_room::{RegistryConfig, WinRule};
use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 3000;
const MAX_CODE_LENGTH: usize = 16;

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but cannot be
    /// parsed or is out of range. Unset variables take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(bind) = lookup("HALMA_BIND") {
            bind.parse::<SocketAddr>()
                .map_err(|e| ConfigError::invalid("HALMA_BIND", e))?;
            config.bind_addr = bind;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = port.trim().parse().map_err(|e| ConfigError::invalid("PORT", e))?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(len) = lookup("HALMA_ROOM_CODE_LEN") {
            let len: usize = len
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("HALMA_ROOM_CODE_LEN", e))?;
            if !(1..=MAX_CODE_LENGTH).contains(&len) {
                return Err(ConfigError::invalid(
                    "HALMA_ROOM_CODE_LEN",
                    format!("must be between 1 and {MAX_CODE_LENGTH}"),
                ));
            }
            config.registry.code_length = len;
        }

        if let Some(rule) = lookup("HALMA_WIN_RULE") {
            config.registry.match_config.win_rule = match rule.trim().to_lowercase().as_str() {
                "strict" => WinRule::Strict,
                "count-blocked" => WinRule::CountBlocked,
                other => {
                    return Err(ConfigError::invalid(
                        "HALMA_WIN_RULE",
                        format!("unknown rule {other:?}, expected strict or count-blocked"),
                    ));
                }
            };
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    fn invalid(var: &str, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            var: var.to_string(),
            reason: reason.to_string(),
        }
    }
}
