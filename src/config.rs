// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `LESSONMAP_BIND` | `127.0.0.1:8000` |
//! | `OPENROUTER_API_KEY` | unset (generation calls fail with an authentication error) |
//! | `OPENROUTER_BASE_URL` | `https://openrouter.ai/api` |
//! | `LESSONMAP_DEFAULT_MODEL` | `gpt-4o-mini` |
//! | `JWT_SECRET` | required |
//! | `LESSONMAP_DATA_DIR` | unset (in-memory store) |
//! | `LESSONMAP_DURABLE_WRITES` | `false` |
//! | `LESSONMAP_STREAM_NEWLINES` | `false` |
//! | `LESSONMAP_OTP_TTL_SECS` | `600` |
//! | `LESSONMAP_OTP_CAPACITY` | `10000` |
//! | `LESSONMAP_TOKEN_TTL_SECS` | `604800` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{DEFAULT_OTP_CAPACITY, DEFAULT_OTP_TTL, DEFAULT_TOKEN_TTL};
use crate::provider::openrouter::DEFAULT_BASE_URL;
use crate::provider::DEFAULT_MODEL;
use crate::relay::Framing;
use crate::store::WriteDurability;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub default_model: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub otp_ttl: Duration,
    pub otp_capacity: usize,
    /// `None` keeps documents in memory.
    pub data_dir: Option<PathBuf>,
    pub durability: WriteDurability,
    pub framing: Framing,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field(
                "openrouter_api_key",
                &self.openrouter_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("openrouter_base_url", &self.openrouter_base_url)
            .field("default_model", &self.default_model)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("otp_ttl", &self.otp_ttl)
            .field("otp_capacity", &self.otp_capacity)
            .field("data_dir", &self.data_dir)
            .field("durability", &self.durability)
            .field("framing", &self.framing)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let bind: SocketAddr = parse_or("LESSONMAP_BIND", get("LESSONMAP_BIND"), || {
            DEFAULT_BIND.parse().map_err(|_| ())
        })?;
        let otp_capacity: usize = parse_or(
            "LESSONMAP_OTP_CAPACITY",
            get("LESSONMAP_OTP_CAPACITY"),
            || Ok(DEFAULT_OTP_CAPACITY),
        )?;
        let token_ttl = secs_or(
            "LESSONMAP_TOKEN_TTL_SECS",
            get("LESSONMAP_TOKEN_TTL_SECS"),
            DEFAULT_TOKEN_TTL,
        )?;
        let otp_ttl = secs_or(
            "LESSONMAP_OTP_TTL_SECS",
            get("LESSONMAP_OTP_TTL_SECS"),
            DEFAULT_OTP_TTL,
        )?;
        let durability = if flag("LESSONMAP_DURABLE_WRITES", get("LESSONMAP_DURABLE_WRITES"))? {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        let framing = if flag("LESSONMAP_STREAM_NEWLINES", get("LESSONMAP_STREAM_NEWLINES"))? {
            Framing::NewlinePerFragment
        } else {
            Framing::Raw
        };

        Ok(Self {
            bind,
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            default_model: get("LESSONMAP_DEFAULT_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            jwt_secret,
            token_ttl,
            otp_ttl,
            otp_capacity,
            data_dir: get("LESSONMAP_DATA_DIR").map(PathBuf::from),
            durability,
            framing,
        })
    }
}

fn parse_or<T>(
    var: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> Result<T, ()>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::Invalid {
            var,
            reason: err.to_string(),
            value,
        }),
        None => default().map_err(|()| ConfigError::Invalid {
            var,
            value: String::new(),
            reason: "invalid built-in default".to_owned(),
        }),
    }
}

fn secs_or(
    var: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_or(var, raw, || Ok(default.as_secs()))?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var,
            value: "0".to_owned(),
            reason: "must be positive".to_owned(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn flag(var: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(_) => Err(ConfigError::Invalid {
            var,
            value: raw.unwrap_or_default(),
            reason: "expected true or false".to_owned(),
        }),
    }
}
