//! Destination coordinates read from the process environment.
//!
//! Variables may come from the real environment or from a `.env` file loaded
//! with `dotenvy`; values already set in the environment win.

use std::{env, path::Path};

use anyhow::{Context, Result};
use log::debug;
use thiserror::Error;

pub const USERNAME_VAR: &str = "username";
pub const PASSWORD_VAR: &str = "password";
pub const HOST_VAR: &str = "host";
pub const PORT_VAR: &str = "port";
pub const DATABASE_VAR: &str = "database";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable '{0}' is not set")]
    Missing(&'static str),
    #[error("environment variable '{var}' has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("username", &self.username)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}

impl DbSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let username = require(USERNAME_VAR)?;
        let password = require(PASSWORD_VAR)?;
        let host = require(HOST_VAR)?;
        let port_raw = require(PORT_VAR)?;
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid {
                var: PORT_VAR,
                value: port_raw.clone(),
            })?;
        Ok(Self {
            username,
            password,
            host,
            port,
            database: require(DATABASE_VAR)?,
        })
    }

    pub fn to_pg_config(&self) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .user(&self.username)
            .password(&self.password)
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database);
        config
    }
}

/// Loads `path` when given, otherwise a `.env` in the working directory if
/// one exists.
pub fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).with_context(|| format!("Loading env file {path:?}"))?;
            debug!("Loaded environment from {path:?}");
        }
        None => {
            if let Ok(found) = dotenvy::dotenv() {
                debug!("Loaded environment from {found:?}");
            }
        }
    }
    Ok(())
}
