// ABOUTME: Environment configuration for the mise-cli binary
// ABOUTME: Snapshot path, reference date, output format, and the engine tolerances
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Binary configuration
//!
//! | Variable | Meaning |
//! |---|---|
//! | `MISE_SNAPSHOT` | Path of the JSON snapshot |
//! | `MISE_TODAY` | Reference date (ISO), defaults to the current UTC date |
//! | `MISE_OUTPUT` | `text` or `json` |
//!
//! Engine tolerances come from [`EngineConfig::load`].

use std::env;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use mise_engine::config::{ConfigError, EngineConfig};

use crate::formatters::OutputFormat;

/// Configuration of one CLI run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Snapshot to load
    pub snapshot_path: Option<PathBuf>,
    /// Reference date for windows and series
    pub today: Option<NaiveDate>,
    /// Output format
    pub output: OutputFormat,
    /// Engine tolerances and sampling
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            today: None,
            output: OutputFormat::Text,
            engine: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `MISE_TODAY` or `MISE_OUTPUT` cannot be parsed, or
    /// the engine configuration is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` (the environment in production)
    ///
    /// # Errors
    ///
    /// Same conditions as [`AppConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let today = lookup("MISE_TODAY")
            .map(|v| {
                v.trim()
                    .parse::<NaiveDate>()
                    .map_err(|e| ConfigError::Parse(format!("Invalid MISE_TODAY: {e}")))
            })
            .transpose()?;
        let output = lookup("MISE_OUTPUT")
            .map(|v| v.parse::<OutputFormat>().map_err(ConfigError::Parse))
            .transpose()?
            .unwrap_or_default();

        let engine = EngineConfig::default().apply_overrides(&lookup)?;
        engine.validate()?;

        Ok(Self {
            snapshot_path: lookup("MISE_SNAPSHOT").map(PathBuf::from),
            today,
            output,
            engine,
        })
    }

    /// Reference date, today in UTC unless overridden
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}
