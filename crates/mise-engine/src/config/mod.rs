// ABOUTME: Engine configuration: validation tolerances, series sampling, and entity resolution
// ABOUTME: Defaults from mise-core constants, environment overrides, validation, and a global instance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Engine Configuration
//!
//! Environment-only configuration. `EngineConfig::load()` starts from the
//! defaults, applies `MISE_*` overrides and validates the result.
//!
//! | Variable | Field |
//! |---|---|
//! | `MISE_WEIGHT_TOLERANCE_KG` | `validation.weight_tolerance_kg` |
//! | `MISE_COST_RAW_TOLERANCE_PCT` | `validation.cost_per_kg_raw_tolerance_pct` |
//! | `MISE_COST_YIELD_TOLERANCE_PCT` | `validation.cost_per_kg_yield_tolerance_pct` |
//! | `MISE_STAGE_GAIN_TOLERANCE_PCT` | `validation.stage_gain_tolerance_pct` |
//! | `MISE_SUB_COMPONENT_TOLERANCE_PCT` | `validation.sub_component_tolerance_pct` |
//! | `MISE_SAMPLE_INTERVAL_DAYS` | `series.sample_interval_days` |
//! | `MISE_FUZZY_MIN_HINT_LEN` | `resolution.fuzzy_min_hint_len` |

/// Configuration error types
pub mod error;

pub use error::ConfigError;

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use mise_core::constants::{resolution, series, validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tolerances applied by the recipe validator and the yield chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Absolute weight drift (kg) that counts as an error
    pub weight_tolerance_kg: f64,
    /// Relative cost-per-kg-raw drift (%) that counts as an error
    pub cost_per_kg_raw_tolerance_pct: f64,
    /// Relative cost-per-kg-yield drift (%) that counts as a warning
    pub cost_per_kg_yield_tolerance_pct: f64,
    /// Mass gain (%) a single stage may show before it is flagged
    pub stage_gain_tolerance_pct: f64,
    /// Relative drift (%) of cached sub-component figures that is flagged
    pub sub_component_tolerance_pct: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            weight_tolerance_kg: validation::WEIGHT_TOLERANCE_KG,
            cost_per_kg_raw_tolerance_pct: validation::COST_PER_KG_RAW_TOLERANCE_PCT,
            cost_per_kg_yield_tolerance_pct: validation::COST_PER_KG_YIELD_TOLERANCE_PCT,
            stage_gain_tolerance_pct: validation::STAGE_GAIN_TOLERANCE_PCT,
            sub_component_tolerance_pct: validation::SUB_COMPONENT_DRIFT_TOLERANCE_PCT,
        }
    }
}

/// Cost series sampling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Days between consecutive samples
    pub sample_interval_days: u32,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            sample_interval_days: series::SAMPLE_INTERVAL_DAYS,
        }
    }
}

/// Entity resolution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Shortest contained name a substring match accepts
    pub fuzzy_min_hint_len: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            fuzzy_min_hint_len: resolution::FUZZY_MIN_HINT_LEN,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Validation tolerances
    pub validation: ValidationConfig,
    /// Series sampling
    pub series: SeriesConfig,
    /// Entity resolution
    pub resolution: ResolutionConfig,
}

/// Global configuration singleton
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

impl EngineConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        ENGINE_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load engine config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup` (the environment in production)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` when an override cannot be parsed
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(
            &lookup,
            "MISE_WEIGHT_TOLERANCE_KG",
            &mut self.validation.weight_tolerance_kg,
        )?;
        override_from(
            &lookup,
            "MISE_COST_RAW_TOLERANCE_PCT",
            &mut self.validation.cost_per_kg_raw_tolerance_pct,
        )?;
        override_from(
            &lookup,
            "MISE_COST_YIELD_TOLERANCE_PCT",
            &mut self.validation.cost_per_kg_yield_tolerance_pct,
        )?;
        override_from(
            &lookup,
            "MISE_STAGE_GAIN_TOLERANCE_PCT",
            &mut self.validation.stage_gain_tolerance_pct,
        )?;
        override_from(
            &lookup,
            "MISE_SUB_COMPONENT_TOLERANCE_PCT",
            &mut self.validation.sub_component_tolerance_pct,
        )?;
        override_from(
            &lookup,
            "MISE_SAMPLE_INTERVAL_DAYS",
            &mut self.series.sample_interval_days,
        )?;
        override_from(
            &lookup,
            "MISE_FUZZY_MIN_HINT_LEN",
            &mut self.resolution.fuzzy_min_hint_len,
        )?;
        Ok(self)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error when a tolerance is negative or non-finite, or the
    /// sampling interval is outside 1..=366 days
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.validation;
        let tolerances = [
            v.weight_tolerance_kg,
            v.cost_per_kg_raw_tolerance_pct,
            v.cost_per_kg_yield_tolerance_pct,
            v.stage_gain_tolerance_pct,
            v.sub_component_tolerance_pct,
        ];
        if tolerances.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err(ConfigError::InvalidRange(
                "Validation tolerances must be finite and non-negative",
            ));
        }

        if self.series.sample_interval_days == 0 || self.series.sample_interval_days > 366 {
            return Err(ConfigError::ValueOutOfRange(
                "Sample interval must be between 1 and 366 days",
            ));
        }

        if self.resolution.fuzzy_min_hint_len == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "Fuzzy hint length must be at least 1 character",
            ));
        }

        Ok(())
    }
}

fn override_from<F, T>(lookup: &F, name: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(val) = lookup(name) {
        *target = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse(format!("Invalid {name}")))?;
    }
    Ok(())
}
