// ABOUTME: Conversion factors and default tolerances shared by the costing engines
// ABOUTME: Pure data constants grouped by domain (units, validation, series sampling)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Constants module
//!
//! Engine defaults live here so the configuration layer and the tests agree on
//! the same numbers.

/// Unit conversion factors
pub mod units {
    /// Grams in one kilogram
    pub const GRAMS_PER_KG: f64 = 1000.0;
    /// Milliliters in one liter
    pub const ML_PER_LITER: f64 = 1000.0;
    /// Kilograms per liter used when a mass line meets a volume price (water density)
    pub const KG_PER_LITER: f64 = 1.0;
}

/// Default tolerances for recipe validation
pub mod validation {
    /// Absolute weight drift (kg) above which stored weights are an error
    pub const WEIGHT_TOLERANCE_KG: f64 = 0.1;
    /// Relative cost-per-kg-raw drift (%) above which stored cost is an error
    pub const COST_PER_KG_RAW_TOLERANCE_PCT: f64 = 5.0;
    /// Relative cost-per-kg-yield drift (%) above which stored cost is a warning
    pub const COST_PER_KG_YIELD_TOLERANCE_PCT: f64 = 10.0;
    /// Mass a single stage may gain (%) before the weights are flagged
    pub const STAGE_GAIN_TOLERANCE_PCT: f64 = 5.0;
    /// Relative drift (%) between a cached sub-component figure and the recomputed one
    pub const SUB_COMPONENT_DRIFT_TOLERANCE_PCT: f64 = 1.0;
}

/// Default settings for cost series sampling
pub mod series {
    /// Days between consecutive samples of a cost series
    pub const SAMPLE_INTERVAL_DAYS: u32 = 7;
}

/// Default settings for entity resolution
pub mod resolution {
    /// Shortest contained name (in characters) a substring match accepts
    ///
    /// At 1 every non-empty containment counts.
    pub const FUZZY_MIN_HINT_LEN: usize = 1;
}

/// Floating point comparisons on money and weights
pub const EPSILON: f64 = 1e-9;
