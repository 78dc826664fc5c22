// ABOUTME: Error taxonomy for the costing engines with stable error codes
// ABOUTME: StructuralError is the only fatal class; everything else degrades to issues
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Error Types
//!
//! The engines distinguish three classes of problem:
//!
//! - **Structural** (`StructuralError`): a recipe's composition graph is
//!   unusable. Fatal for that recipe only.
//! - **Data gap**: missing weights, missing history, ambiguous names, zero
//!   denominators. Resolved to a documented fallback and reported as an issue.
//! - **Inconsistency**: stored totals drifting from recomputed ones. Reported
//!   as an issue with both values.
//!
//! Only the first is an `Err`; the other two are values collected by the
//! engines. `ErrorCode` gives all three a stable string code.

mod structural;

pub use structural::StructuralError;

use serde::{Deserialize, Serialize};

/// Standard error codes used throughout the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Structural (1000-1999)
    /// Composition graph contains a cycle
    #[serde(rename = "COMPOSITION_CYCLE")]
    CompositionCycle = 1000,
    /// Sub-component references a preparation missing from the arena
    #[serde(rename = "MISSING_PREPARATION")]
    MissingPreparation = 1001,
    /// Two preparations share an identifier
    #[serde(rename = "DUPLICATE_PREPARATION")]
    DuplicatePreparation = 1002,

    // Data gaps (2000-2999)
    /// A weight needed for a figure was not recorded
    #[serde(rename = "MISSING_WEIGHT")]
    MissingWeight = 2000,
    /// No price history for the requested date
    #[serde(rename = "MISSING_PRICE_HISTORY")]
    MissingPriceHistory = 2001,
    /// A name matched several catalog entries
    #[serde(rename = "AMBIGUOUS_NAME")]
    AmbiguousName = 2002,
    /// A reference matched nothing
    #[serde(rename = "UNRESOLVED_REFERENCE")]
    UnresolvedReference = 2003,
    /// A ratio's denominator was zero
    #[serde(rename = "DIVISION_UNDEFINED")]
    DivisionUndefined = 2004,
    /// A quantity could not be converted to the price basis
    #[serde(rename = "UNIT_MISMATCH")]
    UnitMismatch = 2005,

    // Inconsistencies (3000-3999)
    /// Stored weight drifted from the recomputed weight
    #[serde(rename = "WEIGHT_DRIFT")]
    WeightDrift = 3000,
    /// Stored cost per kg drifted from the recomputed value
    #[serde(rename = "COST_DRIFT")]
    CostDrift = 3001,
    /// Yield exceeds bruto weight
    #[serde(rename = "IMPOSSIBLE_YIELD")]
    ImpossibleYield = 3002,
    /// A processing stage gained mass beyond tolerance
    #[serde(rename = "STAGE_GAIN")]
    StageGain = 3003,
    /// An ingredient line has zero initial weight
    #[serde(rename = "ZERO_WEIGHT_LINE")]
    ZeroWeightLine = 3004,
    /// Cached sub-component figure drifted from the recomputed one
    #[serde(rename = "SUB_COMPONENT_DRIFT")]
    SubComponentDrift = 3005,
    /// A parent asked for more of a sub-component than it produces
    #[serde(rename = "CONSUMED_BEYOND_OUTPUT")]
    ConsumedBeyondOutput = 3006,
    /// Parents together consume more than a sub-component's whole output
    #[serde(rename = "SUB_COMPONENT_OVER_ALLOCATED")]
    SubComponentOverAllocated = 3007,
}

impl ErrorCode {
    /// Stable code string, as serialized
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompositionCycle => "COMPOSITION_CYCLE",
            Self::MissingPreparation => "MISSING_PREPARATION",
            Self::DuplicatePreparation => "DUPLICATE_PREPARATION",
            Self::MissingWeight => "MISSING_WEIGHT",
            Self::MissingPriceHistory => "MISSING_PRICE_HISTORY",
            Self::AmbiguousName => "AMBIGUOUS_NAME",
            Self::UnresolvedReference => "UNRESOLVED_REFERENCE",
            Self::DivisionUndefined => "DIVISION_UNDEFINED",
            Self::UnitMismatch => "UNIT_MISMATCH",
            Self::WeightDrift => "WEIGHT_DRIFT",
            Self::CostDrift => "COST_DRIFT",
            Self::ImpossibleYield => "IMPOSSIBLE_YIELD",
            Self::StageGain => "STAGE_GAIN",
            Self::ZeroWeightLine => "ZERO_WEIGHT_LINE",
            Self::SubComponentDrift => "SUB_COMPONENT_DRIFT",
            Self::ConsumedBeyondOutput => "CONSUMED_BEYOND_OUTPUT",
            Self::SubComponentOverAllocated => "SUB_COMPONENT_OVER_ALLOCATED",
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CompositionCycle => "The recipe's preparations reference each other in a cycle",
            Self::MissingPreparation => "A sub-component points to a preparation that does not exist",
            Self::DuplicatePreparation => "Two preparations in the recipe share an identifier",
            Self::MissingWeight => "A weight needed for this figure was not recorded",
            Self::MissingPriceHistory => "No price history exists for the requested date",
            Self::AmbiguousName => "The name matches more than one catalog entry",
            Self::UnresolvedReference => "The reference does not match any catalog entry",
            Self::DivisionUndefined => "The figure divides by a zero weight or price",
            Self::UnitMismatch => "The quantity cannot be converted to the price unit",
            Self::WeightDrift => "The stored weight differs from the recomputed weight",
            Self::CostDrift => "The stored cost per kilogram differs from the recomputed value",
            Self::ImpossibleYield => "The yield weight exceeds the bruto weight",
            Self::StageGain => "A processing stage gained mass; check process weights",
            Self::ZeroWeightLine => "An ingredient line has zero initial weight",
            Self::SubComponentDrift => "A cached sub-component figure differs from the recomputed one",
            Self::ConsumedBeyondOutput => {
                "The consumed weight exceeds the sub-component's yield weight"
            }
            Self::SubComponentOverAllocated => {
                "Parents consume more than the sub-component's whole output"
            }
        }
    }

    /// Whether this code is the fatal structural class
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CompositionCycle | Self::MissingPreparation | Self::DuplicatePreparation
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
