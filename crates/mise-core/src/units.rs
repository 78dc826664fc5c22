// ABOUTME: Canonical unit conversion table for recipe lines and purchase prices
// ABOUTME: Converts kg/g/l/ml/unit quantities to a common base so every costing path agrees
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Unit conversion
//!
//! Every quantity in the system is expressed in one of five units. Each unit
//! belongs to a [`Dimension`] whose base unit is kilograms, liters or counted
//! units. Mass and volume interconvert at the density of water; counts never
//! convert to anything else.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::units::{GRAMS_PER_KG, KG_PER_LITER, ML_PER_LITER};

/// Conversion error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Negative or non-finite amount
    #[error("Invalid amount (must be a finite, non-negative number)")]
    InvalidAmount,
    /// The two units measure different things (count vs mass/volume)
    #[error("Cannot convert {from} to {to}")]
    Incompatible {
        /// Unit the quantity is expressed in
        from: Unit,
        /// Unit that was requested
        to: Unit,
    },
}

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Base unit: kilogram
    Mass,
    /// Base unit: liter
    Volume,
    /// Base unit: one counted item
    Count,
}

/// Measurement unit of a purchase price or a recipe line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    /// Kilograms (mass base unit)
    #[default]
    #[serde(rename = "kg", alias = "kilogram", alias = "kilograms")]
    Kilogram,
    /// Grams
    #[serde(rename = "g", alias = "gram", alias = "grams")]
    Gram,
    /// Liters (volume base unit)
    #[serde(rename = "l", alias = "liter", alias = "liters", alias = "L")]
    Liter,
    /// Milliliters
    #[serde(rename = "ml", alias = "milliliter", alias = "milliliters", alias = "mL")]
    Milliliter,
    /// Counted items (count base unit)
    #[serde(rename = "unit", alias = "each", alias = "un", alias = "units")]
    Each,
}

impl Unit {
    /// Dimension this unit measures
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::Kilogram | Self::Gram => Dimension::Mass,
            Self::Liter | Self::Milliliter => Dimension::Volume,
            Self::Each => Dimension::Count,
        }
    }

    /// How many base units one of this unit is worth
    #[must_use]
    pub const fn base_factor(self) -> f64 {
        match self {
            Self::Kilogram | Self::Liter | Self::Each => 1.0,
            Self::Gram => 1.0 / GRAMS_PER_KG,
            Self::Milliliter => 1.0 / ML_PER_LITER,
        }
    }

    /// Base unit of this unit's dimension
    #[must_use]
    pub const fn base(self) -> Self {
        match self.dimension() {
            Dimension::Mass => Self::Kilogram,
            Dimension::Volume => Self::Liter,
            Dimension::Count => Self::Each,
        }
    }

    /// Abbreviation for display
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Liter => "l",
            Self::Milliliter => "ml",
            Self::Each => "unit",
        }
    }

    /// Whether quantities of this unit can be summed into kilogram weight totals
    #[must_use]
    pub const fn is_weighable(self) -> bool {
        !matches!(self.dimension(), Dimension::Count)
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" | "kilo" => Ok(Self::Kilogram),
            "g" | "gr" | "gram" | "grams" => Ok(Self::Gram),
            "l" | "lt" | "liter" | "liters" | "litre" => Ok(Self::Liter),
            "ml" | "milliliter" | "milliliters" => Ok(Self::Milliliter),
            "unit" | "units" | "un" | "each" | "pc" => Ok(Self::Each),
            other => Err(format!("Unknown unit: {other}")),
        }
    }
}

/// Convert a quantity between two units
///
/// Same-dimension conversions scale through the base unit. Mass and volume
/// interconvert at [`KG_PER_LITER`]. Counts only convert to counts.
///
/// # Errors
///
/// Returns `ConversionError::InvalidAmount` for negative or non-finite amounts
/// and `ConversionError::Incompatible` when one side is a count and the other
/// is not.
///
/// # Examples
///
/// ```rust
/// use mise_core::units::{convert, Unit};
///
/// assert_eq!(convert(500.0, Unit::Gram, Unit::Kilogram), Ok(0.5));
/// assert!(convert(2.0, Unit::Each, Unit::Kilogram).is_err());
/// ```
pub fn convert(amount: f64, from: Unit, to: Unit) -> Result<f64, ConversionError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConversionError::InvalidAmount);
    }

    let in_base = amount * from.base_factor();
    let bridged = match (from.dimension(), to.dimension()) {
        (a, b) if a == b => in_base,
        (Dimension::Mass, Dimension::Volume) => in_base / KG_PER_LITER,
        (Dimension::Volume, Dimension::Mass) => in_base * KG_PER_LITER,
        _ => return Err(ConversionError::Incompatible { from, to }),
    };

    Ok(bridged / to.base_factor())
}

/// Convert a quantity to kilograms (volumes at water density)
///
/// # Errors
///
/// Same conditions as [`convert`]; counted units cannot be weighed.
pub fn to_kilograms(amount: f64, unit: Unit) -> Result<f64, ConversionError> {
    convert(amount, unit, Unit::Kilogram)
}
