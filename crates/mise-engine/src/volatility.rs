// ABOUTME: Volatility measures over price and cost series
// ABOUTME: Step volatility (mean absolute step change) and dispersion volatility (coefficient of variation)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Volatility
//!
//! Two different measures share the word "volatility" and are kept apart by
//! type:
//!
//! - [`StepVolatility`]: mean absolute percentage change between consecutive
//!   samples of a cost series.
//! - [`DispersionVolatility`]: population standard deviation divided by the
//!   mean, times 100, over a set of prices.

use std::fmt;

use mise_core::constants::EPSILON;
use serde::{Deserialize, Serialize};

/// Percentage change from `previous` to `current`
///
/// `None` when `previous` is zero.
#[must_use]
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous.abs() < EPSILON {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

/// Net change of a series, first to last, in percent (0 when first is 0)
#[must_use]
pub fn net_change_pct(first: f64, last: f64) -> f64 {
    pct_change(first, last).unwrap_or(0.0)
}

/// Mean absolute step-to-step change of a series, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepVolatility(pub f64);

impl StepVolatility {
    /// From the per-step changes; undefined steps are skipped
    #[must_use]
    pub fn from_changes(changes: impl IntoIterator<Item = Option<f64>>) -> Self {
        let (sum, count) = changes
            .into_iter()
            .flatten()
            .fold((0.0, 0_usize), |(sum, count), c| (sum + c.abs(), count + 1));
        if count == 0 {
            Self(0.0)
        } else {
            Self(sum / count as f64)
        }
    }

    /// Directly from a series of values
    #[must_use]
    pub fn of(values: &[f64]) -> Self {
        Self::from_changes(values.windows(2).map(|w| pct_change(w[0], w[1])))
    }

    /// Value in percent
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for StepVolatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Coefficient of variation of a set of prices, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispersionVolatility(pub f64);

impl DispersionVolatility {
    /// Population standard deviation over mean, times 100
    ///
    /// Zero for an empty set or a zero mean.
    #[must_use]
    pub fn of(prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self(0.0);
        }
        let n = prices.len() as f64;
        let mean = prices.iter().sum::<f64>() / n;
        if mean.abs() < EPSILON {
            return Self(0.0);
        }
        let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
        Self(variance.sqrt() / mean * 100.0)
    }

    /// Value in percent
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DispersionVolatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}
