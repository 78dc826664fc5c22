// ABOUTME: Cost series reconstruction for recipes and ingredients from the price event log
// ABOUTME: Fixed-interval sampling over a trailing window with today always the final sample
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Cost Series
//!
//! A series samples a value every `sample_interval_days` from the start of a
//! trailing window up to `today`. `today` is always the last sample, even
//! when it does not fall on the interval. Recipe series cost the whole recipe
//! at each date with [`PricesAsOf`]; ingredient series take the ingredient's
//! price as of each date.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use mise_core::errors::{ErrorCode, StructuralError};
use mise_core::models::{IngredientId, Recipe};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composition::CompositionAggregator;
use crate::config::EngineConfig;
use crate::history::PriceIndex;
use crate::issues::Issue;
use crate::pricing::PricesAsOf;
use crate::volatility::{net_change_pct, pct_change, StepVolatility};

/// Trailing window a series covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesWindow {
    /// Last 7 days
    #[serde(rename = "1w")]
    LastWeek,
    /// Last calendar month
    #[serde(rename = "1m")]
    OneMonth,
    /// Last 3 calendar months
    #[serde(rename = "3m")]
    ThreeMonths,
    /// Last 6 calendar months
    #[serde(rename = "6m")]
    SixMonths,
    /// Last 12 calendar months
    #[serde(rename = "12m")]
    TwelveMonths,
}

impl SeriesWindow {
    /// Every window, shortest first
    pub const ALL: [Self; 5] = [
        Self::LastWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::TwelveMonths,
    ];

    /// Short code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LastWeek => "1w",
            Self::OneMonth => "1m",
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::TwelveMonths => "12m",
        }
    }

    /// First day of the window ending on `today`
    #[must_use]
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        let start = match self {
            Self::LastWeek => today.checked_sub_days(Days::new(7)),
            Self::OneMonth => today.checked_sub_months(Months::new(1)),
            Self::ThreeMonths => today.checked_sub_months(Months::new(3)),
            Self::SixMonths => today.checked_sub_months(Months::new(6)),
            Self::TwelveMonths => today.checked_sub_months(Months::new(12)),
        };
        start.unwrap_or(today)
    }
}

impl fmt::Display for SeriesWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SeriesWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1w" | "week" => Ok(Self::LastWeek),
            "1m" | "month" => Ok(Self::OneMonth),
            "3m" => Ok(Self::ThreeMonths),
            "6m" => Ok(Self::SixMonths),
            "12m" | "1y" | "year" => Ok(Self::TwelveMonths),
            other => Err(format!("Unknown window: {other} (expected 1w, 1m, 3m, 6m, 12m)")),
        }
    }
}

/// Sample dates from `start` to `today` every `interval_days`, `today` last
#[must_use]
pub fn sample_dates(start: NaiveDate, today: NaiveDate, interval_days: u32) -> Vec<NaiveDate> {
    let step = Days::new(u64::from(interval_days.max(1)));
    let mut dates = Vec::new();
    let mut current = Some(start);
    while let Some(date) = current.filter(|d| *d < today) {
        dates.push(date);
        current = date.checked_add_days(step);
    }
    dates.push(today);
    dates
}

/// One point of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSample {
    /// Sample date
    pub date: NaiveDate,
    /// Cost or price at that date
    pub value: f64,
    /// Change from the previous sample, percent; undefined from zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<f64>,
}

/// A sampled series with its derived measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSeries {
    /// Window covered
    pub window: SeriesWindow,
    /// Samples, oldest first
    pub samples: Vec<SeriesSample>,
    /// Mean absolute step change
    pub step_volatility: StepVolatility,
    /// Signed change first to last sample, percent
    pub net_change_pct: f64,
    /// Data gaps met while sampling
    pub issues: Vec<Issue>,
}

impl CostSeries {
    fn from_values(window: SeriesWindow, points: Vec<(NaiveDate, f64)>, issues: Vec<Issue>) -> Self {
        let mut samples: Vec<SeriesSample> = Vec::with_capacity(points.len());
        for (date, value) in points {
            let pct_change = samples.last().and_then(|prev| pct_change(prev.value, value));
            samples.push(SeriesSample {
                date,
                value,
                pct_change,
            });
        }

        let step_volatility = StepVolatility::from_changes(samples.iter().map(|s| s.pct_change));
        let net_change_pct = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => net_change_pct(first.value, last.value),
            _ => 0.0,
        };

        Self {
            window,
            samples,
            step_volatility,
            net_change_pct,
            issues,
        }
    }

    /// Most recent sample
    #[must_use]
    pub fn latest(&self) -> Option<&SeriesSample> {
        self.samples.last()
    }
}

/// Builds recipe and ingredient series over one price index
#[derive(Debug, Clone, Copy)]
pub struct SeriesBuilder<'i, 'a> {
    index: &'i PriceIndex<'a>,
    aggregator: CompositionAggregator,
    sample_interval_days: u32,
}

impl<'i, 'a> SeriesBuilder<'i, 'a> {
    /// Create a builder with the given configuration
    #[must_use]
    pub const fn new(index: &'i PriceIndex<'a>, config: &EngineConfig) -> Self {
        Self {
            index,
            aggregator: CompositionAggregator::new(&config.validation),
            sample_interval_days: config.series.sample_interval_days,
        }
    }

    /// Price index in use
    #[must_use]
    pub const fn index(&self) -> &'i PriceIndex<'a> {
        self.index
    }

    /// Cost of a recipe with every line priced as of `date`
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] when the recipe cannot be evaluated.
    pub fn recipe_cost_as_of(&self, recipe: &Recipe, date: NaiveDate) -> Result<f64, StructuralError> {
        let prices = PricesAsOf::new(self.index, date);
        Ok(self
            .aggregator
            .compute_recipe_totals(recipe, &prices)?
            .total_cost)
    }

    /// Sampled cost of a recipe over `window`
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] when the recipe cannot be evaluated.
    pub fn build_cost_series(
        &self,
        recipe: &Recipe,
        window: SeriesWindow,
        today: NaiveDate,
    ) -> Result<CostSeries, StructuralError> {
        let dates = sample_dates(window.start(today), today, self.sample_interval_days);
        let mut points = Vec::with_capacity(dates.len());
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for date in dates {
            let totals = self
                .aggregator
                .compute_recipe_totals(recipe, &PricesAsOf::new(self.index, date))?;
            for issue in totals.issues {
                if seen.insert((issue.code, issue.message.clone())) {
                    issues.push(issue);
                }
            }
            points.push((date, totals.total_cost));
        }

        let mut missing_history = HashSet::new();
        for line in recipe.ingredient_lines() {
            if self.index.events_for(line.ingredient_id).is_empty()
                && missing_history.insert(line.ingredient_id)
            {
                let name = line.ingredient_name.as_deref().unwrap_or("ingredient");
                issues.push(
                    Issue::data_gap(
                        ErrorCode::MissingPriceHistory,
                        format!("'{name}' has no price history, series uses its current price"),
                    )
                    .with_ingredient(line.ingredient_id),
                );
            }
        }

        debug!(recipe = %recipe.id, window = %window, samples = points.len(), "Built cost series");
        Ok(CostSeries::from_values(window, points, issues))
    }

    /// Sampled price of one ingredient over `window`
    ///
    /// Returns `None` when the ingredient is not in the catalog.
    #[must_use]
    pub fn build_ingredient_series(
        &self,
        ingredient_id: IngredientId,
        window: SeriesWindow,
        today: NaiveDate,
    ) -> Option<CostSeries> {
        let ingredient = self.index.ingredient(ingredient_id)?;
        let points = sample_dates(window.start(today), today, self.sample_interval_days)
            .into_iter()
            .filter_map(|date| {
                self.index
                    .price_as_of(ingredient_id, date)
                    .map(|p| (date, p.price))
            })
            .collect();

        let issues = if self.index.events_for(ingredient_id).is_empty() {
            vec![Issue::data_gap(
                ErrorCode::MissingPriceHistory,
                format!("'{}' has no price history, series uses its current price", ingredient.name),
            )
            .with_ingredient(ingredient_id)]
        } else {
            Vec::new()
        };

        Some(CostSeries::from_values(window, points, issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sample_dates_forces_today_last() {
        let dates = sample_dates(date(2024, 1, 1), date(2024, 1, 20), 7);
        assert_eq!(
            dates,
            vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15), date(2024, 1, 20)]
        );
    }

    #[test]
    fn test_sample_dates_does_not_duplicate_today() {
        let dates = sample_dates(date(2024, 1, 1), date(2024, 1, 15), 7);
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 8), date(2024, 1, 15)]);
        assert_eq!(sample_dates(date(2024, 2, 1), date(2024, 1, 1), 7), vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_window_start_uses_calendar_months() {
        assert_eq!(SeriesWindow::LastWeek.start(date(2024, 3, 10)), date(2024, 3, 3));
        assert_eq!(SeriesWindow::OneMonth.start(date(2024, 3, 31)), date(2024, 2, 29));
        assert_eq!(SeriesWindow::TwelveMonths.start(date(2024, 3, 10)), date(2023, 3, 10));
    }

    #[test]
    fn test_window_parses_codes() {
        assert_eq!("3M".parse::<SeriesWindow>(), Ok(SeriesWindow::ThreeMonths));
        assert!("2w".parse::<SeriesWindow>().is_err());
    }
}
