// ABOUTME: Parallel batch analytics over many recipes using rayon
// ABOUTME: Structural failures abort only their own recipe and are reported next to the results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use chrono::NaiveDate;
use mise_core::errors::{ErrorCode, StructuralError};
use mise_core::models::{Recipe, RecipeId};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::series::{SeriesBuilder, SeriesWindow};
use crate::validator::{RecipeValidator, ValidationReport};
use crate::volatility::StepVolatility;

/// A recipe the batch could not evaluate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Recipe
    pub recipe_id: RecipeId,
    /// Recipe name
    pub recipe_name: String,
    /// Stable error code
    pub code: ErrorCode,
    /// Error message
    pub message: String,
    /// Underlying error
    #[serde(skip)]
    pub error: StructuralError,
}

impl BatchFailure {
    fn new(recipe: &Recipe, error: StructuralError) -> Self {
        Self {
            recipe_id: recipe.id,
            recipe_name: recipe.name.clone(),
            code: error.code(),
            message: error.to_string(),
            error,
        }
    }
}

/// Per-recipe outcomes of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport<T> {
    /// Successful results
    pub results: Vec<T>,
    /// Recipes that failed structurally, by name
    pub failures: Vec<BatchFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    fn merge(mut self, other: Self) -> Self {
        self.results.extend(other.results);
        self.failures.extend(other.failures);
        self
    }

    fn push(mut self, recipe: &Recipe, outcome: Result<T, StructuralError>) -> Self {
        match outcome {
            Ok(result) => self.results.push(result),
            Err(error) => {
                warn!(recipe = %recipe.id, error = %error, "Recipe skipped in batch");
                self.failures.push(BatchFailure::new(recipe, error));
            }
        }
        self
    }
}

/// Volatility summary of one recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeVolatility {
    /// Recipe
    pub recipe_id: RecipeId,
    /// Recipe name
    pub recipe_name: String,
    /// Mean absolute step change of the cost series
    pub step_volatility: StepVolatility,
    /// Signed change over the window, percent
    pub net_change_pct: f64,
    /// Cost at the last sample
    pub latest_cost: f64,
}

fn run<T, F>(recipes: &[Recipe], evaluate: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&Recipe) -> Result<T, StructuralError> + Sync,
{
    let mut report = recipes
        .par_iter()
        .fold(BatchReport::default, |report, recipe| {
            report.push(recipe, evaluate(recipe))
        })
        .reduce(BatchReport::default, BatchReport::merge);
    report
        .failures
        .sort_by(|a, b| a.recipe_name.cmp(&b.recipe_name));
    report
}

/// Rank recipes by step volatility of their cost series, most volatile first
#[must_use]
pub fn rank_recipes_by_volatility(
    builder: &SeriesBuilder<'_, '_>,
    recipes: &[Recipe],
    window: SeriesWindow,
    today: NaiveDate,
) -> BatchReport<RecipeVolatility> {
    let mut report = run(recipes, |recipe| {
        let series = builder.build_cost_series(recipe, window, today)?;
        Ok(RecipeVolatility {
            recipe_id: recipe.id,
            recipe_name: recipe.name.clone(),
            step_volatility: series.step_volatility,
            net_change_pct: series.net_change_pct,
            latest_cost: series.latest().map_or(0.0, |s| s.value),
        })
    });
    report.results.sort_by(|a, b| {
        b.step_volatility
            .value()
            .total_cmp(&a.step_volatility.value())
            .then_with(|| a.recipe_name.cmp(&b.recipe_name))
    });
    info!(
        ranked = report.results.len(),
        failed = report.failures.len(),
        "Ranked recipes by volatility"
    );
    report
}

/// Validate every recipe, in input order
#[must_use]
pub fn validate_all(validator: &RecipeValidator, recipes: &[Recipe]) -> BatchReport<ValidationReport> {
    let mut report = run(recipes, |recipe| validator.validate(recipe));
    let position = |id: RecipeId| recipes.iter().position(|r| r.id == id);
    report.results.sort_by_key(|r| position(r.recipe_id));
    info!(
        validated = report.results.len(),
        failed = report.failures.len(),
        "Validated recipes"
    );
    report
}
