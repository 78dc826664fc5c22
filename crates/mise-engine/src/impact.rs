// ABOUTME: Ingredient contribution and cost impact analysis for one recipe
// ABOUTME: Combines current-price cost shares with each ingredient's price change over a trailing window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Ingredient Impact
//!
//! First-order attribution of a recipe's cost drift to its ingredients:
//!
//! - `contribution_pct`: the ingredient's share of the recipe cost at current prices
//! - `price_change_pct`: newest over oldest event price inside the window
//! - `cost_impact_pct`: `price_change_pct * contribution_pct / 100`

use std::collections::HashMap;

use chrono::NaiveDate;
use mise_core::constants::EPSILON;
use mise_core::errors::StructuralError;
use mise_core::models::{IngredientId, Recipe, RecipeId};
use serde::{Deserialize, Serialize};

use crate::composition::CompositionAggregator;
use crate::history::PriceIndex;
use crate::issues::Issue;
use crate::pricing::CurrentPrices;
use crate::series::SeriesWindow;

/// One ingredient's impact on a recipe's cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientImpact {
    /// Ingredient
    pub ingredient_id: IngredientId,
    /// Catalog name, else the name on the recipe card
    pub ingredient_name: String,
    /// Cost of the ingredient's lines at current prices
    pub line_cost: f64,
    /// Share of the recipe cost, percent
    pub contribution_pct: f64,
    /// Price change over the window, percent
    pub price_change_pct: f64,
    /// Attributed recipe cost change, percent
    pub cost_impact_pct: f64,
}

/// Impact of every ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Recipe
    pub recipe_id: RecipeId,
    /// Recipe cost at current prices
    pub total_cost: f64,
    /// Trailing window of the price changes
    pub window: SeriesWindow,
    /// Impacts, largest absolute impact first
    pub impacts: Vec<IngredientImpact>,
    /// Data gaps met while costing
    pub issues: Vec<Issue>,
}

/// Price change of an ingredient between its oldest and newest event in `[from, to]`
///
/// Zero with fewer than two events or a zero oldest price.
#[must_use]
pub fn window_price_change(
    index: &PriceIndex<'_>,
    ingredient_id: IngredientId,
    from: NaiveDate,
    to: NaiveDate,
) -> f64 {
    match index.events_between(ingredient_id, from, to) {
        [oldest, .., newest] if oldest.new_price.abs() > EPSILON => {
            (newest.new_price - oldest.new_price) / oldest.new_price * 100.0
        }
        _ => 0.0,
    }
}

/// Attribute a recipe's cost drift to its ingredients
///
/// # Errors
///
/// Returns a [`StructuralError`] when the recipe cannot be evaluated.
pub fn ingredient_impact(
    aggregator: &CompositionAggregator,
    index: &PriceIndex<'_>,
    recipe: &Recipe,
    window: SeriesWindow,
    today: NaiveDate,
) -> Result<ImpactReport, StructuralError> {
    let totals = aggregator.compute_recipe_totals(recipe, &CurrentPrices::new(index.catalog()))?;
    let from = window.start(today);

    let mut order = Vec::new();
    let mut by_ingredient: HashMap<IngredientId, (String, f64)> = HashMap::new();
    for entry in &totals.breakdown {
        let slot = by_ingredient.entry(entry.ingredient_id).or_insert_with(|| {
            order.push(entry.ingredient_id);
            let name = index
                .ingredient(entry.ingredient_id)
                .map(|i| i.name.clone())
                .or_else(|| entry.ingredient_name.clone())
                .unwrap_or_else(|| entry.ingredient_id.to_string());
            (name, 0.0)
        });
        slot.1 += entry.cost;
    }

    let mut impacts: Vec<IngredientImpact> = order
        .into_iter()
        .filter_map(|id| by_ingredient.remove(&id).map(|entry| (id, entry)))
        .map(|(ingredient_id, (ingredient_name, line_cost))| {
            let contribution_pct = if totals.total_cost.abs() < EPSILON {
                0.0
            } else {
                line_cost / totals.total_cost * 100.0
            };
            let price_change_pct = window_price_change(index, ingredient_id, from, today);
            IngredientImpact {
                ingredient_id,
                ingredient_name,
                line_cost,
                contribution_pct,
                price_change_pct,
                cost_impact_pct: price_change_pct * contribution_pct / 100.0,
            }
        })
        .collect();

    impacts.sort_by(|a, b| {
        b.cost_impact_pct
            .abs()
            .total_cmp(&a.cost_impact_pct.abs())
            .then_with(|| a.ingredient_name.cmp(&b.ingredient_name))
    });

    Ok(ImpactReport {
        recipe_id: recipe.id,
        total_cost: totals.total_cost,
        window,
        impacts,
        issues: totals.issues,
    })
}
