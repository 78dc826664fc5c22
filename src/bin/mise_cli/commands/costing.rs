// ABOUTME: Recipe costing commands for mise-cli
// ABOUTME: Handles totals, validate, impact, and volatility ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use anyhow::Result;
use mise_engine::composition::CompositionAggregator;
use mise_engine::pricing::RecordedPrices;
use mise_engine::series::{SeriesBuilder, SeriesWindow};
use mise_engine::validator::RecipeValidator;
use mise_engine::batch;
use mise_engine::impact::ingredient_impact;
use tracing::info;

use super::Context;

/// Recompute one recipe's totals at its recorded prices
pub fn totals(ctx: &Context<'_>, recipe: &str) -> Result<String> {
    let recipe = ctx.snapshot.resolve_recipe(recipe, &ctx.engine)?;
    let aggregator = CompositionAggregator::new(&ctx.engine.validation);
    let totals = aggregator.compute_recipe_totals(recipe, &RecordedPrices)?;
    ctx.render(&totals)
}

/// Validate one recipe, or all of them in parallel
pub fn validate(ctx: &Context<'_>, recipe: Option<&str>) -> Result<String> {
    let validator = RecipeValidator::new(ctx.engine.validation);
    match recipe {
        Some(reference) => {
            let recipe = ctx.snapshot.resolve_recipe(reference, &ctx.engine)?;
            let report = validator.validate(recipe)?;
            ctx.render(&report)
        }
        None => {
            let report = batch::validate_all(&validator, &ctx.snapshot.recipes);
            info!(
                recipes = report.results.len(),
                failures = report.failures.len(),
                "Validation finished"
            );
            ctx.render(&report)
        }
    }
}

/// Ingredient contribution and cost impact for one recipe
pub fn impact(ctx: &Context<'_>, recipe: &str, window: SeriesWindow) -> Result<String> {
    let recipe = ctx.snapshot.resolve_recipe(recipe, &ctx.engine)?;
    let aggregator = CompositionAggregator::new(&ctx.engine.validation);
    let report = ingredient_impact(&aggregator, &ctx.index, recipe, window, ctx.today)?;
    ctx.render(&report)
}

/// Rank every recipe by step volatility
pub fn rank(ctx: &Context<'_>, window: SeriesWindow) -> Result<String> {
    let builder = SeriesBuilder::new(&ctx.index, &ctx.engine);
    let report = batch::rank_recipes_by_volatility(&builder, &ctx.snapshot.recipes, window, ctx.today);
    ctx.render(&report)
}
