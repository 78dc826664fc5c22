// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Builds dates, weighed ingredient lines, catalogs, and small recipe arenas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `mise_cost`
//!
//! Fixture builders used across the integration tests to keep recipe setup
//! short and readable.

use std::sync::Once;

use chrono::NaiveDate;
use mise_cost::core::models::{
    Ingredient, IngredientId, IngredientLine, Preparation, ProcessStage, Recipe, StageWeights,
};
use mise_cost::core::units::Unit;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Weights of a line that goes in raw and comes out unchanged
pub fn raw(weight: f64) -> StageWeights {
    StageWeights {
        thawed: Some(weight),
        ..StageWeights::default()
    }
}

/// Weights of a line thawed from `frozen` down to `thawed`
pub fn thawed(frozen: f64, thawed: f64) -> StageWeights {
    StageWeights {
        frozen: Some(frozen),
        thawed: Some(thawed),
        ..StageWeights::default()
    }
}

/// Weights of a line cleaned from `raw` down to `clean`
pub fn cleaned(raw: f64, clean: f64) -> StageWeights {
    StageWeights {
        thawed: Some(raw),
        clean: Some(clean),
        ..StageWeights::default()
    }
}

/// A kilogram-priced line for `ingredient`
pub fn kg_line(ingredient: &Ingredient, weights: StageWeights, price_per_kg: f64) -> IngredientLine {
    IngredientLine::new(ingredient.id, weights, price_per_kg).with_name(ingredient.name.clone())
}

/// A kilogram-priced line for an ingredient outside any catalog
pub fn loose_line(name: &str, weights: StageWeights, price_per_kg: f64) -> IngredientLine {
    IngredientLine::new(IngredientId::new(), weights, price_per_kg).with_name(name)
}

pub fn kg_ingredient(name: &str, current_price: f64) -> Ingredient {
    Ingredient::new(name, Unit::Kilogram, current_price)
}

/// Recipe with one preparation holding `lines`
pub fn single_preparation_recipe(
    name: &str,
    stages: Vec<ProcessStage>,
    lines: Vec<IngredientLine>,
) -> Recipe {
    let preparation = lines
        .into_iter()
        .fold(Preparation::new(format!("{name} base"), stages), Preparation::with_ingredient);
    Recipe::new(name).with_preparation(preparation)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
