// ABOUTME: Benchmark fixtures generating catalogs, price logs, and recipe arenas
// ABOUTME: Deterministic data so repeated runs measure the same workload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Benchmark fixtures for generating realistic kitchen data.
//!
//! Provides deterministic data generation for reproducible performance measurements.

use chrono::{Days, NaiveDate};
use mise_cost::core::models::{
    Ingredient, IngredientLine, Preparation, PriceEvent, ProcessStage, Recipe, StageWeights,
    SubComponentLine,
};
use mise_cost::core::units::Unit;

/// Predefined kitchen sizes for benchmark scenarios
#[derive(Debug, Clone, Copy)]
pub enum KitchenSize {
    /// Small kitchen (20 recipes) - quick benchmarks
    Small,
    /// Medium kitchen (200 recipes) - typical restaurant group
    Medium,
}

impl KitchenSize {
    #[must_use]
    pub const fn recipes(self) -> usize {
        match self {
            Self::Small => 20,
            Self::Medium => 200,
        }
    }

    #[must_use]
    pub const fn ingredients(self) -> usize {
        match self {
            Self::Small => 40,
            Self::Medium => 300,
        }
    }
}

/// Catalog, price log, and recipes generated together
pub struct Kitchen {
    pub catalog: Vec<Ingredient>,
    pub log: Vec<PriceEvent>,
    pub recipes: Vec<Recipe>,
    pub today: NaiveDate,
}

/// Generate a kitchen of the given size with a year of weekly price events
#[must_use]
pub fn generate_kitchen(size: KitchenSize) -> Kitchen {
    let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
    let catalog = generate_catalog(size.ingredients());
    let log = generate_price_log(&catalog, 52, today);
    let recipes = (0..size.recipes())
        .map(|index| generate_recipe(index, &catalog))
        .collect();
    Kitchen {
        catalog,
        log,
        recipes,
        today,
    }
}

#[allow(clippy::cast_precision_loss)]
fn generate_catalog(count: usize) -> Vec<Ingredient> {
    (0..count)
        .map(|index| {
            let price = 2.0 + ((index * 37) % 400) as f64 / 10.0;
            Ingredient::new(format!("Ingredient {index:03}"), Unit::Kilogram, price)
        })
        .collect()
}

/// Weekly events per ingredient ending at `today`; every third one keyed by name only
#[allow(clippy::cast_precision_loss)]
fn generate_price_log(catalog: &[Ingredient], weeks: u64, today: NaiveDate) -> Vec<PriceEvent> {
    let mut log = Vec::with_capacity(catalog.len() * weeks as usize);
    for week in 0..weeks {
        let date = today
            .checked_sub_days(Days::new((weeks - week) * 7))
            .unwrap_or(today);
        for (index, ingredient) in catalog.iter().enumerate() {
            let drift = 1.0 + (((index + week as usize) * 13) % 21) as f64 / 100.0 - 0.1;
            let price = ingredient.current_price * drift;
            let event = if index % 3 == 0 {
                PriceEvent::for_name(ingredient.name.to_lowercase(), date, price)
            } else {
                PriceEvent::for_id(ingredient.id, date, price)
            };
            let supplier = ["Acme", "Bolt", "Market"][(index + week as usize) % 3];
            log.push(event.with_supplier(supplier));
        }
    }
    log
}

#[allow(clippy::cast_precision_loss)]
fn weighed_line(ingredient: &Ingredient, seed: usize) -> IngredientLine {
    let raw = 0.5 + (seed % 20) as f64 / 10.0;
    let weights = StageWeights {
        thawed: Some(raw),
        clean: Some(raw * 0.9),
        cooked: Some(raw * 0.7),
        ..StageWeights::default()
    };
    IngredientLine::new(ingredient.id, weights, ingredient.current_price)
        .with_name(ingredient.name.clone())
}

/// A recipe whose final preparation consumes part of a cooked base
fn generate_recipe(index: usize, catalog: &[Ingredient]) -> Recipe {
    let pick = |offset: usize| &catalog[(index * 7 + offset * 11) % catalog.len()];

    let base = (0..4).fold(
        Preparation::new("Base", vec![ProcessStage::Clean, ProcessStage::Cook]),
        |prep, offset| prep.with_ingredient(weighed_line(pick(offset), index + offset)),
    );
    let finish = Preparation::new("Finish", vec![ProcessStage::Assemble])
        .with_ingredient(weighed_line(pick(4), index))
        .with_ingredient(weighed_line(pick(5), index + 1))
        .with_sub_component(SubComponentLine::partial(base.id, 1.0));

    Recipe::new(format!("Recipe {index:03}"))
        .with_preparation(base)
        .with_preparation(finish)
}
