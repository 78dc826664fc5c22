// ABOUTME: Integration tests for parallel batch analytics across recipes
// ABOUTME: Volatility ranking and bulk validation with per-recipe structural failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    assert_close, date, init_test_logging, kg_ingredient, kg_line, raw, single_preparation_recipe,
};
use mise_cost::core::errors::ErrorCode;
use mise_cost::core::models::{Ingredient, Preparation, PriceEvent, Recipe, SubComponentLine};
use mise_cost::engine::batch::{rank_recipes_by_volatility, validate_all};
use mise_cost::engine::config::EngineConfig;
use mise_cost::engine::history::PriceIndex;
use mise_cost::engine::series::{SeriesBuilder, SeriesWindow};
use mise_cost::engine::validator::RecipeValidator;

fn cyclic_recipe(name: &str) -> Recipe {
    let prep = Preparation::new("Loop", Vec::new());
    let prep = prep.clone().with_sub_component(SubComponentLine::whole(prep.id));
    Recipe::new(name).with_preparation(prep)
}

struct Kitchen {
    catalog: Vec<Ingredient>,
    log: Vec<PriceEvent>,
    recipes: Vec<Recipe>,
}

fn kitchen() -> Kitchen {
    let beef = kg_ingredient("Beef", 10.0);
    let salt = kg_ingredient("Salt", 1.0);
    let saffron = kg_ingredient("Saffron", 900.0);
    let log = vec![
        PriceEvent::for_id(beef.id, date(2024, 1, 1), 10.0),
        PriceEvent::for_id(beef.id, date(2024, 2, 1), 20.0),
        PriceEvent::for_id(saffron.id, date(2024, 1, 1), 900.0),
        PriceEvent::for_id(saffron.id, date(2024, 2, 1), 990.0),
    ];
    let recipes = vec![
        single_preparation_recipe("Brine", Vec::new(), vec![kg_line(&salt, raw(1.0), 1.0)]),
        single_preparation_recipe("Stew", Vec::new(), vec![kg_line(&beef, raw(1.0), 10.0)]),
        cyclic_recipe("Broken"),
        single_preparation_recipe("Paella", Vec::new(), vec![kg_line(&saffron, raw(0.01), 900.0)]),
    ];
    Kitchen {
        catalog: vec![beef, salt, saffron],
        log,
        recipes,
    }
}

#[test]
fn test_rank_by_volatility_most_volatile_first() {
    init_test_logging();
    let kitchen = kitchen();
    let index = PriceIndex::build(&kitchen.catalog, &kitchen.log);
    let config = EngineConfig::default();
    let builder = SeriesBuilder::new(&index, &config);

    let report = rank_recipes_by_volatility(
        &builder,
        &kitchen.recipes,
        SeriesWindow::OneMonth,
        date(2024, 2, 10),
    );

    let names: Vec<&str> = report.results.iter().map(|r| r.recipe_name.as_str()).collect();
    assert_eq!(names, vec!["Stew", "Paella", "Brine"]);
    assert_close(report.results[0].net_change_pct, 100.0);
    assert_close(report.results[0].latest_cost, 20.0);
    assert_close(report.results[2].step_volatility.value(), 0.0);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].recipe_name, "Broken");
    assert_eq!(report.failures[0].code, ErrorCode::CompositionCycle);
}

#[test]
fn test_validate_all_keeps_input_order() {
    init_test_logging();
    let kitchen = kitchen();

    let report = validate_all(&RecipeValidator::default(), &kitchen.recipes);

    let names: Vec<&str> = report.results.iter().map(|r| r.recipe_name.as_str()).collect();
    assert_eq!(names, vec!["Brine", "Stew", "Paella"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].code, ErrorCode::CompositionCycle);
    assert!(!report.failures[0].message.is_empty());
}

#[test]
fn test_empty_batch() {
    let index = PriceIndex::build(&[], &[]);
    let config = EngineConfig::default();
    let builder = SeriesBuilder::new(&index, &config);

    let report = rank_recipes_by_volatility(&builder, &[], SeriesWindow::OneMonth, date(2024, 2, 10));
    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn test_batch_report_serializes_failures_without_error_detail() {
    let kitchen = kitchen();
    let report = validate_all(&RecipeValidator::default(), &kitchen.recipes[2..3]);

    let json = serde_json::to_value(&report).unwrap();
    let failure = &json["failures"][0];
    assert_eq!(failure["recipe_name"], "Broken");
    assert_eq!(failure["code"], "COMPOSITION_CYCLE");
    assert!(failure.get("error").is_none());
}
