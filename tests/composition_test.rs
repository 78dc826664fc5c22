// ABOUTME: Integration tests for the composition aggregator
// ABOUTME: Covers recipe totals, sub-component consumption, structural errors, and price sources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{
    assert_close, cleaned, kg_ingredient, kg_line, loose_line, raw, single_preparation_recipe,
    thawed,
};
use mise_cost::core::errors::{ErrorCode, StructuralError};
use mise_cost::core::models::{Preparation, PreparationId, ProcessStage, Recipe, SubComponentLine};
use mise_cost::engine::composition::CompositionAggregator;
use mise_cost::engine::issues::Severity;
use mise_cost::engine::pricing::{CurrentPrices, PriceOrigin, RecordedPrices};

fn totals(recipe: &Recipe) -> mise_cost::engine::composition::RecipeTotals {
    CompositionAggregator::default()
        .compute_recipe_totals(recipe, &RecordedPrices)
        .unwrap()
}

/// Child preparation: 2 kg cleaned down to 1.5 kg at 4 per kg
fn cleaned_child() -> Preparation {
    Preparation::new("Cleaned leeks", vec![ProcessStage::Clean])
        .with_ingredient(loose_line("Leek", cleaned(2.0, 1.5), 4.0))
}

// ============================================================================
// Recipe Totals
// ============================================================================

#[test]
fn test_thawed_line_recipe_totals() {
    let recipe = single_preparation_recipe(
        "Garlic shrimp",
        vec![ProcessStage::Thaw],
        vec![loose_line("Shrimp", thawed(1.0, 0.9), 10.0)],
    );
    let result = totals(&recipe);

    assert_close(result.bruto_weight, 1.0);
    assert_close(result.yield_weight, 0.9);
    assert_close(result.total_cost, 10.0);
    assert_close(result.cost_per_kg_raw.unwrap(), 10.0);
    assert_close(result.cost_per_kg_yield.unwrap(), 10.0 / 0.9);
    assert!(result.cuba_cost.is_none());
    assert!(result.issues.is_empty());
}

#[test]
fn test_cuba_cost_uses_cost_per_yield_kilogram() {
    let recipe = single_preparation_recipe(
        "Garlic shrimp",
        vec![ProcessStage::Thaw],
        vec![loose_line("Shrimp", thawed(1.0, 0.9), 10.0)],
    )
    .with_cuba_weight(0.5);
    let result = totals(&recipe);

    assert_close(result.cuba_cost.unwrap(), 0.5 * 10.0 / 0.9);
}

#[test]
fn test_empty_recipe_reports_undefined_ratios() {
    let result = totals(&Recipe::new("Nothing yet"));

    assert_close(result.total_cost, 0.0);
    assert!(result.cost_per_kg_raw.is_none());
    assert!(result.cost_per_kg_yield.is_none());
    let undefined = result
        .issues
        .iter()
        .filter(|i| i.code == ErrorCode::DivisionUndefined)
        .count();
    assert_eq!(undefined, 2);
    assert!(result.issues.iter().all(|i| i.severity == Severity::Warning));
}

#[test]
fn test_breakdown_lists_every_line() {
    let recipe = single_preparation_recipe(
        "Stock",
        Vec::new(),
        vec![
            loose_line("Bones", raw(3.0), 2.0),
            loose_line("Carrot", raw(0.5), 1.0),
        ],
    );
    let result = totals(&recipe);

    assert_eq!(result.breakdown.len(), 2);
    assert_close(result.breakdown.iter().map(|b| b.cost).sum::<f64>(), result.total_cost);
    assert_eq!(result.breakdown[0].ingredient_name.as_deref(), Some("Bones"));
}

// ============================================================================
// Sub-components
// ============================================================================

#[test]
fn test_sole_sub_component_passes_through() {
    let child = cleaned_child();
    let parent = Preparation::new("Leek tart", vec![ProcessStage::Assemble])
        .with_sub_component(SubComponentLine::whole(child.id));
    let recipe = Recipe::new("Leek tart")
        .with_preparation(child)
        .with_preparation(parent);
    let result = totals(&recipe);

    // The consumed output's yield weight is the parent's bruto weight.
    assert_close(result.bruto_weight, 1.5);
    assert_close(result.yield_weight, 1.5);
    assert_close(result.total_cost, 8.0);
    assert_eq!(result.preparations.len(), 2);
}

#[test]
fn test_consumed_preparation_counted_once() {
    let child = cleaned_child();
    let parent = Preparation::new("Leek tart", Vec::new())
        .with_ingredient(loose_line("Pastry", raw(1.0), 5.0))
        .with_sub_component(SubComponentLine::whole(child.id));
    let child_id = child.id;
    let recipe = Recipe::new("Leek tart")
        .with_preparation(child)
        .with_preparation(parent);
    let result = totals(&recipe);

    assert_close(result.bruto_weight, 2.5);
    assert_close(result.yield_weight, 2.5);
    assert_close(result.total_cost, 13.0);
    let child_totals = result.preparation(child_id).unwrap();
    assert_close(child_totals.cost, 8.0);
}

#[test]
fn test_shared_sub_component_split_between_parents() {
    let sauce = Preparation::new("Tomato sauce", Vec::new())
        .with_ingredient(loose_line("Tomato", raw(2.0), 3.0));
    let pizza = Preparation::new("Pizza", Vec::new())
        .with_sub_component(SubComponentLine::partial(sauce.id, 1.0));
    let pasta = Preparation::new("Pasta", Vec::new())
        .with_sub_component(SubComponentLine::partial(sauce.id, 1.0));
    let recipe = Recipe::new("Menu")
        .with_preparation(sauce)
        .with_preparation(pizza)
        .with_preparation(pasta);
    let result = totals(&recipe);

    assert_close(result.total_cost, 6.0);
    assert_close(result.yield_weight, 2.0);
    assert_eq!(result.breakdown.len(), 2);
    for entry in &result.breakdown {
        assert_close(entry.share, 0.5);
        assert_close(entry.cost, 3.0);
    }
}

#[test]
fn test_partial_consumption_beyond_output_is_capped_and_flagged() {
    let child = cleaned_child();
    let parent = Preparation::new("Leek tart", Vec::new())
        .with_sub_component(SubComponentLine::partial(child.id, 5.0));
    let parent_id = parent.id;
    let recipe = Recipe::new("Leek tart")
        .with_preparation(child)
        .with_preparation(parent);
    let result = totals(&recipe);

    let used = &result.preparation(parent_id).unwrap().sub_components[0];
    assert_close(used.fraction, 1.0);
    assert_close(result.total_cost, 8.0);

    let issue = result
        .issues
        .iter()
        .find(|i| i.code == ErrorCode::ConsumedBeyondOutput)
        .expect("consumption beyond the output should be reported");
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.field.as_deref(), Some("consumed_weight"));
    assert_eq!(issue.preparation_id, Some(parent_id));
    assert_close(issue.stored_value.unwrap(), 5.0);
    assert_close(issue.corrected_value.unwrap(), 1.5);
}

fn tomato_sauce() -> Preparation {
    Preparation::new("Tomato sauce", Vec::new())
        .with_ingredient(loose_line("Tomato", raw(2.0), 3.0))
}

#[test]
fn test_sub_component_consumed_whole_by_two_parents_counted_once() {
    let sauce = tomato_sauce();
    let pizza = Preparation::new("Pizza", Vec::new())
        .with_sub_component(SubComponentLine::whole(sauce.id));
    let pasta = Preparation::new("Pasta", Vec::new())
        .with_sub_component(SubComponentLine::whole(sauce.id));
    let (pizza_id, pasta_id) = (pizza.id, pasta.id);
    let recipe = Recipe::new("Menu")
        .with_preparation(sauce)
        .with_preparation(pizza)
        .with_preparation(pasta);
    let result = totals(&recipe);

    assert_close(result.total_cost, 6.0);
    assert_close(result.bruto_weight, 2.0);
    assert_close(result.yield_weight, 2.0);
    assert_close(result.preparation(pizza_id).unwrap().cost, 6.0);
    assert_close(result.preparation(pasta_id).unwrap().cost, 0.0);

    let over: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.code == ErrorCode::SubComponentOverAllocated)
        .collect();
    assert_eq!(over.len(), 1);
    assert_eq!(over[0].severity, Severity::Error);
    assert_eq!(over[0].preparation_id, Some(pasta_id));
    assert_close(over[0].stored_value.unwrap(), 1.0);
    assert_close(over[0].corrected_value.unwrap(), 0.0);
}

#[test]
fn test_over_allocated_partials_share_one_output() {
    let sauce = tomato_sauce();
    let pizza = Preparation::new("Pizza", Vec::new())
        .with_sub_component(SubComponentLine::partial(sauce.id, 1.5));
    let pasta = Preparation::new("Pasta", Vec::new())
        .with_sub_component(SubComponentLine::partial(sauce.id, 1.5));
    let pasta_id = pasta.id;
    let recipe = Recipe::new("Menu")
        .with_preparation(sauce)
        .with_preparation(pizza)
        .with_preparation(pasta);
    let result = totals(&recipe);

    assert_close(result.total_cost, 6.0);
    assert_close(result.yield_weight, 2.0);
    let used = &result.preparation(pasta_id).unwrap().sub_components[0];
    assert_close(used.fraction, 0.25);
    assert_close(used.cost, 1.5);

    let issue = result
        .issues
        .iter()
        .find(|i| i.code == ErrorCode::SubComponentOverAllocated)
        .expect("over-allocation should be reported");
    assert_close(issue.stored_value.unwrap(), 0.75);
    assert_close(issue.corrected_value.unwrap(), 0.25);
}

#[test]
fn test_partial_consumption_of_empty_output_is_flagged() {
    let child = Preparation::new("Garnish", Vec::new())
        .with_ingredient(loose_line("Chive", raw(0.0), 20.0));
    let parent = Preparation::new("Plate", Vec::new())
        .with_sub_component(SubComponentLine::partial(child.id, 0.2));
    let recipe = Recipe::new("Plate")
        .with_preparation(child)
        .with_preparation(parent);
    let result = totals(&recipe);

    assert!(result
        .issues
        .iter()
        .any(|i| i.code == ErrorCode::DivisionUndefined
            && i.field.as_deref() == Some("consumed_weight")));
}

#[test]
fn test_cached_sub_component_cost_drift_is_warning() {
    let child = cleaned_child();
    let line = SubComponentLine {
        stored_cost: Some(100.0),
        stored_yield_weight: Some(1.5),
        ..SubComponentLine::whole(child.id)
    };
    let parent = Preparation::new("Leek tart", Vec::new()).with_sub_component(line);
    let recipe = Recipe::new("Leek tart")
        .with_preparation(child)
        .with_preparation(parent);
    let result = totals(&recipe);

    let drift: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.code == ErrorCode::SubComponentDrift)
        .collect();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].field.as_deref(), Some("sub_component_cost"));
    assert_eq!(drift[0].corrected_value, Some(8.0));
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn test_cycle_is_rejected() {
    let first = Preparation::new("First", Vec::new());
    let second = Preparation::new("Second", Vec::new())
        .with_sub_component(SubComponentLine::whole(first.id));
    let first = first.with_sub_component(SubComponentLine::whole(second.id));
    let recipe = Recipe::new("Loop")
        .with_preparation(first)
        .with_preparation(second);

    let err = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &RecordedPrices)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CompositionCycle);
    match err {
        StructuralError::Cycle { path, .. } => {
            assert_eq!(path.len(), 3);
            assert_eq!(path.first(), path.last());
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn test_self_reference_is_a_cycle() {
    let prep = Preparation::new("Ouroboros", Vec::new());
    let prep = prep.clone().with_sub_component(SubComponentLine::whole(prep.id));
    let recipe = Recipe::new("Loop").with_preparation(prep);

    let err = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &RecordedPrices)
        .unwrap_err();
    assert!(matches!(err, StructuralError::Cycle { .. }));
}

#[test]
fn test_missing_sub_component_is_rejected() {
    let dangling = PreparationId::new();
    let prep = Preparation::new("Orphan", Vec::new())
        .with_sub_component(SubComponentLine::whole(dangling));
    let recipe = Recipe::new("Orphan").with_preparation(prep);

    let err = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &RecordedPrices)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingPreparation);
    assert!(matches!(err, StructuralError::MissingPreparation { missing, .. } if missing == dangling));
}

#[test]
fn test_duplicate_preparation_is_rejected() {
    let prep = Preparation::new("Twice", Vec::new());
    let recipe = Recipe::new("Twins")
        .with_preparation(prep.clone())
        .with_preparation(prep);

    let err = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &RecordedPrices)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicatePreparation);
}

// ============================================================================
// Price Sources
// ============================================================================

#[test]
fn test_current_prices_replace_recorded_prices() {
    let beef = kg_ingredient("Beef", 12.0);
    let recipe = single_preparation_recipe("Stew", Vec::new(), vec![kg_line(&beef, raw(2.0), 10.0)]);
    let catalog = vec![beef];

    let result = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &CurrentPrices::new(&catalog))
        .unwrap();

    assert_close(result.total_cost, 24.0);
    assert_eq!(result.preparations[0].lines[0].quote.origin, PriceOrigin::Current);
    assert!(result.issues.is_empty());
}

#[test]
fn test_current_prices_fall_back_for_unknown_ingredient() {
    let recipe = single_preparation_recipe(
        "Stew",
        Vec::new(),
        vec![loose_line("Mystery spice", raw(0.1), 50.0)],
    );

    let result = CompositionAggregator::default()
        .compute_recipe_totals(&recipe, &CurrentPrices::new(&[]))
        .unwrap();

    assert_close(result.total_cost, 5.0);
    assert!(result
        .issues
        .iter()
        .any(|i| i.code == ErrorCode::UnresolvedReference));
}
