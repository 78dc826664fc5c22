// ABOUTME: Integration tests for historical price resolution
// ABOUTME: Covers price-as-of lookups, fallbacks, tie-breaking, loose event keys, filters, and stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{assert_close, date, kg_ingredient, kg_line, raw, single_preparation_recipe};
use mise_cost::core::errors::ErrorCode;
use mise_cost::core::models::{EntityHint, IngredientId, PriceEvent};
use mise_cost::engine::composition::CompositionAggregator;
use mise_cost::engine::history::{
    DispersionReport, PriceBasis, PriceEventFilter, PriceIndex, PriceStats,
};
use mise_cost::engine::pricing::{PriceOrigin, PricesAsOf};

// ============================================================================
// Price As Of
// ============================================================================

#[test]
fn test_price_as_of_picks_latest_event_not_after_date() {
    let catalog = vec![kg_ingredient("Beef", 15.0)];
    let id = catalog[0].id;
    let log = vec![
        PriceEvent::for_id(id, date(2024, 1, 1), 10.0),
        PriceEvent::for_id(id, date(2024, 3, 1), 12.0),
    ];
    let index = PriceIndex::build(&catalog, &log);

    let february = index.price_as_of(id, date(2024, 2, 15)).unwrap();
    assert_close(february.price, 10.0);
    assert_eq!(february.basis, PriceBasis::Event);
    assert_eq!(february.effective_date, Some(date(2024, 1, 1)));

    assert_close(index.price_as_of(id, date(2024, 4, 1)).unwrap().price, 12.0);
    // The event date itself is inclusive.
    assert_close(index.price_as_of(id, date(2024, 3, 1)).unwrap().price, 12.0);
}

#[test]
fn test_price_before_history_falls_back_to_current_price() {
    let catalog = vec![kg_ingredient("Beef", 15.0)];
    let id = catalog[0].id;
    let log = vec![PriceEvent::for_id(id, date(2024, 1, 1), 10.0)];
    let index = PriceIndex::build(&catalog, &log);

    let before = index.price_as_of(id, date(2023, 12, 31)).unwrap();
    assert_close(before.price, 15.0);
    assert_eq!(before.basis, PriceBasis::CurrentFallback);
    assert!(before.effective_date.is_none());
}

#[test]
fn test_no_events_at_all_uses_current_price() {
    let catalog = vec![kg_ingredient("Salt", 0.8)];
    let index = PriceIndex::build(&catalog, &[]);

    let price = index.price_as_of(catalog[0].id, date(2024, 6, 1)).unwrap();
    assert_close(price.price, 0.8);
    assert_eq!(price.basis, PriceBasis::CurrentFallback);
    assert!(index.issues().is_empty());
}

#[test]
fn test_unknown_ingredient_has_no_price() {
    let catalog = vec![kg_ingredient("Salt", 0.8)];
    let index = PriceIndex::build(&catalog, &[]);
    assert!(index.price_as_of(IngredientId::new(), date(2024, 6, 1)).is_none());
}

#[test]
fn test_same_date_events_break_ties_by_sequence() {
    let catalog = vec![kg_ingredient("Butter", 9.0)];
    let id = catalog[0].id;
    let log = vec![
        PriceEvent::for_id(id, date(2024, 1, 1), 11.0).with_sequence(2),
        PriceEvent::for_id(id, date(2024, 1, 1), 10.0).with_sequence(1),
    ];
    let index = PriceIndex::build(&catalog, &log);

    assert_close(index.price_as_of(id, date(2024, 1, 1)).unwrap().price, 11.0);
}

#[test]
fn test_same_date_same_sequence_prefers_later_insertion() {
    let catalog = vec![kg_ingredient("Butter", 9.0)];
    let id = catalog[0].id;
    let log = vec![
        PriceEvent::for_id(id, date(2024, 1, 1), 10.0),
        PriceEvent::for_id(id, date(2024, 1, 1), 10.5),
    ];
    let index = PriceIndex::build(&catalog, &log);

    assert_close(index.price_as_of(id, date(2024, 1, 2)).unwrap().price, 10.5);
}

// ============================================================================
// Loosely Keyed Events
// ============================================================================

#[test]
fn test_name_keyed_events_resolve_to_catalog() {
    let catalog = vec![kg_ingredient("Beef chuck", 14.0)];
    let id = catalog[0].id;
    let log = vec![
        PriceEvent::for_name("  BEEF CHUCK ", date(2024, 1, 1), 10.0),
        // Written before the ingredient was renamed.
        PriceEvent::for_name("chuck", date(2024, 2, 1), 11.0),
    ];
    let index = PriceIndex::build(&catalog, &log);

    assert_eq!(index.events_for(id).len(), 2);
    assert_close(index.price_as_of(id, date(2024, 2, 15)).unwrap().price, 11.0);
    assert!(index.unresolved().is_empty());
}

#[test]
fn test_stale_identifier_falls_back_to_name() {
    let catalog = vec![kg_ingredient("Olive oil", 8.0)];
    let id = catalog[0].id;
    let event = PriceEvent {
        ingredient_name: Some("olive oil".to_owned()),
        ..PriceEvent::for_id(IngredientId::new(), date(2024, 1, 1), 7.5)
    };
    let log = vec![event];
    let index = PriceIndex::build(&catalog, &log);

    assert_close(index.price_as_of(id, date(2024, 1, 1)).unwrap().price, 7.5);
}

#[test]
fn test_ambiguous_name_is_reported_once_and_prefers_recent_entry() {
    let catalog = vec![
        kg_ingredient("Tomato paste", 4.0).with_updated_at(date(2023, 1, 1)),
        kg_ingredient("Tomato sauce", 3.0).with_updated_at(date(2024, 5, 1)),
    ];
    let sauce = catalog[1].id;
    let log = vec![
        PriceEvent::for_name("tomato", date(2024, 1, 1), 2.5),
        PriceEvent::for_name("tomato", date(2024, 2, 1), 2.7),
    ];
    let index = PriceIndex::build(&catalog, &log);

    let ambiguous = index
        .issues()
        .iter()
        .filter(|i| i.code == ErrorCode::AmbiguousName)
        .count();
    assert_eq!(ambiguous, 1);
    assert_eq!(index.events_for(sauce).len(), 2);
}

#[test]
fn test_unmatched_events_are_kept_aside() {
    let catalog = vec![kg_ingredient("Flour", 1.0)];
    let log = vec![
        PriceEvent::for_name("Saffron", date(2024, 1, 1), 900.0),
        PriceEvent::for_name("Saffron", date(2024, 2, 1), 950.0),
    ];
    let index = PriceIndex::build(&catalog, &log);

    assert_eq!(index.unresolved().len(), 2);
    let unresolved = index
        .issues()
        .iter()
        .filter(|i| i.code == ErrorCode::UnresolvedReference)
        .count();
    assert_eq!(unresolved, 1);
    assert!(index.events_for(catalog[0].id).is_empty());
}

#[test]
fn test_price_as_of_hint() {
    let catalog = vec![kg_ingredient("Cream", 5.0)];
    let log = vec![PriceEvent::for_name("cream", date(2024, 1, 1), 4.0)];
    let index = PriceIndex::build(&catalog, &log);

    let price = index
        .price_as_of_hint(EntityHint::name("Cream"), date(2024, 1, 10))
        .unwrap();
    assert_close(price.price, 4.0);
    assert!(index
        .price_as_of_hint(EntityHint::name("Caviar"), date(2024, 1, 10))
        .is_none());
}

// ============================================================================
// Recipe Pricing As Of A Date
// ============================================================================

#[test]
fn test_recipe_priced_as_of_date() {
    let beef = kg_ingredient("Beef", 15.0);
    let recipe =
        single_preparation_recipe("Stew", Vec::new(), vec![kg_line(&beef, raw(2.0), 9.0)]);
    let catalog = vec![beef];
    let id = catalog[0].id;
    let log = vec![PriceEvent::for_id(id, date(2024, 1, 1), 10.0)];
    let index = PriceIndex::build(&catalog, &log);
    let aggregator = CompositionAggregator::default();

    let january = aggregator
        .compute_recipe_totals(&recipe, &PricesAsOf::new(&index, date(2024, 1, 15)))
        .unwrap();
    assert_close(january.total_cost, 20.0);
    assert_eq!(
        january.preparations[0].lines[0].quote.origin,
        PriceOrigin::Historical
    );

    let before = aggregator
        .compute_recipe_totals(&recipe, &PricesAsOf::new(&index, date(2023, 6, 1)))
        .unwrap();
    assert_close(before.total_cost, 30.0);
    assert_eq!(
        before.preparations[0].lines[0].quote.origin,
        PriceOrigin::HistoricalFallback
    );
}

// ============================================================================
// Filters and Statistics
// ============================================================================

fn supplier_log(id: IngredientId) -> Vec<PriceEvent> {
    vec![
        PriceEvent::for_id(id, date(2024, 1, 1), 10.0).with_supplier("Acme").with_brand("Gold"),
        PriceEvent::for_id(id, date(2024, 2, 1), 12.0).with_supplier("acme"),
        PriceEvent::for_id(id, date(2024, 3, 1), 14.0).with_supplier("Bolt"),
    ]
}

#[test]
fn test_filter_by_supplier_date_and_brand() {
    let catalog = vec![kg_ingredient("Cheese", 13.0)];
    let id = catalog[0].id;
    let log = supplier_log(id);
    let index = PriceIndex::build(&catalog, &log);

    let acme = index.filter(&PriceEventFilter::default().for_ingredient(id).with_supplier("ACME"));
    assert_eq!(acme.len(), 2);

    let window = index.filter(&PriceEventFilter::default().between(date(2024, 2, 1), date(2024, 3, 1)));
    assert_eq!(window.len(), 2);

    let gold = index.filter(&PriceEventFilter::default().with_brand("gold"));
    assert_eq!(gold.len(), 1);
    assert_close(gold[0].new_price, 10.0);
}

#[test]
fn test_stats_over_filtered_events() {
    let catalog = vec![kg_ingredient("Cheese", 13.0)];
    let id = catalog[0].id;
    let log = supplier_log(id);
    let index = PriceIndex::build(&catalog, &log);

    let events = index.filter(&PriceEventFilter::default().for_ingredient(id));
    let stats = PriceStats::from_events(&events).unwrap();

    assert_eq!(stats.count, 3);
    assert_close(stats.min, 10.0);
    assert_close(stats.max, 14.0);
    assert_close(stats.mean, 12.0);
    assert_close(stats.range(), 4.0);
    assert_eq!(stats.first_date, date(2024, 1, 1));
    assert_eq!(stats.last_date, date(2024, 3, 1));
    // Population std of 10, 12, 14 is sqrt(8/3).
    assert_close(stats.dispersion.value(), (8.0_f64 / 3.0).sqrt() / 12.0 * 100.0);
    assert!(!stats.is_flat());
}

#[test]
fn test_stats_of_nothing_is_none() {
    assert!(PriceStats::from_events(&[]).is_none());
}

#[test]
fn test_dispersion_of_empty_filter_degrades_to_zero() {
    let catalog = vec![kg_ingredient("Cheese", 13.0)];
    let id = catalog[0].id;
    let log = supplier_log(id);
    let index = PriceIndex::build(&catalog, &log);

    let events = index.filter(&PriceEventFilter::default().with_supplier("Nobody"));
    let report = DispersionReport::from_events(&events);
    assert_eq!(report.count, 0);
    assert_close(report.dispersion.value(), 0.0);
    assert!(report.stats.is_none());

    let events = index.filter(&PriceEventFilter::default().for_ingredient(id));
    let report = DispersionReport::from_events(&events);
    assert_eq!(report.count, 3);
    assert_eq!(report.dispersion, report.stats.unwrap().dispersion);
}
