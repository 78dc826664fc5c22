// ABOUTME: Criterion benchmarks for recipe costing and price analytics
// ABOUTME: Measures price indexing, recipe totals, cost series, and parallel volatility ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Criterion benchmarks for the costing engines.
//!
//! Measures price index construction, composition of recipe totals,
//! sampled cost series, and batch ranking across a whole kitchen.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

mod common;

use common::fixtures::{generate_kitchen, KitchenSize};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mise_cost::engine::batch::{rank_recipes_by_volatility, validate_all};
use mise_cost::engine::composition::CompositionAggregator;
use mise_cost::engine::config::EngineConfig;
use mise_cost::engine::history::PriceIndex;
use mise_cost::engine::pricing::{PricesAsOf, RecordedPrices};
use mise_cost::engine::series::{SeriesBuilder, SeriesWindow};
use mise_cost::engine::validator::RecipeValidator;

fn bench_price_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_index");

    for size in [KitchenSize::Small, KitchenSize::Medium] {
        let kitchen = generate_kitchen(size);
        group.throughput(Throughput::Elements(kitchen.log.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("build", kitchen.log.len()),
            &kitchen,
            |b, kitchen| {
                b.iter(|| PriceIndex::build(black_box(&kitchen.catalog), black_box(&kitchen.log)));
            },
        );
    }

    group.finish();
}

fn bench_composition(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition");
    let kitchen = generate_kitchen(KitchenSize::Small);
    let index = PriceIndex::build(&kitchen.catalog, &kitchen.log);
    let aggregator = CompositionAggregator::default();
    let recipe = &kitchen.recipes[0];

    group.bench_function("recorded_prices", |b| {
        b.iter(|| aggregator.compute_recipe_totals(black_box(recipe), &RecordedPrices));
    });

    group.bench_function("prices_as_of", |b| {
        let prices = PricesAsOf::new(&index, kitchen.today);
        b.iter(|| aggregator.compute_recipe_totals(black_box(recipe), &prices));
    });

    group.bench_function("validate", |b| {
        let validator = RecipeValidator::default();
        b.iter(|| validator.validate(black_box(recipe)));
    });

    group.finish();
}

fn bench_cost_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost_series");
    let kitchen = generate_kitchen(KitchenSize::Small);
    let index = PriceIndex::build(&kitchen.catalog, &kitchen.log);
    let config = EngineConfig::default();
    let builder = SeriesBuilder::new(&index, &config);
    let recipe = &kitchen.recipes[0];

    for window in [SeriesWindow::OneMonth, SeriesWindow::TwelveMonths] {
        group.bench_with_input(BenchmarkId::new("recipe", window), &window, |b, &window| {
            b.iter(|| builder.build_cost_series(black_box(recipe), window, kitchen.today));
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    for size in [KitchenSize::Small, KitchenSize::Medium] {
        let kitchen = generate_kitchen(size);
        let index = PriceIndex::build(&kitchen.catalog, &kitchen.log);
        let config = EngineConfig::default();
        let builder = SeriesBuilder::new(&index, &config);
        group.throughput(Throughput::Elements(kitchen.recipes.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("rank_by_volatility", kitchen.recipes.len()),
            &kitchen.recipes,
            |b, recipes| {
                b.iter(|| {
                    rank_recipes_by_volatility(&builder, recipes, SeriesWindow::ThreeMonths, kitchen.today)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("validate_all", kitchen.recipes.len()),
            &kitchen.recipes,
            |b, recipes| {
                let validator = RecipeValidator::default();
                b.iter(|| validate_all(&validator, black_box(recipes)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_price_index,
    bench_composition,
    bench_cost_series,
    bench_batch,
);
criterion_main!(benches);
