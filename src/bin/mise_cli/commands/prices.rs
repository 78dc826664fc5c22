// ABOUTME: Price history commands for mise-cli
// ABOUTME: Handles price-as-of, recipe and ingredient series, dispersion, and supplier ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use anyhow::{bail, Result};
use chrono::NaiveDate;
use mise_cost::formatters::TextReport;
use mise_engine::history::{DispersionReport, HistoricalPrice, PriceBasis, PriceEventFilter};
use mise_engine::series::{SeriesBuilder, SeriesWindow};
use mise_engine::supplier::SupplierRanker;
use serde::Serialize;

use super::Context;

/// Filter options as given on the command line
pub struct EventQuery {
    pub ingredient: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub supplier: Option<String>,
    pub brand: Option<String>,
}

impl EventQuery {
    fn to_filter(&self, ctx: &Context<'_>) -> Result<PriceEventFilter> {
        let ingredient_id = match &self.ingredient {
            Some(reference) => Some(ctx.snapshot.resolve_ingredient(reference, &ctx.engine)?.id),
            None => None,
        };
        Ok(PriceEventFilter {
            ingredient_id,
            from: self.from,
            to: self.to,
            supplier: self.supplier.clone(),
            brand: self.brand.clone(),
        })
    }
}

#[derive(Serialize)]
struct NamedPrice<'a> {
    ingredient: &'a str,
    date: NaiveDate,
    #[serde(flatten)]
    price: HistoricalPrice,
}

impl TextReport for NamedPrice<'_> {
    fn render_text(&self) -> String {
        let source = match (self.price.basis, self.price.effective_date) {
            (PriceBasis::Event, Some(effective)) => format!("price event of {effective}"),
            _ => "current catalog price, no earlier history".to_owned(),
        };
        format!(
            "{} on {}: {:.2} per {} ({source})",
            self.ingredient, self.date, self.price.price, self.price.unit
        )
    }
}

/// Price of an ingredient on a date
pub fn price_as_of(ctx: &Context<'_>, ingredient: &str, date: NaiveDate) -> Result<String> {
    let found = ctx.snapshot.resolve_ingredient(ingredient, &ctx.engine)?;
    let Some(price) = ctx.index.price_as_of(found.id, date) else {
        bail!("'{}' is not in the catalog", found.name);
    };
    ctx.render(&NamedPrice {
        ingredient: &found.name,
        date,
        price,
    })
}

/// Sampled cost series of a recipe
pub fn series(ctx: &Context<'_>, recipe: &str, window: SeriesWindow) -> Result<String> {
    let recipe = ctx.snapshot.resolve_recipe(recipe, &ctx.engine)?;
    let builder = SeriesBuilder::new(&ctx.index, &ctx.engine);
    let series = builder.build_cost_series(recipe, window, ctx.today)?;
    ctx.render(&series)
}

/// Sampled price series of an ingredient
pub fn ingredient_series(ctx: &Context<'_>, ingredient: &str, window: SeriesWindow) -> Result<String> {
    let found = ctx.snapshot.resolve_ingredient(ingredient, &ctx.engine)?;
    let builder = SeriesBuilder::new(&ctx.index, &ctx.engine);
    let Some(series) = builder.build_ingredient_series(found.id, window, ctx.today) else {
        bail!("'{}' is not in the catalog", found.name);
    };
    ctx.render(&series)
}

/// Statistics and dispersion volatility of filtered events
pub fn dispersion(ctx: &Context<'_>, query: &EventQuery) -> Result<String> {
    let events = ctx.index.filter(&query.to_filter(ctx)?);
    ctx.render(&DispersionReport::from_events(&events))
}

/// Suppliers of filtered events ranked by mean price
pub fn best_supplier(ctx: &Context<'_>, query: &EventQuery) -> Result<String> {
    let events = ctx.index.filter(&query.to_filter(ctx)?);
    let ranked = SupplierRanker::rank_suppliers(events.iter().copied());
    ctx.render(ranked.as_slice())
}
