// ABOUTME: Price sources used when costing ingredient lines
// ABOUTME: Recorded (authoring-time), current catalog, and historical as-of prices behind one trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Price Sources
//!
//! The composition aggregator is written once against [`PriceSource`]. Which
//! price a line is costed at depends on the caller:
//!
//! - [`RecordedPrices`]: the price written on the line; used for recipe totals
//!   and validation
//! - [`CurrentPrices`]: the catalog's current price; used for impact analysis
//! - [`PricesAsOf`]: the historical price at a date; used for cost series

use std::collections::HashMap;

use chrono::NaiveDate;
use mise_core::errors::ErrorCode;
use mise_core::models::{Ingredient, IngredientId, IngredientLine};
use mise_core::units::Unit;
use serde::{Deserialize, Serialize};

use crate::history::{PriceBasis, PriceIndex};
use crate::issues::Issue;

/// Where a quoted price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    /// Price recorded on the ingredient line
    Recorded,
    /// Current catalog price
    Current,
    /// Historical event on or before the requested date
    Historical,
    /// Current catalog price standing in for missing history
    HistoricalFallback,
}

/// Price to cost one line with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price per `unit`
    pub price: f64,
    /// Unit the price refers to
    pub unit: Unit,
    /// Where the price came from
    pub origin: PriceOrigin,
}

impl PriceQuote {
    /// Price recorded on a line
    #[must_use]
    pub const fn recorded(line: &IngredientLine) -> Self {
        Self {
            price: line.price_per_unit,
            unit: line.price_unit,
            origin: PriceOrigin::Recorded,
        }
    }
}

/// A quote plus the data gap raised while producing it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct PriceLookup {
    /// Price to use
    pub quote: PriceQuote,
    /// Fallback notice
    pub issue: Option<Issue>,
}

impl PriceLookup {
    const fn clean(quote: PriceQuote) -> Self {
        Self { quote, issue: None }
    }
}

/// Supplies the price of an ingredient line
pub trait PriceSource {
    /// Price for `line`
    fn quote(&self, line: &IngredientLine) -> PriceLookup;
}

/// Prices as written on each line
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedPrices;

impl PriceSource for RecordedPrices {
    fn quote(&self, line: &IngredientLine) -> PriceLookup {
        PriceLookup::clean(PriceQuote::recorded(line))
    }
}

/// Current catalog prices
#[derive(Debug, Clone)]
pub struct CurrentPrices<'a> {
    catalog: HashMap<IngredientId, &'a Ingredient>,
}

impl<'a> CurrentPrices<'a> {
    /// Index a catalog snapshot
    #[must_use]
    pub fn new(catalog: &'a [Ingredient]) -> Self {
        Self {
            catalog: catalog.iter().map(|i| (i.id, i)).collect(),
        }
    }
}

impl PriceSource for CurrentPrices<'_> {
    fn quote(&self, line: &IngredientLine) -> PriceLookup {
        self.catalog.get(&line.ingredient_id).map_or_else(
            || missing_from_catalog(line),
            |ingredient| {
                PriceLookup::clean(PriceQuote {
                    price: ingredient.current_price,
                    unit: ingredient.unit,
                    origin: PriceOrigin::Current,
                })
            },
        )
    }
}

/// Historical prices at a fixed date
#[derive(Debug, Clone, Copy)]
pub struct PricesAsOf<'i, 'a> {
    index: &'i PriceIndex<'a>,
    date: NaiveDate,
}

impl<'i, 'a> PricesAsOf<'i, 'a> {
    /// Prices in effect on `date`
    #[must_use]
    pub const fn new(index: &'i PriceIndex<'a>, date: NaiveDate) -> Self {
        Self { index, date }
    }
}

impl PriceSource for PricesAsOf<'_, '_> {
    fn quote(&self, line: &IngredientLine) -> PriceLookup {
        self.index
            .price_as_of(line.ingredient_id, self.date)
            .map_or_else(
                || missing_from_catalog(line),
                |historical| {
                    PriceLookup::clean(PriceQuote {
                        price: historical.price,
                        unit: historical.unit,
                        origin: match historical.basis {
                            PriceBasis::Event => PriceOrigin::Historical,
                            PriceBasis::CurrentFallback => PriceOrigin::HistoricalFallback,
                        },
                    })
                },
            )
    }
}

fn missing_from_catalog(line: &IngredientLine) -> PriceLookup {
    let name = line.ingredient_name.as_deref().unwrap_or("unnamed ingredient");
    PriceLookup {
        quote: PriceQuote::recorded(line),
        issue: Some(
            Issue::data_gap(
                ErrorCode::UnresolvedReference,
                format!("'{name}' is not in the catalog, using the recorded line price"),
            )
            .with_ingredient(line.ingredient_id),
        ),
    }
}
