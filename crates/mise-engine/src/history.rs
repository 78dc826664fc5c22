// ABOUTME: Historical price index built once per snapshot from the append-only price event log
// ABOUTME: Resolves loosely keyed events, answers price-as-of queries, filters events, summarizes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Price History
//!
//! [`PriceIndex`] resolves every price event to a catalog ingredient exactly
//! once, then keeps each ingredient's events ordered by
//! `(date, sequence, log position)`. A price-as-of query is a binary search
//! over that order: the last event on or before the date wins, and with no
//! such event the ingredient's current catalog price is the fallback.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use mise_core::constants::EPSILON;
use mise_core::errors::ErrorCode;
use mise_core::models::{EntityHint, Ingredient, IngredientId, PriceEvent};
use mise_core::units::Unit;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::issues::Issue;
use crate::resolver::{EntityResolver, Resolution};
use crate::volatility::DispersionVolatility;

/// Where a resolved price came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Latest event on or before the requested date
    Event,
    /// No event on or before the date; the catalog's current price
    CurrentFallback,
}

/// Price of one ingredient at a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPrice {
    /// Resolved ingredient
    pub ingredient_id: IngredientId,
    /// Price per `unit`
    pub price: f64,
    /// Purchase unit of the ingredient
    pub unit: Unit,
    /// Date of the event the price came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    /// Event or fallback
    pub basis: PriceBasis,
}

/// Price events resolved against a catalog snapshot
#[derive(Debug, Clone)]
pub struct PriceIndex<'a> {
    catalog: &'a [Ingredient],
    log: &'a [PriceEvent],
    by_ingredient: HashMap<IngredientId, Vec<&'a PriceEvent>>,
    unresolved: Vec<&'a PriceEvent>,
    issues: Vec<Issue>,
    fuzzy_min_hint_len: usize,
}

impl<'a> PriceIndex<'a> {
    /// Resolve and order every event in the log
    #[must_use]
    pub fn build(catalog: &'a [Ingredient], log: &'a [PriceEvent]) -> Self {
        Self::build_with(catalog, log, mise_core::constants::resolution::FUZZY_MIN_HINT_LEN)
    }

    /// Same as [`PriceIndex::build`] with an explicit fuzzy hint length
    #[must_use]
    pub fn build_with(
        catalog: &'a [Ingredient],
        log: &'a [PriceEvent],
        fuzzy_min_hint_len: usize,
    ) -> Self {
        let resolver = EntityResolver::new(catalog).with_fuzzy_min_hint_len(fuzzy_min_hint_len);
        let mut positioned: HashMap<IngredientId, Vec<(usize, &'a PriceEvent)>> = HashMap::new();
        let mut unresolved = Vec::new();
        let mut issues = Vec::new();
        let mut reported: HashSet<String> = HashSet::new();

        for (position, event) in log.iter().enumerate() {
            let resolution = resolver.resolve(event.hint());
            let label = hint_label(event);
            if resolution.is_ambiguous() && reported.insert(label.clone()) {
                let chosen = resolution.best().map_or_else(String::new, |i| i.name.clone());
                issues.push(Issue::data_gap(
                    ErrorCode::AmbiguousName,
                    format!(
                        "price event for '{label}' matches {} catalog entries, using '{chosen}'",
                        resolution.candidate_count()
                    ),
                ));
            }
            match resolution.best() {
                Some(ingredient) => positioned
                    .entry(ingredient.id)
                    .or_default()
                    .push((position, event)),
                None => {
                    if reported.insert(label.clone()) {
                        issues.push(Issue::data_gap(
                            ErrorCode::UnresolvedReference,
                            format!("price event for '{label}' matches no catalog ingredient"),
                        ));
                    }
                    unresolved.push(event);
                }
            }
        }

        let by_ingredient = positioned
            .into_iter()
            .map(|(id, mut events)| {
                events.sort_by_key(|(position, e)| (e.date, e.sequence, *position));
                (id, events.into_iter().map(|(_, e)| e).collect())
            })
            .collect();

        if !unresolved.is_empty() {
            warn!(
                unresolved = unresolved.len(),
                total = log.len(),
                "Some price events could not be resolved"
            );
        }
        debug!(events = log.len(), "Built price index");

        Self {
            catalog,
            log,
            by_ingredient,
            unresolved,
            issues,
            fuzzy_min_hint_len,
        }
    }

    /// Catalog the index was built against
    #[must_use]
    pub const fn catalog(&self) -> &'a [Ingredient] {
        self.catalog
    }

    /// Findings raised while resolving events
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Events that matched no catalog ingredient
    #[must_use]
    pub fn unresolved(&self) -> &[&'a PriceEvent] {
        &self.unresolved
    }

    /// Catalog ingredient by identifier
    #[must_use]
    pub fn ingredient(&self, id: IngredientId) -> Option<&'a Ingredient> {
        self.catalog.iter().find(|i| i.id == id)
    }

    /// Resolve a hint against the catalog
    #[must_use]
    pub fn resolve(&self, hint: EntityHint<'_, IngredientId>) -> Resolution<'a, Ingredient> {
        EntityResolver::new(self.catalog)
            .with_fuzzy_min_hint_len(self.fuzzy_min_hint_len)
            .resolve(hint)
    }

    /// Events of one ingredient, oldest first
    #[must_use]
    pub fn events_for(&self, id: IngredientId) -> &[&'a PriceEvent] {
        self.by_ingredient.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Events of one ingredient within `[from, to]`, oldest first
    #[must_use]
    pub fn events_between(
        &self,
        id: IngredientId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> &[&'a PriceEvent] {
        let events = self.events_for(id);
        let start = events.partition_point(|e| e.date < from);
        let end = events.partition_point(|e| e.date <= to).max(start);
        &events[start..end]
    }

    /// Price of an ingredient as of `date`
    ///
    /// Returns `None` only when the identifier is not in the catalog.
    #[must_use]
    pub fn price_as_of(&self, id: IngredientId, date: NaiveDate) -> Option<HistoricalPrice> {
        let ingredient = self.ingredient(id)?;
        let events = self.events_for(id);
        let upto = events.partition_point(|e| e.date <= date);

        let price = if upto == 0 {
            HistoricalPrice {
                ingredient_id: id,
                price: ingredient.current_price,
                unit: ingredient.unit,
                effective_date: None,
                basis: PriceBasis::CurrentFallback,
            }
        } else {
            let event = events[upto - 1];
            HistoricalPrice {
                ingredient_id: id,
                price: event.new_price,
                unit: ingredient.unit,
                effective_date: Some(event.date),
                basis: PriceBasis::Event,
            }
        };
        Some(price)
    }

    /// Price as of `date` for a loosely keyed reference
    #[must_use]
    pub fn price_as_of_hint(
        &self,
        hint: EntityHint<'_, IngredientId>,
        date: NaiveDate,
    ) -> Option<HistoricalPrice> {
        let ingredient = self.resolve(hint).best()?;
        self.price_as_of(ingredient.id, date)
    }

    /// Events matching a filter
    ///
    /// With an ingredient set the events come back in resolved order; otherwise
    /// in log order.
    #[must_use]
    pub fn filter(&self, filter: &PriceEventFilter) -> Vec<&'a PriceEvent> {
        match filter.ingredient_id {
            Some(id) => self
                .events_for(id)
                .iter()
                .copied()
                .filter(|e| filter.matches(e))
                .collect(),
            None => self.log.iter().filter(|e| filter.matches(e)).collect(),
        }
    }
}

fn hint_label(event: &PriceEvent) -> String {
    event
        .hint()
        .trimmed_name()
        .map(str::to_owned)
        .or_else(|| event.ingredient_id.map(|id| id.to_string()))
        .unwrap_or_default()
}

/// Criteria for selecting price events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEventFilter {
    /// Resolved ingredient
    #[serde(default)]
    pub ingredient_id: Option<IngredientId>,
    /// Earliest date, inclusive
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    #[serde(default)]
    pub to: Option<NaiveDate>,
    /// Supplier, matched case-insensitively
    #[serde(default)]
    pub supplier: Option<String>,
    /// Brand, matched case-insensitively
    #[serde(default)]
    pub brand: Option<String>,
}

impl PriceEventFilter {
    /// Restrict to one ingredient
    #[must_use]
    pub const fn for_ingredient(mut self, id: IngredientId) -> Self {
        self.ingredient_id = Some(id);
        self
    }

    /// Restrict to a date range
    #[must_use]
    pub const fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Restrict to one supplier
    #[must_use]
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Restrict to one brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Whether an event satisfies every date, supplier and brand criterion
    #[must_use]
    pub fn matches(&self, event: &PriceEvent) -> bool {
        self.from.is_none_or(|from| event.date >= from)
            && self.to.is_none_or(|to| event.date <= to)
            && text_matches(self.supplier.as_deref(), event.supplier.as_deref())
            && text_matches(self.brand.as_deref(), event.brand.as_deref())
    }
}

fn text_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| {
        actual.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(wanted.trim()))
    })
}

/// Summary statistics over a set of price events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    /// Number of events
    pub count: usize,
    /// Lowest price
    pub min: f64,
    /// Highest price
    pub max: f64,
    /// Arithmetic mean price
    pub mean: f64,
    /// Earliest event date
    pub first_date: NaiveDate,
    /// Latest event date
    pub last_date: NaiveDate,
    /// Coefficient of variation of the prices
    pub dispersion: DispersionVolatility,
}

impl PriceStats {
    /// Summarize events; `None` when there are none
    #[must_use]
    pub fn from_events(events: &[&PriceEvent]) -> Option<Self> {
        let first = events.first()?;
        let prices: Vec<f64> = events.iter().map(|e| e.new_price).collect();
        let (min, max, sum) = prices.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &p| (min.min(p), max.max(p), sum + p),
        );
        let (first_date, last_date) = events.iter().fold(
            (first.date, first.date),
            |(lo, hi), e| (lo.min(e.date), hi.max(e.date)),
        );

        Some(Self {
            count: events.len(),
            min,
            max,
            mean: sum / prices.len() as f64,
            first_date,
            last_date,
            dispersion: DispersionVolatility::of(&prices),
        })
    }

    /// Spread between the highest and lowest price
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Whether every event carried the same price
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.range().abs() < EPSILON
    }
}

/// Dispersion of a filtered event set
///
/// An empty set degrades to zero events and zero volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionReport {
    /// Number of events
    pub count: usize,
    /// Coefficient of variation of the prices
    pub dispersion: DispersionVolatility,
    /// Summary statistics, absent for an empty set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<PriceStats>,
}

impl DispersionReport {
    /// Summarize events, empty or not
    #[must_use]
    pub fn from_events(events: &[&PriceEvent]) -> Self {
        let stats = PriceStats::from_events(events);
        Self {
            count: events.len(),
            dispersion: stats.map_or_else(DispersionVolatility::default, |s| s.dispersion),
            stats,
        }
    }
}
