// ABOUTME: Supplier ranking by mean historical price over a filtered set of price events
// ABOUTME: Groups by trimmed, case-insensitive supplier name and ranks cheapest first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use std::collections::HashMap;

use mise_core::models::PriceEvent;
use serde::{Deserialize, Serialize};

/// Mean price quoted by one supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierAverage {
    /// Supplier name, as first seen in the events
    pub supplier: String,
    /// Arithmetic mean of the supplier's prices
    pub average_price: f64,
    /// Number of events behind the mean
    pub event_count: usize,
}

/// Ranks suppliers by mean price
#[derive(Debug, Clone, Copy, Default)]
pub struct SupplierRanker;

impl SupplierRanker {
    /// Every supplier, cheapest mean first, ties by name
    ///
    /// Events without a supplier are ignored.
    #[must_use]
    pub fn rank_suppliers<'e, I>(events: I) -> Vec<SupplierAverage>
    where
        I: IntoIterator<Item = &'e PriceEvent>,
    {
        let mut groups: HashMap<String, (String, f64, usize)> = HashMap::new();
        for event in events {
            let Some(name) = event.supplier_name() else {
                continue;
            };
            let entry = groups
                .entry(name.to_lowercase())
                .or_insert_with(|| (name.to_owned(), 0.0, 0));
            entry.1 += event.new_price;
            entry.2 += 1;
        }

        let mut ranked: Vec<(String, SupplierAverage)> = groups
            .into_iter()
            .map(|(key, (supplier, sum, count))| {
                (
                    key,
                    SupplierAverage {
                        supplier,
                        average_price: sum / count as f64,
                        event_count: count,
                    },
                )
            })
            .collect();
        ranked.sort_by(|(ka, a), (kb, b)| {
            a.average_price
                .total_cmp(&b.average_price)
                .then_with(|| ka.cmp(kb))
        });
        ranked.into_iter().map(|(_, average)| average).collect()
    }

    /// Cheapest supplier by mean price; `None` when no event names a supplier
    #[must_use]
    pub fn best_supplier<'e, I>(events: I) -> Option<SupplierAverage>
    where
        I: IntoIterator<Item = &'e PriceEvent>,
    {
        Self::rank_suppliers(events).into_iter().next()
    }
}
