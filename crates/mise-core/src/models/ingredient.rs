// ABOUTME: Catalog ingredient and append-only price event models
// ABOUTME: Ingredient carries the current purchase price; PriceEvent records each price change
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::IngredientId;
use super::EntityHint;
use crate::units::Unit;

const fn default_active() -> bool {
    true
}

/// Purchasable ingredient as held by the catalog
///
/// The current price is mutated by the catalog whenever a new price is
/// recorded. Ingredients referenced by recipes are deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Stable identifier
    pub id: IngredientId,
    /// Display name (may have changed since older price events were written)
    pub name: String,
    /// Purchase unit the price refers to
    #[serde(default)]
    pub unit: Unit,
    /// Current price per purchase unit
    pub current_price: f64,
    /// Catalog category (proteins, dairy, ...)
    #[serde(default)]
    pub category: Option<String>,
    /// Principal supplier
    #[serde(default)]
    pub supplier: Option<String>,
    /// Preferred brand
    #[serde(default)]
    pub brand: Option<String>,
    /// Soft-deactivation flag
    #[serde(default = "default_active")]
    pub active: bool,
    /// Last date the catalog entry changed (used to prefer recent candidates)
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

impl Ingredient {
    /// Create an active ingredient priced per `unit`
    #[must_use]
    pub fn new(name: impl Into<String>, unit: Unit, current_price: f64) -> Self {
        Self {
            id: IngredientId::new(),
            name: name.into(),
            unit,
            current_price,
            category: None,
            supplier: None,
            brand: None,
            active: true,
            updated_at: None,
        }
    }

    /// Set the principal supplier
    #[must_use]
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Set the catalog category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the last-updated date
    #[must_use]
    pub fn with_updated_at(mut self, date: NaiveDate) -> Self {
        self.updated_at = Some(date);
        self
    }
}

/// Point-in-time price change, append-only
///
/// Older events may only carry a free-text name, or an identifier and a name
/// that no longer agrees with the catalog after a rename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEvent {
    /// Ingredient identifier, when the writer knew it
    #[serde(default)]
    pub ingredient_id: Option<IngredientId>,
    /// Ingredient name as written at the time of the event
    #[serde(default)]
    pub ingredient_name: Option<String>,
    /// Calendar date the price took effect
    pub date: NaiveDate,
    /// Price per purchase unit from this date on
    pub new_price: f64,
    /// Price before the change
    #[serde(default)]
    pub old_price: Option<f64>,
    /// Supplier quoting the price
    #[serde(default)]
    pub supplier: Option<String>,
    /// Brand quoted
    #[serde(default)]
    pub brand: Option<String>,
    /// Insertion order in the log (larger = recorded later)
    #[serde(default)]
    pub sequence: u64,
}

impl PriceEvent {
    /// Create an event keyed by identifier
    #[must_use]
    pub const fn for_id(ingredient_id: IngredientId, date: NaiveDate, new_price: f64) -> Self {
        Self {
            ingredient_id: Some(ingredient_id),
            ingredient_name: None,
            date,
            new_price,
            old_price: None,
            supplier: None,
            brand: None,
            sequence: 0,
        }
    }

    /// Create an event keyed only by free-text name
    #[must_use]
    pub fn for_name(ingredient_name: impl Into<String>, date: NaiveDate, new_price: f64) -> Self {
        Self {
            ingredient_id: None,
            ingredient_name: Some(ingredient_name.into()),
            date,
            new_price,
            old_price: None,
            supplier: None,
            brand: None,
            sequence: 0,
        }
    }

    /// Set the supplier
    #[must_use]
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Set the brand
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the insertion order
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Reference to resolve against the catalog
    #[must_use]
    pub fn hint(&self) -> EntityHint<'_, IngredientId> {
        EntityHint {
            id: self.ingredient_id,
            name: self.ingredient_name.as_deref(),
        }
    }

    /// Supplier name, trimmed, if one was recorded
    #[must_use]
    pub fn supplier_name(&self) -> Option<&str> {
        self.supplier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
