// ABOUTME: Core data models for ingredients, price events, and recipe composition
// ABOUTME: Re-exports identifiers, Ingredient, PriceEvent, Recipe, Preparation, and line types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Data Models
//!
//! In-memory snapshot types handed to the engines by the persistence layer.
//! The engines never mutate them.
//!
//! ## Core Models
//!
//! - `Ingredient`: catalog entry with its current purchase price
//! - `PriceEvent`: append-only, loosely keyed price change
//! - `Recipe`: arena of `Preparation`s linked by `SubComponentLine`s
//! - `IngredientLine`: one ingredient with its per-stage weights

mod ids;
mod ingredient;
mod recipe;

pub use ids::{IngredientId, PreparationId, RecipeId};
pub use ingredient::{Ingredient, PriceEvent};
pub use recipe::{
    IngredientLine, Preparation, ProcessStage, Recipe, StageWeights, StoredTotals,
    SubComponentLine, WeightPoint,
};

/// Weak reference to an entity: an identifier, a free-text name, or both
///
/// Historical records were written across renames, so the two may disagree
/// with each other and with the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityHint<'a, Id> {
    /// Identifier, when known
    pub id: Option<Id>,
    /// Free-text name, when known
    pub name: Option<&'a str>,
}

impl<'a, Id> EntityHint<'a, Id> {
    /// Hint carrying only an identifier
    #[must_use]
    pub const fn id(id: Id) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    /// Hint carrying only a name
    #[must_use]
    pub const fn name(name: &'a str) -> Self {
        Self {
            id: None,
            name: Some(name),
        }
    }

    /// Name trimmed, if non-empty
    #[must_use]
    pub fn trimmed_name(&self) -> Option<&'a str> {
        self.name.map(str::trim).filter(|n| !n.is_empty())
    }
}
