// ABOUTME: In-memory snapshot of the catalog, price event log, and recipes loaded from JSON
// ABOUTME: Assigns insertion order to price events and resolves CLI references to entities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Snapshot loading
//!
//! The engines consume already-materialized collections. A snapshot is the
//! file form of those collections; every collection may be missing.
//!
//! ```json
//! {
//!   "ingredients": [{ "id": "...", "name": "Beef", "unit": "kg", "current_price": 12.0 }],
//!   "price_events": [{ "ingredient_name": "beef", "date": "2024-01-01", "new_price": 10.0 }],
//!   "recipes": []
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mise_core::models::{EntityHint, Ingredient, IngredientId, PriceEvent, Recipe, RecipeId};
use mise_engine::config::EngineConfig;
use mise_engine::history::PriceIndex;
use mise_engine::resolver::{EntityResolver, Resolution, Resolvable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Catalog, price log, and recipes at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Catalog ingredients
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Append-only price event log, in insertion order
    #[serde(default)]
    pub price_events: Vec<PriceEvent>,
    /// Recipes with their preparation arenas
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl Snapshot {
    /// Parse a snapshot from JSON
    ///
    /// Events without a sequence get their position in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        let mut snapshot: Self = serde_json::from_str(json).context("Invalid snapshot JSON")?;
        for (position, event) in snapshot.price_events.iter_mut().enumerate() {
            if event.sequence == 0 {
                event.sequence = position as u64 + 1;
            }
        }
        Ok(snapshot)
    }

    /// Load a snapshot file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::from_json(&json)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        info!(
            ingredients = snapshot.ingredients.len(),
            price_events = snapshot.price_events.len(),
            recipes = snapshot.recipes.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Build the price index for this snapshot
    #[must_use]
    pub fn price_index(&self, config: &EngineConfig) -> PriceIndex<'_> {
        PriceIndex::build_with(
            &self.ingredients,
            &self.price_events,
            config.resolution.fuzzy_min_hint_len,
        )
    }

    /// Find a recipe by identifier or name
    ///
    /// Substring matching follows the same resolution settings as
    /// [`Snapshot::price_index`].
    ///
    /// # Errors
    ///
    /// Returns an error if nothing matches
    pub fn resolve_recipe(&self, reference: &str, config: &EngineConfig) -> Result<&Recipe> {
        resolve_reference::<Recipe, RecipeId>(&self.recipes, reference, "recipe", config)
    }

    /// Find an ingredient by identifier or name
    ///
    /// # Errors
    ///
    /// Returns an error if nothing matches
    pub fn resolve_ingredient(&self, reference: &str, config: &EngineConfig) -> Result<&Ingredient> {
        resolve_reference::<Ingredient, IngredientId>(&self.ingredients, reference, "ingredient", config)
    }
}

fn resolve_reference<'a, T, Id>(
    candidates: &'a [T],
    reference: &str,
    kind: &str,
    config: &EngineConfig,
) -> Result<&'a T>
where
    T: Resolvable<Id = Id>,
    Id: Copy + Eq + std::str::FromStr,
{
    let hint = EntityHint {
        id: reference.trim().parse::<Id>().ok(),
        name: Some(reference),
    };
    let resolution = EntityResolver::new(candidates)
        .with_fuzzy_min_hint_len(config.resolution.fuzzy_min_hint_len)
        .resolve(hint);
    if resolution.is_ambiguous() {
        let names: Vec<&str> = match &resolution {
            Resolution::FuzzyName(found) => found.iter().map(|c| c.resolvable_name()).collect(),
            _ => Vec::new(),
        };
        warn!(reference, candidates = ?names, "Ambiguous {kind} reference, using best match");
    }
    match resolution.best() {
        Some(found) => Ok(found),
        None => bail!("No {kind} matches '{reference}'"),
    }
}
