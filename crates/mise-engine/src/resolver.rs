// ABOUTME: Three-tier entity resolution from weakly keyed records to canonical catalog entries
// ABOUTME: Exact identifier, then exact normalized name, then substring candidates ranked by recency
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Entity Resolution
//!
//! Price events and other historical records reference ingredients by an
//! identifier, a free-text name, or both, and those references survive
//! renames. [`EntityResolver`] resolves such a hint against a candidate set
//! using three tiers, in order:
//!
//! 1. exact identifier
//! 2. case-insensitive, trimmed, exact name
//! 3. case-insensitive substring containment in either direction
//!
//! The first tier that produces exactly one candidate wins. Several matches
//! come back as [`Resolution::FuzzyName`] candidates, most recently active
//! first, so callers can tell a confident match from an ambiguous one.

use std::cmp::Ordering;

use chrono::NaiveDate;
use mise_core::constants::resolution::FUZZY_MIN_HINT_LEN;
use mise_core::models::{EntityHint, Ingredient, IngredientId, Recipe, RecipeId};
use tracing::{debug, warn};

/// An entity that historical records may reference loosely
pub trait Resolvable {
    /// Identifier type
    type Id: Copy + Eq;

    /// Stable identifier
    fn resolvable_id(&self) -> Self::Id;

    /// Current display name
    fn resolvable_name(&self) -> &str;

    /// Whether the entity is still active
    fn is_active(&self) -> bool;

    /// Last date the entity changed, if known
    fn last_active(&self) -> Option<NaiveDate>;
}

impl Resolvable for Ingredient {
    type Id = IngredientId;

    fn resolvable_id(&self) -> IngredientId {
        self.id
    }

    fn resolvable_name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn last_active(&self) -> Option<NaiveDate> {
        self.updated_at
    }
}

impl Resolvable for Recipe {
    type Id = RecipeId;

    fn resolvable_id(&self) -> RecipeId {
        self.id
    }

    fn resolvable_name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn last_active(&self) -> Option<NaiveDate> {
        self.updated_at
    }
}

/// Outcome of resolving a hint
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a, T> {
    /// Tier 1: identifier matched
    ExactId(&'a T),
    /// Tier 2: exactly one normalized name matched
    ExactName(&'a T),
    /// Tier 2 with several matches, or tier 3: candidates, preferred first
    FuzzyName(Vec<&'a T>),
    /// Nothing matched
    Unresolved,
}

impl<'a, T> Resolution<'a, T> {
    /// Preferred candidate, if any
    #[must_use]
    pub fn best(&self) -> Option<&'a T> {
        match self {
            Self::ExactId(t) | Self::ExactName(t) => Some(*t),
            Self::FuzzyName(candidates) => candidates.first().copied(),
            Self::Unresolved => None,
        }
    }

    /// Whether the match came from an exact tier
    #[must_use]
    pub const fn is_confident(&self) -> bool {
        matches!(self, Self::ExactId(_) | Self::ExactName(_))
    }

    /// Whether several candidates matched
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::FuzzyName(c) if c.len() > 1)
    }

    /// Number of candidates behind this resolution
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        match self {
            Self::ExactId(_) | Self::ExactName(_) => 1,
            Self::FuzzyName(c) => c.len(),
            Self::Unresolved => 0,
        }
    }
}

/// Resolves hints against a fixed candidate set
#[derive(Debug, Clone, Copy)]
pub struct EntityResolver<'a, T> {
    candidates: &'a [T],
    fuzzy_min_hint_len: usize,
}

impl<'a, T: Resolvable> EntityResolver<'a, T> {
    /// Create a resolver with the default fuzzy hint length
    #[must_use]
    pub const fn new(candidates: &'a [T]) -> Self {
        Self {
            candidates,
            fuzzy_min_hint_len: FUZZY_MIN_HINT_LEN,
        }
    }

    /// Override the shortest contained name a substring match accepts
    #[must_use]
    pub const fn with_fuzzy_min_hint_len(mut self, len: usize) -> Self {
        self.fuzzy_min_hint_len = len;
        self
    }

    /// Candidate set
    #[must_use]
    pub const fn candidates(&self) -> &'a [T] {
        self.candidates
    }

    /// Look up by identifier only
    #[must_use]
    pub fn by_id(&self, id: T::Id) -> Option<&'a T> {
        self.candidates.iter().find(|c| c.resolvable_id() == id)
    }

    /// Resolve a hint through the three tiers
    #[must_use]
    pub fn resolve(&self, hint: EntityHint<'_, T::Id>) -> Resolution<'a, T> {
        if let Some(found) = hint.id.and_then(|id| self.by_id(id)) {
            return Resolution::ExactId(found);
        }

        let Some(name) = hint.trimmed_name() else {
            debug!("Entity hint has no usable identifier or name");
            return Resolution::Unresolved;
        };
        let needle = normalize(name);

        let mut exact: Vec<&'a T> = self
            .candidates
            .iter()
            .filter(|c| normalize(c.resolvable_name()) == needle)
            .collect();
        match exact.len() {
            0 => {}
            1 => return Resolution::ExactName(exact[0]),
            n => {
                warn!(hint = name, candidates = n, "Ambiguous exact name match");
                sort_by_preference(&mut exact);
                return Resolution::FuzzyName(exact);
            }
        }

        let min_len = self.fuzzy_min_hint_len;
        // The contained side must be long enough, whichever direction matched.
        let long_enough = |fragment: &str| fragment.chars().count() >= min_len;
        let mut fuzzy: Vec<&'a T> = self
            .candidates
            .iter()
            .filter(|c| {
                let candidate = normalize(c.resolvable_name());
                !candidate.is_empty()
                    && ((long_enough(&needle) && candidate.contains(&needle))
                        || (long_enough(&candidate) && needle.contains(&candidate)))
            })
            .collect();

        if fuzzy.is_empty() {
            debug!(hint = name, "No catalog entry matches hint");
            return Resolution::Unresolved;
        }
        if fuzzy.len() > 1 {
            warn!(
                hint = name,
                candidates = fuzzy.len(),
                "Ambiguous substring match, preferring most recently active"
            );
        }
        sort_by_preference(&mut fuzzy);
        Resolution::FuzzyName(fuzzy)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

// Active before inactive, then latest activity first; stable for ties.
fn sort_by_preference<T: Resolvable>(candidates: &mut [&T]) {
    candidates.sort_by(|a, b| match b.is_active().cmp(&a.is_active()) {
        Ordering::Equal => b.last_active().cmp(&a.last_active()),
        other => other,
    });
}
