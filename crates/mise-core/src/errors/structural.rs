// ABOUTME: Fatal structural errors in a recipe's composition graph
// ABOUTME: Cycles, dangling sub-component references, and duplicate arena identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use thiserror::Error;

use super::ErrorCode;
use crate::models::{PreparationId, RecipeId};

/// The composition graph of a recipe cannot be evaluated
///
/// Aborts the computation for the affected recipe only; batch callers keep
/// processing the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Sub-component references loop back onto a preparation being evaluated
    #[error("recipe {recipe}: sub-component cycle through {}", format_path(.path))]
    Cycle {
        /// Recipe whose graph is cyclic
        recipe: RecipeId,
        /// Preparations on the cycle, first repeated at the end
        path: Vec<PreparationId>,
    },

    /// A sub-component points to a preparation absent from the arena
    #[error("recipe {recipe}: preparation {referenced_by} consumes missing preparation {missing}")]
    MissingPreparation {
        /// Recipe holding the dangling reference
        recipe: RecipeId,
        /// Preparation carrying the sub-component line
        referenced_by: PreparationId,
        /// Identifier that matched nothing
        missing: PreparationId,
    },

    /// Two preparations in the arena share an identifier
    #[error("recipe {recipe}: preparation {preparation} appears more than once")]
    DuplicatePreparation {
        /// Recipe holding the duplicates
        recipe: RecipeId,
        /// Repeated identifier
        preparation: PreparationId,
    },
}

impl StructuralError {
    /// Stable code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cycle { .. } => ErrorCode::CompositionCycle,
            Self::MissingPreparation { .. } => ErrorCode::MissingPreparation,
            Self::DuplicatePreparation { .. } => ErrorCode::DuplicatePreparation,
        }
    }

    /// Recipe the error belongs to
    #[must_use]
    pub const fn recipe(&self) -> RecipeId {
        match self {
            Self::Cycle { recipe, .. }
            | Self::MissingPreparation { recipe, .. }
            | Self::DuplicatePreparation { recipe, .. } => *recipe,
        }
    }
}

fn format_path(path: &[PreparationId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
