// ABOUTME: Non-fatal findings collected by the engines (data gaps and inconsistencies)
// ABOUTME: Issue carries severity, stable code, message, and the stored/corrected values when known
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use mise_core::errors::ErrorCode;
use mise_core::models::{IngredientId, PreparationId};
use serde::{Deserialize, Serialize};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Needs operator attention before the figures can be trusted
    Error,
    /// Worth a look; figures are still usable
    Warning,
}

/// Class of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Input was missing or unusable and a fallback was applied
    DataGap,
    /// Stored data disagrees with the recomputed figure
    Inconsistency,
}

/// A single finding for the operator to review
///
/// The engines never apply `corrected_value` themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Error or warning
    pub severity: Severity,
    /// Data gap or inconsistency
    pub kind: IssueKind,
    /// Stable code
    pub code: ErrorCode,
    /// Human-readable explanation
    pub message: String,
    /// Field the finding is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Value currently stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_value: Option<f64>,
    /// Recomputed value the caller may apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_value: Option<f64>,
    /// Preparation the finding belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation_id: Option<PreparationId>,
    /// Ingredient the finding belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<IngredientId>,
}

impl Issue {
    fn build(severity: Severity, kind: IssueKind, code: ErrorCode, message: String) -> Self {
        Self {
            severity,
            kind,
            code,
            message,
            field: None,
            stored_value: None,
            corrected_value: None,
            preparation_id: None,
            ingredient_id: None,
        }
    }

    /// Data gap resolved to a fallback (always a warning)
    #[must_use]
    pub fn data_gap(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(Severity::Warning, IssueKind::DataGap, code, message.into())
    }

    /// Inconsistency severe enough to be an error
    #[must_use]
    pub fn inconsistency_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(Severity::Error, IssueKind::Inconsistency, code, message.into())
    }

    /// Inconsistency reported as a warning
    #[must_use]
    pub fn inconsistency_warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(Severity::Warning, IssueKind::Inconsistency, code, message.into())
    }

    /// Attach the field name
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attach the stored and recomputed values
    #[must_use]
    pub fn with_values(mut self, stored: Option<f64>, corrected: Option<f64>) -> Self {
        self.stored_value = stored;
        self.corrected_value = corrected;
        self
    }

    /// Attach the preparation
    #[must_use]
    pub fn with_preparation(mut self, preparation_id: PreparationId) -> Self {
        self.preparation_id = Some(preparation_id);
        self
    }

    /// Attach the ingredient
    #[must_use]
    pub fn with_ingredient(mut self, ingredient_id: IngredientId) -> Self {
        self.ingredient_id = Some(ingredient_id);
        self
    }

    /// Whether this finding is an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
