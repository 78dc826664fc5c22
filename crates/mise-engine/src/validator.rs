// ABOUTME: Recipe validator diffing stored totals against freshly recomputed ones
// ABOUTME: Classifies drift into errors and warnings and proposes corrected values, never applies them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use mise_core::constants::EPSILON;
use mise_core::errors::{ErrorCode, StructuralError};
use mise_core::models::{Recipe, RecipeId, StoredTotals};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::composition::{CompositionAggregator, RecipeTotals};
use crate::config::ValidationConfig;
use crate::issues::{Issue, Severity};
use crate::pricing::RecordedPrices;

/// Stored figures, recomputed figures, and the findings between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Recipe
    pub recipe_id: RecipeId,
    /// Recipe name
    pub recipe_name: String,
    /// Totals cached with the recipe
    pub stored: StoredTotals,
    /// Totals recomputed from the recipe's lines
    pub recomputed: RecipeTotals,
    /// Findings, errors first
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Whether any finding is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    /// Number of findings with `severity`
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Recomputes recipe totals and diffs them against the cached ones
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeValidator {
    config: ValidationConfig,
    aggregator: CompositionAggregator,
}

impl RecipeValidator {
    /// Create a validator with the given tolerances
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self {
            aggregator: CompositionAggregator::new(&config),
            config,
        }
    }

    /// Validate one recipe against its recorded line prices
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] when the recipe cannot be recomputed.
    pub fn validate(&self, recipe: &Recipe) -> Result<ValidationReport, StructuralError> {
        let recomputed = self
            .aggregator
            .compute_recipe_totals(recipe, &RecordedPrices)?;
        let stored = recipe.stored;

        let mut issues = self.diff(&stored, &recomputed);
        issues.extend(recomputed.issues.iter().cloned());
        issues.sort_by_key(|i| i.severity);

        debug!(
            recipe = %recipe.id,
            issues = issues.len(),
            "Validated recipe"
        );

        Ok(ValidationReport {
            recipe_id: recipe.id,
            recipe_name: recipe.name.clone(),
            stored,
            recomputed,
            issues,
        })
    }

    fn diff(&self, stored: &StoredTotals, recomputed: &RecipeTotals) -> Vec<Issue> {
        let mut issues = Vec::new();

        for (field, stored_value, value) in [
            ("bruto_weight", stored.bruto_weight, recomputed.bruto_weight),
            ("yield_weight", stored.yield_weight, recomputed.yield_weight),
        ] {
            if let Some(s) = stored_value {
                if (s - value).abs() > self.config.weight_tolerance_kg {
                    issues.push(
                        Issue::inconsistency_error(
                            ErrorCode::WeightDrift,
                            format!("stored {field} {s:.3} kg differs from recomputed {value:.3} kg"),
                        )
                        .with_field(field)
                        .with_values(Some(s), Some(value)),
                    );
                }
            }
        }

        if let Some(issue) = cost_drift(
            "cost_per_kg_raw",
            stored.cost_per_kg_raw,
            recomputed.cost_per_kg_raw,
            self.config.cost_per_kg_raw_tolerance_pct,
        ) {
            issues.push(issue.into_issue(Severity::Error));
        }
        if let Some(issue) = cost_drift(
            "cost_per_kg_yield",
            stored.cost_per_kg_yield,
            recomputed.cost_per_kg_yield,
            self.config.cost_per_kg_yield_tolerance_pct,
        ) {
            issues.push(issue.into_issue(Severity::Warning));
        }

        if let (Some(bruto), Some(yield_weight)) = (stored.bruto_weight, stored.yield_weight) {
            if yield_weight > bruto + EPSILON {
                issues.push(
                    Issue::inconsistency_error(
                        ErrorCode::ImpossibleYield,
                        format!(
                            "stored yield weight {yield_weight:.3} kg exceeds stored bruto weight {bruto:.3} kg"
                        ),
                    )
                    .with_field("yield_weight")
                    .with_values(Some(yield_weight), Some(recomputed.yield_weight)),
                );
            }
        }
        if recomputed.yield_weight > recomputed.bruto_weight + EPSILON {
            issues.push(
                Issue::inconsistency_error(
                    ErrorCode::ImpossibleYield,
                    format!(
                        "recomputed yield weight {:.3} kg exceeds recomputed bruto weight {:.3} kg",
                        recomputed.yield_weight, recomputed.bruto_weight
                    ),
                )
                .with_field("yield_weight"),
            );
        }

        issues
    }
}

struct CostDrift {
    field: &'static str,
    stored: f64,
    recomputed: f64,
    diff_pct: Option<f64>,
}

impl CostDrift {
    fn into_issue(self, severity: Severity) -> Issue {
        let message = self.diff_pct.map_or_else(
            || {
                format!(
                    "stored {} {:.2} but recomputed cost is zero",
                    self.field, self.stored
                )
            },
            |pct| {
                format!(
                    "stored {} {:.2} differs from recomputed {:.2} by {pct:.1}%",
                    self.field, self.stored, self.recomputed
                )
            },
        );
        let issue = match severity {
            Severity::Error => Issue::inconsistency_error(ErrorCode::CostDrift, message),
            Severity::Warning => Issue::inconsistency_warning(ErrorCode::CostDrift, message),
        };
        issue
            .with_field(self.field)
            .with_values(Some(self.stored), Some(self.recomputed))
    }
}

fn cost_drift(
    field: &'static str,
    stored: Option<f64>,
    recomputed: Option<f64>,
    tolerance_pct: f64,
) -> Option<CostDrift> {
    let (stored, recomputed) = stored.zip(recomputed)?;
    if recomputed.abs() < EPSILON {
        return (stored.abs() > EPSILON).then_some(CostDrift {
            field,
            stored,
            recomputed,
            diff_pct: None,
        });
    }
    let diff_pct = ((stored - recomputed) / recomputed).abs() * 100.0;
    (diff_pct > tolerance_pct).then_some(CostDrift {
        field,
        stored,
        recomputed,
        diff_pct: Some(diff_pct),
    })
}
