// ABOUTME: Per-line yield chain: stage losses, overall yield, net price, and line cost
// ABOUTME: Works only over the stages enabled for the line and the weights actually recorded
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Yield Chain
//!
//! For one ingredient line the calculator derives:
//!
//! - a loss per enabled stage: `(input - output) / input * 100`
//! - the overall yield: last recorded weight over first recorded weight
//! - the net price per usable base unit: `price / (yield / 100)`
//! - the line cost, charged on the first (bruto) weight
//!
//! Stage boundaries:
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | thaw | frozen | thawed |
//! | clean | thawed (raw) | clean |
//! | cook | pre-cook, else last weight before it | cooked |
//! | portion | pre-portion, else last weight before it | portioned |

use mise_core::constants::{validation::STAGE_GAIN_TOLERANCE_PCT, EPSILON};
use mise_core::errors::ErrorCode;
use mise_core::models::{IngredientId, IngredientLine, ProcessStage, StageWeights, WeightPoint};
use mise_core::units::{convert, to_kilograms, Unit};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::issues::Issue;
use crate::pricing::PriceQuote;

/// Loss across one processing stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageLoss {
    /// Stage
    pub stage: ProcessStage,
    /// Weight entering the stage
    pub input_weight: f64,
    /// Weight leaving the stage
    pub output_weight: f64,
    /// Weight lost, percent of input (negative on a gain)
    pub loss_pct: f64,
    /// Output over input, percent
    pub yield_pct: f64,
}

/// Everything derived from one ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineYield {
    /// Ingredient of the line
    pub ingredient_id: IngredientId,
    /// Unit the weights are expressed in
    pub unit: Unit,
    /// First recorded weight (bruto)
    pub initial_weight: f64,
    /// Last recorded weight (usable)
    pub final_weight: f64,
    /// Per-stage losses for the enabled stages with both weights recorded
    pub losses: Vec<StageLoss>,
    /// Overall yield, percent (0 when the initial weight is 0)
    pub yield_pct: f64,
    /// Price the line was costed at
    pub quote: PriceQuote,
    /// Price per kilogram, liter, or counted unit of the line's dimension
    pub price_per_base: Option<f64>,
    /// Price per usable base unit after losses
    pub net_price_per_base: Option<f64>,
    /// Cost of the purchased (initial) weight
    pub cost: f64,
    /// Initial weight in kilograms (0 for counted lines)
    pub bruto_kg: f64,
    /// Final weight in kilograms (0 for counted lines)
    pub yield_kg: f64,
    /// Data gaps and inconsistencies found on the line
    pub issues: Vec<Issue>,
}

/// Computes [`LineYield`]s
#[derive(Debug, Clone, Copy)]
pub struct YieldChainCalculator {
    stage_gain_tolerance_pct: f64,
}

impl Default for YieldChainCalculator {
    fn default() -> Self {
        Self::new(STAGE_GAIN_TOLERANCE_PCT)
    }
}

impl YieldChainCalculator {
    /// Create a calculator that tolerates `stage_gain_tolerance_pct` of gain per stage
    #[must_use]
    pub const fn new(stage_gain_tolerance_pct: f64) -> Self {
        Self {
            stage_gain_tolerance_pct,
        }
    }

    /// Losses across the enabled stages of a line
    #[must_use]
    pub fn stage_losses(weights: &StageWeights, enabled: &[ProcessStage]) -> Vec<StageLoss> {
        ProcessStage::LOSS_STAGES
            .iter()
            .filter(|stage| enabled.contains(stage))
            .filter_map(|&stage| {
                let (input, output) = stage_boundaries(stage)?;
                let input_weight = weights.get(input).or_else(|| weights.last_before(input))?;
                let output_weight = weights.get(output)?;
                let (loss_pct, yield_pct) = if input_weight.abs() < EPSILON {
                    (0.0, 0.0)
                } else {
                    (
                        (input_weight - output_weight) / input_weight * 100.0,
                        output_weight / input_weight * 100.0,
                    )
                };
                Some(StageLoss {
                    stage,
                    input_weight,
                    output_weight,
                    loss_pct,
                    yield_pct,
                })
            })
            .collect()
    }

    /// Compute the yield chain of `line` costed at `quote`
    #[must_use]
    pub fn compute(
        &self,
        line: &IngredientLine,
        preparation_stages: &[ProcessStage],
        quote: PriceQuote,
    ) -> LineYield {
        let mut issues = Vec::new();
        let label = line.ingredient_name.as_deref().unwrap_or("ingredient line");

        let recorded = line.weights.recorded();
        let (initial_weight, final_weight) = match (recorded.first(), recorded.last()) {
            (Some(&(_, first)), Some(&(_, last))) => (first, last),
            _ => {
                issues.push(
                    Issue::data_gap(
                        ErrorCode::MissingWeight,
                        format!("'{label}' has no recorded weights, counted as zero"),
                    )
                    .with_ingredient(line.ingredient_id),
                );
                (0.0, 0.0)
            }
        };

        let losses = Self::stage_losses(&line.weights, line.enabled_stages(preparation_stages));
        for loss in &losses {
            if loss.yield_pct > 100.0 + self.stage_gain_tolerance_pct {
                issues.push(
                    Issue::inconsistency_warning(
                        ErrorCode::StageGain,
                        format!(
                            "'{label}' {} stage yields {:.1}%, check process weights",
                            loss.stage.label(),
                            loss.yield_pct
                        ),
                    )
                    .with_field(format!("{}_yield_pct", loss.stage.label()))
                    .with_ingredient(line.ingredient_id),
                );
            }
        }

        let yield_pct = if initial_weight.abs() < EPSILON {
            if !recorded.is_empty() {
                issues.push(
                    Issue::inconsistency_warning(
                        ErrorCode::ZeroWeightLine,
                        format!("'{label}' has zero initial weight"),
                    )
                    .with_field("initial_weight")
                    .with_ingredient(line.ingredient_id),
                );
            }
            0.0
        } else {
            final_weight / initial_weight * 100.0
        };

        let price_per_base = convert(1.0, line.unit.base(), quote.unit)
            .ok()
            .map(|quote_units| quote.price * quote_units);
        let net_price_per_base = match price_per_base {
            Some(price) if yield_pct > EPSILON => Some(price / (yield_pct / 100.0)),
            Some(_) => {
                issues.push(
                    Issue::data_gap(
                        ErrorCode::DivisionUndefined,
                        format!("'{label}' has zero yield, net price is not available"),
                    )
                    .with_field("net_price")
                    .with_ingredient(line.ingredient_id),
                );
                None
            }
            None => None,
        };

        let cost = match convert(initial_weight, line.unit, quote.unit) {
            Ok(quantity) => quote.price * quantity,
            Err(e) => {
                issues.push(
                    Issue::data_gap(
                        ErrorCode::UnitMismatch,
                        format!("'{label}' cannot be priced: {e}"),
                    )
                    .with_field("cost")
                    .with_ingredient(line.ingredient_id),
                );
                0.0
            }
        };

        let (bruto_kg, yield_kg) = match (
            to_kilograms(initial_weight, line.unit),
            to_kilograms(final_weight, line.unit),
        ) {
            (Ok(bruto), Ok(usable)) => (bruto, usable),
            // Counted lines carry cost but no kilograms.
            _ if !line.unit.is_weighable() => (0.0, 0.0),
            (Err(e), _) | (_, Err(e)) => {
                issues.push(
                    Issue::data_gap(
                        ErrorCode::UnitMismatch,
                        format!("'{label}' weight does not count toward kilograms: {e}"),
                    )
                    .with_field("weight")
                    .with_ingredient(line.ingredient_id),
                );
                (0.0, 0.0)
            }
        };

        debug!(
            ingredient = %line.ingredient_id,
            yield_pct,
            cost,
            "Computed line yield"
        );

        LineYield {
            ingredient_id: line.ingredient_id,
            unit: line.unit,
            initial_weight,
            final_weight,
            losses,
            yield_pct,
            quote,
            price_per_base,
            net_price_per_base,
            cost,
            bruto_kg,
            yield_kg,
            issues,
        }
    }
}

const fn stage_boundaries(stage: ProcessStage) -> Option<(WeightPoint, WeightPoint)> {
    match stage {
        ProcessStage::Thaw => Some((WeightPoint::Frozen, WeightPoint::Thawed)),
        ProcessStage::Clean => Some((WeightPoint::Thawed, WeightPoint::Clean)),
        ProcessStage::Cook => Some((WeightPoint::PreCook, WeightPoint::Cooked)),
        ProcessStage::Portion => Some((WeightPoint::PrePortion, WeightPoint::Portioned)),
        ProcessStage::Assemble => None,
    }
}
