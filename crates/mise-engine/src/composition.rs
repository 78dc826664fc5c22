// ABOUTME: Composition aggregator walking a recipe's preparation arena into recipe totals
// ABOUTME: Each preparation is evaluated once; sub-components are consumed as atomic inputs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! # Composition Aggregator
//!
//! A recipe holds its preparations in an arena; sub-component lines refer to
//! other arena entries by identifier, forming a DAG. The aggregator:
//!
//! 1. indexes the arena, rejecting duplicate identifiers
//! 2. evaluates every preparation depth-first with a visiting stack, so a
//!    cycle or a dangling reference aborts the recipe with a
//!    [`StructuralError`]
//! 3. memoizes each preparation, so a shared sub-component is computed once
//!    no matter how many parents consume it
//! 4. sums the preparations nobody consumes into the recipe totals
//!
//! A sub-component contributes its yield weight as both bruto and yield
//! weight of the consuming preparation, plus its cost. A partial
//! `consumed_weight` scales the cost by the consumed fraction of the output.
//!
//! Consumers of one sub-component share a single output: fractions are
//! granted in evaluation order and never sum past 1, so a sub-component's
//! cost reaches the recipe total at most once. A consumer asking for more
//! than what is left gets the remainder and an over-allocation error.

use std::collections::HashMap;

use mise_core::constants::EPSILON;
use mise_core::errors::{ErrorCode, StructuralError};
use mise_core::models::{
    IngredientId, Preparation, PreparationId, Recipe, RecipeId, SubComponentLine,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ValidationConfig;
use crate::issues::Issue;
use crate::pricing::PriceSource;
use crate::yield_chain::{LineYield, YieldChainCalculator};

/// One ingredient's share of a preparation or recipe total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientBreakdown {
    /// Preparation holding the ingredient line
    pub preparation_id: PreparationId,
    /// Ingredient
    pub ingredient_id: IngredientId,
    /// Name on the recipe card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredient_name: Option<String>,
    /// Bruto weight attributed to the total (kg)
    pub bruto_weight: f64,
    /// Yield weight attributed to the total (kg)
    pub yield_weight: f64,
    /// Cost attributed to the total
    pub cost: f64,
    /// Line yield, percent
    pub yield_pct: f64,
    /// Price per usable base unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_price_per_base: Option<f64>,
    /// Fraction of the line that reaches the total (below 1 through partial sub-components)
    pub share: f64,
}

impl IngredientBreakdown {
    fn from_line(preparation_id: PreparationId, name: Option<&str>, line: &LineYield) -> Self {
        Self {
            preparation_id,
            ingredient_id: line.ingredient_id,
            ingredient_name: name.map(str::to_owned),
            bruto_weight: line.bruto_kg,
            yield_weight: line.yield_kg,
            cost: line.cost,
            yield_pct: line.yield_pct,
            net_price_per_base: line.net_price_per_base,
            share: 1.0,
        }
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            bruto_weight: self.bruto_weight * fraction,
            yield_weight: self.yield_weight * fraction,
            cost: self.cost * fraction,
            share: self.share * fraction,
            ..self.clone()
        }
    }
}

/// How a preparation consumed one sub-component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubComponentUse {
    /// Consumed preparation
    pub preparation_id: PreparationId,
    /// Fraction of its output consumed
    pub fraction: f64,
    /// Bruto weight contributed (kg)
    pub bruto_weight: f64,
    /// Yield weight contributed (kg)
    pub yield_weight: f64,
    /// Cost contributed
    pub cost: f64,
}

/// Totals of one preparation, sub-components included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparationTotals {
    /// Preparation
    pub preparation_id: PreparationId,
    /// Title
    pub title: String,
    /// Bruto weight (kg)
    pub bruto_weight: f64,
    /// Yield weight (kg)
    pub yield_weight: f64,
    /// Cost
    pub cost: f64,
    /// Yield chains of the preparation's own ingredient lines
    pub lines: Vec<LineYield>,
    /// Consumed sub-components
    pub sub_components: Vec<SubComponentUse>,
    /// Every ingredient reaching this preparation, sub-components expanded
    pub breakdown: Vec<IngredientBreakdown>,
    /// Findings local to this preparation
    pub issues: Vec<Issue>,
}

/// Recipe-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTotals {
    /// Recipe
    pub recipe_id: RecipeId,
    /// Sum of top-level bruto weights (kg)
    pub bruto_weight: f64,
    /// Sum of top-level yield weights (kg)
    pub yield_weight: f64,
    /// Sum of top-level costs
    pub total_cost: f64,
    /// Cost per bruto kilogram, undefined at zero bruto weight
    pub cost_per_kg_raw: Option<f64>,
    /// Cost per yield kilogram, undefined at zero yield weight
    pub cost_per_kg_yield: Option<f64>,
    /// Cost of one cuba, when the recipe has a cuba weight
    pub cuba_cost: Option<f64>,
    /// Per-ingredient contributions to the totals
    pub breakdown: Vec<IngredientBreakdown>,
    /// Every preparation in arena order
    pub preparations: Vec<PreparationTotals>,
    /// Findings from every preparation plus the totals themselves
    pub issues: Vec<Issue>,
}

impl RecipeTotals {
    /// Totals of one preparation
    #[must_use]
    pub fn preparation(&self, id: PreparationId) -> Option<&PreparationTotals> {
        self.preparations.iter().find(|p| p.preparation_id == id)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Visiting,
    Done,
}

/// Walks preparation arenas into [`RecipeTotals`]
#[derive(Debug, Clone, Copy)]
pub struct CompositionAggregator {
    calculator: YieldChainCalculator,
    sub_component_tolerance_pct: f64,
}

impl Default for CompositionAggregator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl CompositionAggregator {
    /// Create an aggregator with the given tolerances
    #[must_use]
    pub const fn new(config: &ValidationConfig) -> Self {
        Self {
            calculator: YieldChainCalculator::new(config.stage_gain_tolerance_pct),
            sub_component_tolerance_pct: config.sub_component_tolerance_pct,
        }
    }

    /// Compute recipe totals with prices from `prices`
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] when the arena has duplicate identifiers,
    /// a dangling sub-component reference, or a cycle.
    pub fn compute_recipe_totals<P>(
        &self,
        recipe: &Recipe,
        prices: &P,
    ) -> Result<RecipeTotals, StructuralError>
    where
        P: PriceSource + ?Sized,
    {
        let preparations = self.evaluate(recipe, prices)?;
        let consumed = recipe.consumed_preparations();

        let mut bruto_weight = 0.0;
        let mut yield_weight = 0.0;
        let mut total_cost = 0.0;
        let mut breakdown = Vec::new();
        let mut issues: Vec<Issue> = preparations
            .iter()
            .flat_map(|p| p.issues.iter().cloned())
            .collect();

        for prep in preparations
            .iter()
            .filter(|p| !consumed.contains(&p.preparation_id))
        {
            bruto_weight += prep.bruto_weight;
            yield_weight += prep.yield_weight;
            total_cost += prep.cost;
            breakdown.extend(prep.breakdown.iter().cloned());
        }

        let cost_per_kg_raw = per_kilogram(total_cost, bruto_weight, "cost_per_kg_raw", &mut issues);
        let cost_per_kg_yield =
            per_kilogram(total_cost, yield_weight, "cost_per_kg_yield", &mut issues);
        let cuba_cost = recipe
            .cuba_weight
            .filter(|w| *w > 0.0)
            .zip(cost_per_kg_yield)
            .map(|(weight, per_kg)| weight * per_kg);

        debug!(
            recipe = %recipe.id,
            bruto_weight,
            yield_weight,
            total_cost,
            "Computed recipe totals"
        );

        Ok(RecipeTotals {
            recipe_id: recipe.id,
            bruto_weight,
            yield_weight,
            total_cost,
            cost_per_kg_raw,
            cost_per_kg_yield,
            cuba_cost,
            breakdown,
            preparations,
            issues,
        })
    }

    /// Evaluate every preparation of the arena, in arena order
    ///
    /// # Errors
    ///
    /// Same conditions as [`CompositionAggregator::compute_recipe_totals`].
    pub fn evaluate<P>(
        &self,
        recipe: &Recipe,
        prices: &P,
    ) -> Result<Vec<PreparationTotals>, StructuralError>
    where
        P: PriceSource + ?Sized,
    {
        let mut index = HashMap::with_capacity(recipe.preparations.len());
        for (position, prep) in recipe.preparations.iter().enumerate() {
            if index.insert(prep.id, position).is_some() {
                return Err(StructuralError::DuplicatePreparation {
                    recipe: recipe.id,
                    preparation: prep.id,
                });
            }
        }

        let mut walk = ArenaWalk {
            aggregator: self,
            recipe,
            prices,
            index,
            state: vec![VisitState::Unvisited; recipe.preparations.len()],
            memo: vec![None; recipe.preparations.len()],
            allocated: vec![0.0; recipe.preparations.len()],
            stack: Vec::new(),
        };
        for position in 0..recipe.preparations.len() {
            walk.visit(position)?;
        }

        Ok(walk.memo.into_iter().flatten().collect())
    }

    fn sub_component_drift(
        &self,
        line: &SubComponentLine,
        child: &PreparationTotals,
        parent: PreparationId,
    ) -> Vec<Issue> {
        let checks = [
            ("sub_component_yield_weight", line.stored_yield_weight, child.yield_weight),
            ("sub_component_cost", line.stored_cost, child.cost),
        ];
        checks
            .into_iter()
            .filter_map(|(field, stored, recomputed)| {
                let stored = stored?;
                let drifted = if recomputed.abs() < EPSILON {
                    stored.abs() > EPSILON
                } else {
                    ((stored - recomputed) / recomputed).abs() * 100.0
                        > self.sub_component_tolerance_pct
                };
                drifted.then(|| {
                    Issue::inconsistency_warning(
                        ErrorCode::SubComponentDrift,
                        format!(
                            "cached {field} of '{}' is {stored:.3}, recomputed {recomputed:.3}",
                            child.title
                        ),
                    )
                    .with_field(field)
                    .with_values(Some(stored), Some(recomputed))
                    .with_preparation(parent)
                })
            })
            .collect()
    }

    /// Fraction of the child's output one line asks for, before sharing
    fn requested_fraction(
        line: &SubComponentLine,
        child: &PreparationTotals,
        parent: PreparationId,
        issues: &mut Vec<Issue>,
    ) -> f64 {
        match line.consumed_weight {
            None => 1.0,
            Some(consumed) if child.yield_weight.abs() < EPSILON => {
                if consumed > EPSILON {
                    issues.push(
                        Issue::data_gap(
                            ErrorCode::DivisionUndefined,
                            format!(
                                "'{}' has zero yield weight, consuming its whole output",
                                child.title
                            ),
                        )
                        .with_field("consumed_weight")
                        .with_preparation(parent),
                    );
                }
                1.0
            }
            Some(consumed) if consumed > child.yield_weight + EPSILON => {
                issues.push(
                    Issue::inconsistency_warning(
                        ErrorCode::ConsumedBeyondOutput,
                        format!(
                            "consumes {consumed:.3} kg of '{}', which yields {:.3} kg",
                            child.title, child.yield_weight
                        ),
                    )
                    .with_field("consumed_weight")
                    .with_values(Some(consumed), Some(child.yield_weight))
                    .with_preparation(parent),
                );
                1.0
            }
            Some(consumed) => consumed.max(0.0) / child.yield_weight,
        }
    }

    fn consume(child: &PreparationTotals, fraction: f64) -> SubComponentUse {
        let weight = child.yield_weight * fraction;
        SubComponentUse {
            preparation_id: child.preparation_id,
            fraction,
            bruto_weight: weight,
            yield_weight: weight,
            cost: child.cost * fraction,
        }
    }
}

struct ArenaWalk<'r, 'p, P: ?Sized> {
    aggregator: &'r CompositionAggregator,
    recipe: &'r Recipe,
    prices: &'p P,
    index: HashMap<PreparationId, usize>,
    state: Vec<VisitState>,
    memo: Vec<Option<PreparationTotals>>,
    /// Fraction of each preparation's output already granted to consumers
    allocated: Vec<f64>,
    stack: Vec<PreparationId>,
}

impl<P: PriceSource + ?Sized> ArenaWalk<'_, '_, P> {
    fn visit(&mut self, position: usize) -> Result<(), StructuralError> {
        let recipe = self.recipe;
        let prep = &recipe.preparations[position];
        match self.state[position] {
            VisitState::Done => return Ok(()),
            VisitState::Visiting => {
                let start = self
                    .stack
                    .iter()
                    .position(|id| *id == prep.id)
                    .unwrap_or(0);
                let mut path = self.stack[start..].to_vec();
                path.push(prep.id);
                warn!(recipe = %recipe.id, "Sub-component cycle detected");
                return Err(StructuralError::Cycle {
                    recipe: recipe.id,
                    path,
                });
            }
            VisitState::Unvisited => {}
        }

        self.state[position] = VisitState::Visiting;
        self.stack.push(prep.id);

        for line in &prep.sub_components {
            let child = self.index.get(&line.preparation_id).copied().ok_or(
                StructuralError::MissingPreparation {
                    recipe: recipe.id,
                    referenced_by: prep.id,
                    missing: line.preparation_id,
                },
            )?;
            self.visit(child)?;
        }

        let totals = self.total(prep);
        self.stack.pop();
        self.state[position] = VisitState::Done;
        self.memo[position] = Some(totals);
        Ok(())
    }

    fn total(&mut self, prep: &Preparation) -> PreparationTotals {
        let mut issues = Vec::new();
        let mut breakdown = Vec::new();
        let mut lines = Vec::with_capacity(prep.ingredients.len());

        for line in &prep.ingredients {
            let lookup = self.prices.quote(line);
            if let Some(issue) = lookup.issue {
                issues.push(issue.with_preparation(prep.id));
            }
            let computed = self
                .aggregator
                .calculator
                .compute(line, &prep.stages, lookup.quote);
            issues.extend(
                computed
                    .issues
                    .iter()
                    .cloned()
                    .map(|issue| issue.with_preparation(prep.id)),
            );
            breakdown.push(IngredientBreakdown::from_line(
                prep.id,
                line.ingredient_name.as_deref(),
                &computed,
            ));
            lines.push(computed);
        }

        let mut sub_components = Vec::with_capacity(prep.sub_components.len());
        for line in &prep.sub_components {
            // Children are always memoized before their parent.
            let Some(position) = self.index.get(&line.preparation_id).copied() else {
                continue;
            };
            let Some(child) = self.memo[position].as_ref() else {
                continue;
            };
            issues.extend(self.aggregator.sub_component_drift(line, child, prep.id));

            let requested =
                CompositionAggregator::requested_fraction(line, child, prep.id, &mut issues);
            let available = (1.0 - self.allocated[position]).max(0.0);
            let fraction = if requested > available + EPSILON {
                warn!(
                    preparation = %prep.id,
                    sub_component = %child.preparation_id,
                    requested,
                    available,
                    "Sub-component over-allocated"
                );
                issues.push(
                    Issue::inconsistency_error(
                        ErrorCode::SubComponentOverAllocated,
                        format!(
                            "'{}' takes {:.1}% of '{}', only {:.1}% of its output is left",
                            prep.title,
                            requested * 100.0,
                            child.title,
                            available * 100.0
                        ),
                    )
                    .with_field("consumed_fraction")
                    .with_values(Some(requested), Some(available))
                    .with_preparation(prep.id),
                );
                available
            } else {
                requested
            };
            self.allocated[position] += fraction;

            let used = CompositionAggregator::consume(child, fraction);
            breakdown.extend(child.breakdown.iter().map(|b| b.scaled(used.fraction)));
            sub_components.push(used);
        }

        let bruto_weight = lines.iter().map(|l| l.bruto_kg).sum::<f64>()
            + sub_components.iter().map(|s| s.bruto_weight).sum::<f64>();
        let yield_weight = lines.iter().map(|l| l.yield_kg).sum::<f64>()
            + sub_components.iter().map(|s| s.yield_weight).sum::<f64>();
        let cost = lines.iter().map(|l| l.cost).sum::<f64>()
            + sub_components.iter().map(|s| s.cost).sum::<f64>();

        debug!(
            preparation = %prep.id,
            bruto_weight,
            yield_weight,
            cost,
            "Evaluated preparation"
        );

        PreparationTotals {
            preparation_id: prep.id,
            title: prep.title.clone(),
            bruto_weight,
            yield_weight,
            cost,
            lines,
            sub_components,
            breakdown,
            issues,
        }
    }
}

fn per_kilogram(cost: f64, weight: f64, field: &str, issues: &mut Vec<Issue>) -> Option<f64> {
    if weight.abs() < EPSILON {
        issues.push(
            Issue::data_gap(
                ErrorCode::DivisionUndefined,
                format!("{field} is undefined for a zero weight"),
            )
            .with_field(field),
        );
        None
    } else {
        Some(cost / weight)
    }
}
