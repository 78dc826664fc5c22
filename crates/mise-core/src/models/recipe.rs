// ABOUTME: Recipe composition models: preparations arena, ingredient lines, sub-component lines
// ABOUTME: Defines process stages, per-stage line weights, and the cached totals stored with a recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{IngredientId, PreparationId, RecipeId};
use crate::units::Unit;

const fn default_active() -> bool {
    true
}

/// Processing stage a preparation (or a single line) passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStage {
    /// Frozen to thawed
    Thaw,
    /// Raw to clean (trimming, peeling, deboning)
    Clean,
    /// Pre-cook to cooked
    Cook,
    /// Cooked/prepared to portioned
    Portion,
    /// Assembly of already processed inputs (no weight boundary of its own)
    Assemble,
}

impl ProcessStage {
    /// Stages that carry a weight loss, in processing order
    pub const LOSS_STAGES: [Self; 4] = [Self::Thaw, Self::Clean, Self::Cook, Self::Portion];

    /// Human-readable stage name
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Thaw => "thaw",
            Self::Clean => "clean",
            Self::Cook => "cook",
            Self::Portion => "portion",
            Self::Assemble => "assemble",
        }
    }
}

/// Point in the processing chain where a line's weight may be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPoint {
    /// As purchased, frozen
    Frozen,
    /// Thawed, or raw when the line is never frozen
    Thawed,
    /// After cleaning
    Clean,
    /// Right before cooking
    PreCook,
    /// After cooking
    Cooked,
    /// Right before portioning
    PrePortion,
    /// After portioning
    Portioned,
}

impl WeightPoint {
    /// All weight points in processing order
    pub const ORDER: [Self; 7] = [
        Self::Frozen,
        Self::Thawed,
        Self::Clean,
        Self::PreCook,
        Self::Cooked,
        Self::PrePortion,
        Self::Portioned,
    ];
}

/// Weights recorded for one ingredient line at each stage boundary
///
/// Only the boundaries relevant to the line's enabled stages are populated.
/// Weights are expressed in the line's unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageWeights {
    /// Frozen weight (before thawing)
    #[serde(default)]
    pub frozen: Option<f64>,
    /// Thawed weight, also the raw weight of a never-frozen line
    #[serde(default, alias = "raw")]
    pub thawed: Option<f64>,
    /// Weight after cleaning
    #[serde(default)]
    pub clean: Option<f64>,
    /// Weight right before cooking
    #[serde(default)]
    pub pre_cook: Option<f64>,
    /// Weight after cooking
    #[serde(default)]
    pub cooked: Option<f64>,
    /// Weight right before portioning
    #[serde(default)]
    pub pre_portion: Option<f64>,
    /// Weight after portioning
    #[serde(default)]
    pub portioned: Option<f64>,
}

impl StageWeights {
    /// Weight recorded at a boundary
    #[must_use]
    pub const fn get(&self, point: WeightPoint) -> Option<f64> {
        match point {
            WeightPoint::Frozen => self.frozen,
            WeightPoint::Thawed => self.thawed,
            WeightPoint::Clean => self.clean,
            WeightPoint::PreCook => self.pre_cook,
            WeightPoint::Cooked => self.cooked,
            WeightPoint::PrePortion => self.pre_portion,
            WeightPoint::Portioned => self.portioned,
        }
    }

    /// Recorded weights in processing order, skipping absent boundaries
    #[must_use]
    pub fn recorded(&self) -> Vec<(WeightPoint, f64)> {
        WeightPoint::ORDER
            .iter()
            .filter_map(|&point| self.get(point).map(|w| (point, w)))
            .collect()
    }

    /// Last weight recorded strictly before `point`
    #[must_use]
    pub fn last_before(&self, point: WeightPoint) -> Option<f64> {
        WeightPoint::ORDER
            .iter()
            .take_while(|&&p| p < point)
            .filter_map(|&p| self.get(p))
            .last()
    }
}

/// One ingredient consumed by a preparation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Catalog ingredient
    pub ingredient_id: IngredientId,
    /// Name shown on the recipe card at authoring time
    #[serde(default)]
    pub ingredient_name: Option<String>,
    /// Unit the stage weights are recorded in
    #[serde(default)]
    pub unit: Unit,
    /// Stage boundary weights
    #[serde(default)]
    pub weights: StageWeights,
    /// Ingredient price per `price_unit` at authoring time
    pub price_per_unit: f64,
    /// Unit the authoring-time price refers to
    #[serde(default)]
    pub price_unit: Unit,
    /// Stages this line passes through, when narrower than its preparation's
    #[serde(default)]
    pub stages: Option<Vec<ProcessStage>>,
}

impl IngredientLine {
    /// Create a line priced per kilogram with weights in kilograms
    #[must_use]
    pub fn new(ingredient_id: IngredientId, weights: StageWeights, price_per_kg: f64) -> Self {
        Self {
            ingredient_id,
            ingredient_name: None,
            unit: Unit::Kilogram,
            weights,
            price_per_unit: price_per_kg,
            price_unit: Unit::Kilogram,
            stages: None,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.ingredient_name = Some(name.into());
        self
    }

    /// Set the unit the weights are recorded in
    #[must_use]
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the authoring-time price and its unit
    #[must_use]
    pub fn with_price(mut self, price_per_unit: f64, price_unit: Unit) -> Self {
        self.price_per_unit = price_per_unit;
        self.price_unit = price_unit;
        self
    }

    /// Restrict the stages this line passes through
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<ProcessStage>) -> Self {
        self.stages = Some(stages);
        self
    }

    /// Stages enabled for this line given its preparation's stages
    #[must_use]
    pub fn enabled_stages<'a>(&'a self, preparation_stages: &'a [ProcessStage]) -> &'a [ProcessStage] {
        self.stages.as_deref().unwrap_or(preparation_stages)
    }
}

/// Another preparation's finished output consumed as an atomic input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubComponentLine {
    /// Referenced preparation in the same recipe arena
    pub preparation_id: PreparationId,
    /// Weight of the output actually consumed (whole output when absent)
    #[serde(default)]
    pub consumed_weight: Option<f64>,
    /// Yield weight cached when the line was authored
    #[serde(default)]
    pub stored_yield_weight: Option<f64>,
    /// Cost cached when the line was authored
    #[serde(default)]
    pub stored_cost: Option<f64>,
}

impl SubComponentLine {
    /// Consume the whole output of a preparation
    #[must_use]
    pub const fn whole(preparation_id: PreparationId) -> Self {
        Self {
            preparation_id,
            consumed_weight: None,
            stored_yield_weight: None,
            stored_cost: None,
        }
    }

    /// Consume only part of a preparation's output
    #[must_use]
    pub const fn partial(preparation_id: PreparationId, consumed_weight: f64) -> Self {
        Self {
            preparation_id,
            consumed_weight: Some(consumed_weight),
            stored_yield_weight: None,
            stored_cost: None,
        }
    }
}

/// A processing step of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preparation {
    /// Identifier within the recipe arena
    pub id: PreparationId,
    /// Title shown on the recipe card
    pub title: String,
    /// Ordered stages this preparation runs
    #[serde(default)]
    pub stages: Vec<ProcessStage>,
    /// Raw ingredient inputs
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
    /// Finished preparations consumed as inputs
    #[serde(default)]
    pub sub_components: Vec<SubComponentLine>,
}

impl Preparation {
    /// Create an empty preparation
    #[must_use]
    pub fn new(title: impl Into<String>, stages: Vec<ProcessStage>) -> Self {
        Self {
            id: PreparationId::new(),
            title: title.into(),
            stages,
            ingredients: Vec::new(),
            sub_components: Vec::new(),
        }
    }

    /// Add an ingredient line
    #[must_use]
    pub fn with_ingredient(mut self, line: IngredientLine) -> Self {
        self.ingredients.push(line);
        self
    }

    /// Add a sub-component line
    #[must_use]
    pub fn with_sub_component(mut self, line: SubComponentLine) -> Self {
        self.sub_components.push(line);
        self
    }
}

/// Totals cached alongside a recipe by the persistence layer
///
/// Derived data: the engines recompute these and flag drift, they never
/// overwrite them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTotals {
    /// Cached bruto weight (kg)
    #[serde(default)]
    pub bruto_weight: Option<f64>,
    /// Cached yield weight (kg)
    #[serde(default)]
    pub yield_weight: Option<f64>,
    /// Cached total cost
    #[serde(default)]
    pub total_cost: Option<f64>,
    /// Cached cost per bruto kilogram
    #[serde(default)]
    pub cost_per_kg_raw: Option<f64>,
    /// Cached cost per yield kilogram
    #[serde(default)]
    pub cost_per_kg_yield: Option<f64>,
}

/// Recipe: an arena of preparations linked into a DAG by sub-component lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Stable identifier
    pub id: RecipeId,
    /// Display name
    pub name: String,
    /// Preparations in authoring order
    #[serde(default)]
    pub preparations: Vec<Preparation>,
    /// Serving container ("cuba") weight in kg
    #[serde(default)]
    pub cuba_weight: Option<f64>,
    /// Cached totals
    #[serde(default)]
    pub stored: StoredTotals,
    /// Soft-deactivation flag
    #[serde(default = "default_active")]
    pub active: bool,
    /// Last date the recipe changed
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

impl Recipe {
    /// Create an empty recipe
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecipeId::new(),
            name: name.into(),
            preparations: Vec::new(),
            cuba_weight: None,
            stored: StoredTotals::default(),
            active: true,
            updated_at: None,
        }
    }

    /// Append a preparation to the arena
    #[must_use]
    pub fn with_preparation(mut self, preparation: Preparation) -> Self {
        self.preparations.push(preparation);
        self
    }

    /// Set the cuba weight
    #[must_use]
    pub fn with_cuba_weight(mut self, cuba_weight: f64) -> Self {
        self.cuba_weight = Some(cuba_weight);
        self
    }

    /// Set the cached totals
    #[must_use]
    pub fn with_stored(mut self, stored: StoredTotals) -> Self {
        self.stored = stored;
        self
    }

    /// Look up a preparation by identifier
    #[must_use]
    pub fn preparation(&self, id: PreparationId) -> Option<&Preparation> {
        self.preparations.iter().find(|p| p.id == id)
    }

    /// Identifiers of preparations consumed by some other preparation
    #[must_use]
    pub fn consumed_preparations(&self) -> HashSet<PreparationId> {
        self.preparations
            .iter()
            .flat_map(|p| p.sub_components.iter().map(|s| s.preparation_id))
            .collect()
    }

    /// Preparations that roll up into the recipe figure (not consumed elsewhere)
    pub fn top_level_preparations(&self) -> impl Iterator<Item = &Preparation> {
        let consumed = self.consumed_preparations();
        self.preparations
            .iter()
            .filter(move |p| !consumed.contains(&p.id))
    }

    /// Every ingredient line in the arena
    pub fn ingredient_lines(&self) -> impl Iterator<Item = &IngredientLine> {
        self.preparations.iter().flat_map(|p| p.ingredients.iter())
    }
}
