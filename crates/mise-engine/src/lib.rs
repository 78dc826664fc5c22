// ABOUTME: Yield & cost composition and historical price analytics engines for Mise
// ABOUTME: Pure synchronous computations over in-memory snapshots with rayon batch analytics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![deny(unsafe_code)]

//! # Mise Engine
//!
//! Two engines over snapshots handed over by the persistence layer. Nothing
//! here performs I/O or holds state between calls, so every entry point is
//! safe to call repeatedly and in parallel.
//!
//! ## Yield & Cost Composition
//!
//! - **`yield_chain`**: stage losses, yield and cost of one ingredient line
//! - **`composition`**: arena walk of a recipe's preparations into totals
//! - **`validator`**: stored vs recomputed totals, classified findings
//! - **`pricing`**: recorded, current, and historical price sources
//!
//! ## Historical Price Analytics
//!
//! - **`resolver`**: three-tier resolution of loosely keyed records
//! - **`history`**: price index, price-as-of, event filters and statistics
//! - **`series`**: recipe and ingredient cost series over trailing windows
//! - **`volatility`**: step and dispersion volatility
//! - **`supplier`**: cheapest supplier by mean price
//! - **`impact`**: ingredient contribution and cost impact
//! - **`batch`**: parallel ranking and validation of many recipes

/// Parallel batch analytics
pub mod batch;
/// Recipe composition aggregation
pub mod composition;
/// Engine configuration
pub mod config;
/// Price index and price-as-of queries
pub mod history;
/// Ingredient contribution and impact
pub mod impact;
/// Non-fatal findings
pub mod issues;
/// Price sources for line costing
pub mod pricing;
/// Entity resolution
pub mod resolver;
/// Cost series
pub mod series;
/// Supplier ranking
pub mod supplier;
/// Recipe validation
pub mod validator;
/// Volatility measures
pub mod volatility;
/// Per-line yield chain
pub mod yield_chain;

pub use batch::{rank_recipes_by_volatility, validate_all, BatchFailure, BatchReport, RecipeVolatility};
pub use composition::{
    CompositionAggregator, IngredientBreakdown, PreparationTotals, RecipeTotals, SubComponentUse,
};
pub use config::{ConfigError, EngineConfig};
pub use history::{DispersionReport, HistoricalPrice, PriceBasis, PriceEventFilter, PriceIndex, PriceStats};
pub use impact::{ingredient_impact, ImpactReport, IngredientImpact};
pub use issues::{Issue, IssueKind, Severity};
pub use pricing::{CurrentPrices, PriceOrigin, PriceQuote, PriceSource, PricesAsOf, RecordedPrices};
pub use resolver::{EntityResolver, Resolution, Resolvable};
pub use series::{CostSeries, SeriesBuilder, SeriesSample, SeriesWindow};
pub use supplier::{SupplierAverage, SupplierRanker};
pub use validator::{RecipeValidator, ValidationReport};
pub use volatility::{DispersionVolatility, StepVolatility};
pub use yield_chain::{LineYield, StageLoss, YieldChainCalculator};
