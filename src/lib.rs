// ABOUTME: Main library entry point for the Mise recipe costing toolkit
// ABOUTME: Re-exports the core and engine crates plus logging, configuration, snapshot, and output modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # Mise Cost
//!
//! Recipe yield & cost composition and historical price analytics for food
//! production. The algorithms live in two workspace crates:
//!
//! - `mise-core`: entity models, the canonical unit table, error codes
//! - `mise-engine`: yield chain, composition, validation, price history,
//!   series, volatility, supplier ranking, impact, and batch analytics
//!
//! This package adds what a runnable program needs around them: structured
//! logging, environment configuration, snapshot loading, and output
//! formatting for the `mise-cli` binary.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mise_cost::snapshot::Snapshot;
//! use mise_cost::engine::{CompositionAggregator, EngineConfig, RecordedPrices};
//!
//! # fn main() -> anyhow::Result<()> {
//! let snapshot = Snapshot::load("snapshot.json")?;
//! let recipe = snapshot.resolve_recipe("Beef stew", &EngineConfig::default())?;
//! let totals = CompositionAggregator::default().compute_recipe_totals(recipe, &RecordedPrices)?;
//! println!("{:.2}", totals.total_cost);
//! # Ok(())
//! # }
//! ```

/// Binary configuration from the environment
pub mod config;

/// JSON and text rendering of engine results
pub mod formatters;

/// Structured logging setup
pub mod logging;

/// Snapshot loading and entity lookup
pub mod snapshot;

/// Foundation types (models, units, error codes)
pub use mise_core as core;

/// Costing and analytics engines
pub use mise_engine as engine;
