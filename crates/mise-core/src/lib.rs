// ABOUTME: Core types and constants for the Mise recipe costing platform
// ABOUTME: Foundation crate with entity models, canonical unit table, error taxonomy, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

#![deny(unsafe_code)]

//! # Mise Core
//!
//! Foundation crate providing shared types for the Mise costing engines. It
//! holds no algorithms beyond the canonical unit table, so it changes rarely
//! and keeps incremental builds of the engine crate cheap.
//!
//! ## Modules
//!
//! - **models**: Ingredients, price events, recipes and their preparation arena
//! - **units**: The single unit conversion table every costing path goes through
//! - **errors**: Structural (fatal) errors and stable error codes
//! - **constants**: Conversion factors and default tolerances

/// Conversion factors and default tolerances
pub mod constants;

/// Structural error taxonomy and stable error codes
pub mod errors;

/// Entity models (Ingredient, `PriceEvent`, Recipe, Preparation)
pub mod models;

/// Canonical unit conversion table
pub mod units;

pub use errors::{ErrorCode, StructuralError};
pub use units::{ConversionError, Dimension, Unit};
