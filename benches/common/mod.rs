// ABOUTME: Common benchmark utilities and fixtures for costing benchmarks
// ABOUTME: Provides reusable catalog, price log, and recipe generators for Criterion benchmarks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

//! Common benchmark utilities and fixtures.
//!
//! Provides deterministic data generators for Criterion benchmarks.

pub mod fixtures;
