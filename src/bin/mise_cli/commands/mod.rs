// ABOUTME: Command modules for mise-cli and the shared per-run context
// ABOUTME: The context owns the price index and engine settings built once from the snapshot
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

pub mod costing;
pub mod prices;

use anyhow::Result;
use chrono::NaiveDate;
use mise_cost::config::AppConfig;
use mise_cost::formatters::{format_output, OutputFormat, TextReport};
use mise_cost::snapshot::Snapshot;
use mise_engine::config::EngineConfig;
use mise_engine::history::PriceIndex;
use serde::Serialize;

/// Everything a command needs, built once per run
pub struct Context<'a> {
    pub snapshot: &'a Snapshot,
    pub index: PriceIndex<'a>,
    pub engine: EngineConfig,
    pub today: NaiveDate,
    pub output: OutputFormat,
}

impl<'a> Context<'a> {
    pub fn new(snapshot: &'a Snapshot, config: &AppConfig) -> Self {
        Self {
            snapshot,
            index: snapshot.price_index(&config.engine),
            engine: config.engine,
            today: config.today(),
            output: config.output,
        }
    }

    /// Render a result in the configured format
    pub fn render<T>(&self, data: &T) -> Result<String>
    where
        T: Serialize + TextReport + ?Sized,
    {
        Ok(format_output(data, self.output)?)
    }
}
