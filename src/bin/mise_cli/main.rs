// ABOUTME: Mise CLI - recipe costing and price analytics over a JSON snapshot
// ABOUTME: Totals, validation, price history, cost series, suppliers, impact, and volatility ranking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors
//!
//! Usage:
//! ```bash
//! # Recompute a recipe's totals
//! mise-cli --snapshot data.json totals "Beef stew"
//!
//! # Validate every recipe against its cached totals
//! mise-cli --snapshot data.json validate
//!
//! # Price of an ingredient on a past date
//! mise-cli --snapshot data.json price-as-of beef 2024-02-15
//!
//! # Three-month cost series of a recipe
//! mise-cli --snapshot data.json series "Beef stew" --window 3m
//!
//! # Rank all recipes by cost volatility, JSON output
//! mise-cli --snapshot data.json --output json rank --window 6m
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mise_cost::config::AppConfig;
use mise_cost::formatters::OutputFormat;
use mise_cost::logging::LoggingConfig;
use mise_cost::snapshot::Snapshot;
use mise_engine::series::SeriesWindow;
use tracing::debug;

use commands::Context as CommandContext;

#[derive(Parser)]
#[command(
    name = "mise-cli",
    about = "Mise recipe costing and price analytics",
    long_about = "Recomputes recipe yield and cost, validates cached totals, and analyzes historical ingredient prices from a JSON snapshot."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Snapshot file (overrides `MISE_SNAPSHOT`)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Reference date, ISO format (overrides `MISE_TODAY`)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Output format: text or json (overrides `MISE_OUTPUT`)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Recompute a recipe's totals and per-ingredient breakdown
    Totals {
        /// Recipe identifier or name
        recipe: String,
    },

    /// Diff cached totals against recomputed ones (all recipes when omitted)
    Validate {
        /// Recipe identifier or name
        recipe: Option<String>,
    },

    /// Price of an ingredient on a date
    PriceAsOf {
        /// Ingredient identifier or name
        ingredient: String,
        /// Date, ISO format
        date: NaiveDate,
    },

    /// Sampled cost series of a recipe
    Series {
        /// Recipe identifier or name
        recipe: String,
        /// Window: 1w, 1m, 3m, 6m, 12m
        #[arg(long, default_value = "3m")]
        window: SeriesWindow,
    },

    /// Sampled price series of an ingredient
    IngredientSeries {
        /// Ingredient identifier or name
        ingredient: String,
        /// Window: 1w, 1m, 3m, 6m, 12m
        #[arg(long, default_value = "3m")]
        window: SeriesWindow,
    },

    /// Price statistics and dispersion volatility of filtered price events
    Dispersion {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Suppliers ranked by mean price of filtered price events
    BestSupplier {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Ingredient contribution and cost impact for a recipe
    Impact {
        /// Recipe identifier or name
        recipe: String,
        /// Trailing window of the price changes
        #[arg(long, default_value = "3m")]
        window: SeriesWindow,
    },

    /// Rank every recipe by step volatility of its cost series
    Rank {
        /// Window: 1w, 1m, 3m, 6m, 12m
        #[arg(long, default_value = "3m")]
        window: SeriesWindow,
    },
}

/// Price event filter options
#[derive(clap::Args)]
struct FilterArgs {
    /// Ingredient identifier or name
    #[arg(long)]
    ingredient: Option<String>,
    /// Earliest date, inclusive
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest date, inclusive
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Supplier name
    #[arg(long)]
    supplier: Option<String>,
    /// Brand name
    #[arg(long)]
    brand: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut config = AppConfig::from_env().context("Invalid environment configuration")?;
    if let Some(path) = cli.snapshot {
        config.snapshot_path = Some(path);
    }
    if cli.today.is_some() {
        config.today = cli.today;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }

    let path = config
        .snapshot_path
        .clone()
        .context("No snapshot given: pass --snapshot or set MISE_SNAPSHOT")?;
    let snapshot = Snapshot::load(&path)?;
    let ctx = CommandContext::new(&snapshot, &config);
    debug!(today = %ctx.today, output = %config.output, "Running command");

    let rendered = match cli.command {
        Command::Totals { recipe } => commands::costing::totals(&ctx, &recipe)?,
        Command::Validate { recipe } => commands::costing::validate(&ctx, recipe.as_deref())?,
        Command::Impact { recipe, window } => commands::costing::impact(&ctx, &recipe, window)?,
        Command::Rank { window } => commands::costing::rank(&ctx, window)?,
        Command::PriceAsOf { ingredient, date } => {
            commands::prices::price_as_of(&ctx, &ingredient, date)?
        }
        Command::Series { recipe, window } => commands::prices::series(&ctx, &recipe, window)?,
        Command::IngredientSeries { ingredient, window } => {
            commands::prices::ingredient_series(&ctx, &ingredient, window)?
        }
        Command::Dispersion { filter } => commands::prices::dispersion(&ctx, &filter.into())?,
        Command::BestSupplier { filter } => commands::prices::best_supplier(&ctx, &filter.into())?,
    };

    println!("{rendered}");
    Ok(())
}

impl From<FilterArgs> for commands::prices::EventQuery {
    fn from(args: FilterArgs) -> Self {
        Self {
            ingredient: args.ingredient,
            from: args.from,
            to: args.to,
            supplier: args.supplier,
            brand: args.brand,
        }
    }
}
