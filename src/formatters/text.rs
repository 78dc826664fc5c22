// ABOUTME: Plain-text renderers for engine results printed by mise-cli
// ABOUTME: Totals, validation reports, series, price statistics, supplier rankings, impact, and batches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mise Cost Contributors

use mise_engine::{
    BatchReport, CostSeries, DispersionReport, ImpactReport, Issue, PriceStats, RecipeTotals,
    RecipeVolatility, Severity, SupplierAverage, ValidationReport,
};

use super::TextReport;

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.2}"))
}

fn issue_lines(issues: &[Issue]) -> Vec<String> {
    if issues.is_empty() {
        return vec!["No issues".to_owned()];
    }
    let mut lines = vec![format!("Issues ({}):", issues.len())];
    for issue in issues {
        let severity = match issue.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        let mut line = format!("  [{severity}] {} {}", issue.code, issue.message);
        if let Some(corrected) = issue.corrected_value {
            line.push_str(&format!(" (suggested {corrected:.3})"));
        }
        lines.push(line);
    }
    lines
}

impl TextReport for RecipeTotals {
    fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Bruto weight:      {:.3} kg", self.bruto_weight),
            format!("Yield weight:      {:.3} kg", self.yield_weight),
            format!("Total cost:        {:.2}", self.total_cost),
            format!("Cost per kg raw:   {}", optional(self.cost_per_kg_raw)),
            format!("Cost per kg yield: {}", optional(self.cost_per_kg_yield)),
        ];
        if let Some(cuba) = self.cuba_cost {
            lines.push(format!("Cuba cost:         {cuba:.2}"));
        }
        lines.push(String::new());
        lines.push(format!(
            "{:<28} {:>10} {:>10} {:>8} {:>10}",
            "Ingredient", "Bruto kg", "Yield kg", "Yield %", "Cost"
        ));
        for entry in &self.breakdown {
            let name = entry
                .ingredient_name
                .clone()
                .unwrap_or_else(|| entry.ingredient_id.to_string());
            lines.push(format!(
                "{:<28} {:>10.3} {:>10.3} {:>8.1} {:>10.2}",
                name, entry.bruto_weight, entry.yield_weight, entry.yield_pct, entry.cost
            ));
        }
        lines.push(String::new());
        lines.extend(issue_lines(&self.issues));
        lines.join("\n")
    }
}

impl TextReport for ValidationReport {
    fn render_text(&self) -> String {
        let status = if self.has_errors() { "FAILED" } else { "OK" };
        let mut lines = vec![
            format!("{}: {status}", self.recipe_name),
            format!(
                "{:<18} {:>12} {:>12}",
                "Field", "Stored", "Recomputed"
            ),
            format!(
                "{:<18} {:>12} {:>12.3}",
                "bruto_weight",
                optional(self.stored.bruto_weight),
                self.recomputed.bruto_weight
            ),
            format!(
                "{:<18} {:>12} {:>12.3}",
                "yield_weight",
                optional(self.stored.yield_weight),
                self.recomputed.yield_weight
            ),
            format!(
                "{:<18} {:>12} {:>12.2}",
                "total_cost",
                optional(self.stored.total_cost),
                self.recomputed.total_cost
            ),
            format!(
                "{:<18} {:>12} {:>12}",
                "cost_per_kg_raw",
                optional(self.stored.cost_per_kg_raw),
                optional(self.recomputed.cost_per_kg_raw)
            ),
            format!(
                "{:<18} {:>12} {:>12}",
                "cost_per_kg_yield",
                optional(self.stored.cost_per_kg_yield),
                optional(self.recomputed.cost_per_kg_yield)
            ),
        ];
        lines.extend(issue_lines(&self.issues));
        lines.join("\n")
    }
}

impl TextReport for CostSeries {
    fn render_text(&self) -> String {
        let mut lines = vec![format!("{:<12} {:>12} {:>10}", "Date", "Value", "Change %")];
        for sample in &self.samples {
            lines.push(format!(
                "{:<12} {:>12.2} {:>10}",
                sample.date.to_string(),
                sample.value,
                optional(sample.pct_change)
            ));
        }
        lines.push(String::new());
        lines.push(format!("Window:          {}", self.window));
        lines.push(format!("Step volatility: {}", self.step_volatility));
        lines.push(format!("Net change:      {:.2}%", self.net_change_pct));
        if !self.issues.is_empty() {
            lines.extend(issue_lines(&self.issues));
        }
        lines.join("\n")
    }
}

impl TextReport for PriceStats {
    fn render_text(&self) -> String {
        [
            format!("Events:     {}", self.count),
            format!("Period:     {} .. {}", self.first_date, self.last_date),
            format!("Min:        {:.2}", self.min),
            format!("Max:        {:.2}", self.max),
            format!("Mean:       {:.2}", self.mean),
            format!("Dispersion: {}", self.dispersion),
        ]
        .join("\n")
    }
}

impl TextReport for DispersionReport {
    fn render_text(&self) -> String {
        match &self.stats {
            Some(stats) => stats.render_text(),
            None => format!("Events:     0\nDispersion: {}", self.dispersion),
        }
    }
}

impl TextReport for [SupplierAverage] {
    fn render_text(&self) -> String {
        if self.is_empty() {
            return "Supplier: not available".to_owned();
        }
        let mut lines = vec![format!("{:<4} {:<28} {:>10} {:>7}", "Rank", "Supplier", "Mean", "Events")];
        for (rank, average) in self.iter().enumerate() {
            lines.push(format!(
                "{:<4} {:<28} {:>10.2} {:>7}",
                rank + 1,
                average.supplier,
                average.average_price,
                average.event_count
            ));
        }
        lines.join("\n")
    }
}

impl TextReport for ImpactReport {
    fn render_text(&self) -> String {
        let mut lines = vec![
            format!("Current cost: {:.2} (price changes over {})", self.total_cost, self.window),
            format!(
                "{:<28} {:>10} {:>14} {:>10} {:>10}",
                "Ingredient", "Cost", "Contribution %", "Price %", "Impact %"
            ),
        ];
        for impact in &self.impacts {
            lines.push(format!(
                "{:<28} {:>10.2} {:>14.2} {:>10.2} {:>10.2}",
                impact.ingredient_name,
                impact.line_cost,
                impact.contribution_pct,
                impact.price_change_pct,
                impact.cost_impact_pct
            ));
        }
        if !self.issues.is_empty() {
            lines.push(String::new());
            lines.extend(issue_lines(&self.issues));
        }
        lines.join("\n")
    }
}

fn failure_lines<T>(report: &BatchReport<T>) -> Vec<String> {
    if report.failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), format!("Failed ({}):", report.failures.len())];
    for failure in &report.failures {
        lines.push(format!("  {} [{}] {}", failure.recipe_name, failure.code, failure.message));
    }
    lines
}

impl TextReport for BatchReport<RecipeVolatility> {
    fn render_text(&self) -> String {
        let mut lines = vec![format!(
            "{:<4} {:<28} {:>12} {:>12} {:>10}",
            "Rank", "Recipe", "Volatility", "Net change", "Cost"
        )];
        for (rank, entry) in self.results.iter().enumerate() {
            lines.push(format!(
                "{:<4} {:<28} {:>12} {:>11.2}% {:>10.2}",
                rank + 1,
                entry.recipe_name,
                entry.step_volatility.to_string(),
                entry.net_change_pct,
                entry.latest_cost
            ));
        }
        lines.extend(failure_lines(self));
        lines.join("\n")
    }
}

impl TextReport for BatchReport<ValidationReport> {
    fn render_text(&self) -> String {
        let mut lines = Vec::new();
        for report in &self.results {
            lines.push(report.render_text());
            lines.push(String::new());
        }
        let failing = self.results.iter().filter(|r| r.has_errors()).count();
        lines.push(format!(
            "{} recipes validated, {failing} with errors",
            self.results.len()
        ));
        lines.extend(failure_lines(self));
        lines.join("\n")
    }
}
