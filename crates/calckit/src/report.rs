//! Plain-text rendering of engine results for the terminal.

use std::fmt::Write;

use calckit_core::model::Table;
use calckit_core::{BatchRun, CalculationResult, FormulaId, HistoryEntry, SensitivityPoint};

/// Result values, one per line, followed by the derivation
pub fn render_result(result: &CalculationResult, show_table: bool) -> String {
    let mut out = String::new();
    let width = result.values.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let _ = writeln!(out, "{}", result.formula_id);
    for (key, value) in &result.values {
        let _ = writeln!(out, "  {key:<width$}  {value}");
    }

    if result.derivation.len() > 1 {
        out.push_str("\nDerivation:\n");
        for line in &result.derivation {
            let _ = writeln!(out, "  {line}");
        }
    } else if let Some(line) = result.derivation.first() {
        let _ = writeln!(out, "  ({line})");
    }

    if let Some(table) = &result.table {
        if show_table {
            out.push('\n');
            out.push_str(&render_table(table));
        } else {
            let _ = writeln!(out, "\n{} table rows (use --table to show)", table.len());
        }
    }
    out
}

/// Left-aligned columns sized to their widest cell
pub fn render_table(table: &Table) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(&table.columns));
    for row in &table.rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out
}

pub fn render_batch(run: &BatchRun) -> String {
    let mut out = String::new();
    for entry in &run.entries {
        let row = entry.dataset.join(",");
        match &entry.outcome {
            Ok(result) => {
                let _ = writeln!(
                    out,
                    "#{} [{}] {row} -> {}",
                    entry.index + 1,
                    entry.formula_id,
                    result.summary()
                );
            }
            Err(skip) => {
                let _ = writeln!(
                    out,
                    "#{} [{}] {row} -> skipped: {}",
                    entry.index + 1,
                    entry.formula_id,
                    skip.error
                );
            }
        }
    }
    let _ = writeln!(out, "{} of {} rows succeeded", run.succeeded(), run.attempted());
    out
}

/// Sweep points as a table, with change relative to the unvaried point
pub fn render_sweep(varied_key: &str, output_key: &str, points: &[SensitivityPoint]) -> String {
    let baseline = points
        .iter()
        .find(|p| p.variation_percent == 0.0)
        .map(|p| p.output_value);

    let mut table = Table::new(&["variation %", varied_key, output_key, "change %"]);
    for point in points {
        let change = baseline
            .and_then(|b| point.output_change_percent(b))
            .map(|c| format!("{c:+.2}"))
            .unwrap_or_else(|| "-".to_string());
        table.push(vec![
            format!("{:+.2}", point.variation_percent),
            format!("{}", point.varied_parameter_value),
            format!("{}", point.output_value),
            change,
        ]);
    }
    render_table(&table)
}

/// Every formula id grouped by category, with its parameters
pub fn render_formulas() -> String {
    let mut out = String::new();
    let mut category = "";
    for id in FormulaId::ALL {
        if id.category() != category {
            category = id.category();
            let _ = writeln!(out, "{category}:");
        }
        let mut params = id.param_names().join(", ");
        if !id.optional_params().is_empty() {
            let _ = write!(params, " [{}]", id.optional_params().join(", "));
        }
        let _ = writeln!(out, "  {:<24} {params}", id.as_str());
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history recorded.\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {}({}) -> {}",
            entry.date(),
            entry.formula_id,
            entry.params,
            entry.result
        );
    }
    out
}
