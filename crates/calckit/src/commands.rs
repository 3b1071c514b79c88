//! Subcommand implementations.
//!
//! Each command returns the text to print so it can be tested without a
//! terminal; `main` only parses arguments and writes the output.

use std::fs;
use std::path::{Path, PathBuf};

use calckit_core::{
    BatchOptions, CalculationRequest, FormulaId, HistoryEntry, OutputFormat, ParamValue, Params,
    SweepConfig, calculate, parse_batch, run_batch_with, sweep_with,
};
use color_eyre::eyre::{WrapErr, eyre};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::StorageError;
use crate::export::export_history;
use crate::history::HistoryStore;
use crate::report;

/// Per-invocation overrides of the stored config
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOverrides {
    pub precision: Option<u32>,
    pub output_format: Option<OutputFormat>,
}

/// Where batch rows come from
#[derive(Debug, Clone)]
pub enum BatchInput {
    File(PathBuf),
    Text(String),
}

/// Loaded config plus the data directory it came from
pub struct Session {
    data_dir: PathBuf,
    config: AppConfig,
    overrides: RenderOverrides,
}

impl Session {
    pub fn open(data_dir: &Path, overrides: RenderOverrides) -> Result<Self, StorageError> {
        let config = AppConfig::load(data_dir)?;
        debug!(?config, "config loaded");
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            overrides,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn precision(&self) -> u32 {
        self.overrides.precision.unwrap_or(self.config.precision)
    }

    fn output_format(&self) -> OutputFormat {
        self.overrides
            .output_format
            .unwrap_or(self.config.output_format)
    }

    fn history(&self) -> HistoryStore {
        HistoryStore::new(&self.data_dir, self.config.history_limit)
    }

    fn record(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        if self.config.record_history {
            self.history().append(entries)?;
        }
        Ok(())
    }

    /// Single calculation from `key=value` assignments
    pub fn calc(
        &self,
        formula: &str,
        assignments: &[String],
        show_table: bool,
    ) -> color_eyre::Result<String> {
        let mut request = CalculationRequest::new(formula)
            .precision(self.precision())
            .output_format(self.output_format());
        request.parameters = parse_assignments(assignments)?;

        let result = calculate(&request)?;
        self.record(&[HistoryEntry::record(&request, &result)])?;
        Ok(report::render_result(&result, show_table))
    }

    pub fn batch(&self, formula: &str, input: &BatchInput) -> color_eyre::Result<String> {
        let default_formula: FormulaId = formula.parse()?;
        let text = match input {
            BatchInput::File(path) => fs::read_to_string(path)
                .map_err(|e| StorageError::io(path, e))
                .wrap_err("Failed to read batch file")?,
            BatchInput::Text(text) => text.clone(),
        };

        let options = BatchOptions {
            precision: self.precision(),
            output_format: self.output_format(),
        };
        let run = run_batch_with(&parse_batch(&text), default_formula, options)?;

        let entries: Vec<HistoryEntry> = run
            .results()
            .map(|(entry, result)| {
                let request = CalculationRequest::new(entry.formula_id.as_str())
                    .param("row", entry.dataset.join(","));
                HistoryEntry::record(&request, result)
            })
            .collect();
        self.record(&entries)?;
        Ok(report::render_batch(&run))
    }

    pub fn sweep(
        &self,
        formula: &str,
        assignments: &[String],
        varied_key: &str,
        config: &SweepConfig,
    ) -> color_eyre::Result<String> {
        let formula_id: FormulaId = formula.parse()?;
        let params = parse_assignments(assignments)?;
        let points = sweep_with(&params, varied_key, formula_id, config)?;

        let output_key = config
            .output_key
            .as_deref()
            .unwrap_or(formula_id.primary_output());
        info!(formula = %formula_id, points = points.len(), "sweep rendered");
        Ok(report::render_sweep(varied_key, output_key, &points))
    }

    /// Descriptive statistics over a sample given as separate or comma joined tokens
    pub fn stats(&self, values: &[String], show_table: bool) -> color_eyre::Result<String> {
        let tokens: Vec<String> = values
            .iter()
            .flat_map(|v| calckit_core::model::split_list(v))
            .collect();
        let request = CalculationRequest::new(FormulaId::Descriptive.as_str())
            .param("values", tokens)
            .precision(self.precision())
            .output_format(self.output_format());

        let result = calculate(&request)?;
        self.record(&[HistoryEntry::record(&request, &result)])?;
        Ok(report::render_result(&result, show_table))
    }

    pub fn history_list(&self) -> color_eyre::Result<String> {
        Ok(report::render_history(&self.history().load()?))
    }

    pub fn history_export(&self, path: &Path) -> color_eyre::Result<String> {
        let entries = self.history().load()?;
        let format = export_history(path, &entries)?;
        Ok(format!(
            "Exported {} entries to {} ({format:?})\n",
            entries.len(),
            path.display()
        ))
    }

    pub fn history_clear(&self) -> color_eyre::Result<String> {
        self.history().clear()?;
        Ok("History cleared.\n".to_string())
    }
}

/// Turn `key=value` arguments into raw parameters
pub fn parse_assignments(args: &[String]) -> color_eyre::Result<Params> {
    let mut params = Params::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| eyre!("expected key=value, got '{arg}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(eyre!("missing parameter name in '{arg}'"));
        }
        params.insert(key.to_string(), ParamValue::Text(value.trim().to_string()));
    }
    Ok(params)
}
