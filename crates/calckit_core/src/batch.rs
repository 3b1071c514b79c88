//! Batch evaluation of many datasets against one formula.
//!
//! Input is a block of records, one per line or separated by `;`, each a
//! comma separated list of raw tokens in the formula's positional parameter
//! order. A record may end with a formula id (`3,4,hypotenuse`) to switch
//! formula for that row only.
//!
//! A bad row never aborts the run: it is recorded as a [`SkipReason`] and the
//! remaining rows are still evaluated. The run as a whole fails only when no
//! row succeeds.

use tracing::{info, warn};

use crate::engine::calculate_formula;
use crate::error::{BatchError, CalcError, ParseError, SkipReason, ValidationError};
use crate::formulas::FormulaId;
use crate::model::{CalculationResult, OutputFormat, ParamValue, Params};
use crate::parse::parse_number;

/// One record of raw tokens
pub type Dataset = Vec<String>;

/// Split batch text into records of trimmed fields.
///
/// Blank records are dropped and trailing empty fields are ignored, but an
/// empty field inside a record is kept so it fails on its own position
/// instead of shifting every later field.
pub fn parse_batch(text: &str) -> Vec<Dataset> {
    text.split(['\n', ';'])
        .filter_map(|record| {
            let mut fields: Dataset = record
                .split(',')
                .map(|field| field.trim().to_string())
                .collect();
            while fields.last().is_some_and(String::is_empty) {
                fields.pop();
            }
            (!fields.is_empty()).then_some(fields)
        })
        .collect()
}

/// Rendering options applied to every row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub precision: u32,
    pub output_format: OutputFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            output_format: OutputFormat::Decimal,
        }
    }
}

/// Outcome of one record
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// 0-based position in the input
    pub index: usize,
    pub dataset: Dataset,
    /// Formula actually used, after any trailing type tag
    pub formula_id: FormulaId,
    pub outcome: Result<CalculationResult, SkipReason>,
}

impl BatchEntry {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Every entry of a batch, successful or skipped, in input order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchRun {
    pub entries: Vec<BatchEntry>,
}

impl BatchRun {
    pub fn attempted(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn results(&self) -> impl Iterator<Item = (&BatchEntry, &CalculationResult)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().ok().map(|r| (e, r)))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkipReason> {
        self.entries.iter().filter_map(|e| e.outcome.as_ref().err())
    }
}

/// [`run_batch_with`] using default precision and decimal output
pub fn run_batch(rows: &[Dataset], default_formula: FormulaId) -> Result<BatchRun, BatchError> {
    run_batch_with(rows, default_formula, BatchOptions::default())
}

/// Evaluate every row, recording failures as skips
pub fn run_batch_with(
    rows: &[Dataset],
    default_formula: FormulaId,
    options: BatchOptions,
) -> Result<BatchRun, BatchError> {
    if rows.is_empty() {
        return Err(BatchError::Empty);
    }

    let mut run = BatchRun::default();
    for (index, dataset) in rows.iter().enumerate() {
        let (formula_id, fields) = split_type_tag(dataset, default_formula);
        let outcome = row_params(formula_id, fields)
            .and_then(|params| {
                calculate_formula(formula_id, &params, options.precision, options.output_format)
            })
            .map_err(|error| SkipReason { index, error });

        if let Err(skip) = &outcome {
            warn!(row = index + 1, formula = %formula_id, "{skip}");
        }
        run.entries.push(BatchEntry {
            index,
            dataset: dataset.clone(),
            formula_id,
            outcome,
        });
    }

    let succeeded = run.succeeded();
    info!(
        attempted = run.attempted(),
        succeeded,
        formula = %default_formula,
        "batch finished"
    );

    if succeeded == 0 {
        let first = run
            .skipped()
            .next()
            .cloned()
            .unwrap_or(SkipReason {
                index: 0,
                error: CalcError::Validation(ValidationError::new("row", "no rows evaluated")),
            });
        return Err(BatchError::NoSuccessfulRows {
            attempted: run.attempted(),
            first,
        });
    }
    Ok(run)
}

/// Peel a trailing formula id off a record.
///
/// The last field is a tag only when it is not a number and names a known
/// formula, so unit and tail choices (`cm`, `left`) stay positional.
fn split_type_tag(dataset: &[String], default_formula: FormulaId) -> (FormulaId, &[String]) {
    if let Some((last, rest)) = dataset.split_last() {
        if parse_number(last).is_err() {
            if let Ok(id) = last.parse::<FormulaId>() {
                return (id, rest);
            }
        }
    }
    (default_formula, dataset)
}

/// Map positional fields onto a formula's parameter names
fn row_params(formula_id: FormulaId, fields: &[String]) -> Result<Params, CalcError> {
    let mut params = Params::new();

    if formula_id == FormulaId::WeightedMean {
        if fields.len() % 2 != 0 {
            return Err(ValidationError::new(
                "weights",
                format!(
                    "row needs values followed by the same number of weights, got {} fields",
                    fields.len()
                ),
            )
            .into());
        }
        let (values, weights) = fields.split_at(fields.len() / 2);
        params.insert("values".into(), ParamValue::List(values.to_vec()));
        params.insert("weights".into(), ParamValue::List(weights.to_vec()));
        return Ok(params);
    }

    if formula_id.takes_list() {
        let name = formula_id.param_names()[0];
        params.insert(name.into(), ParamValue::List(fields.to_vec()));
        return Ok(params);
    }

    let names: Vec<&str> = formula_id
        .param_names()
        .iter()
        .chain(formula_id.optional_params())
        .copied()
        .collect();
    if fields.len() > names.len() {
        return Err(ValidationError::new(
            "row",
            format!(
                "{formula_id} takes at most {} fields, got {}",
                names.len(),
                fields.len()
            ),
        )
        .into());
    }
    for (name, field) in names.iter().zip(fields) {
        if field.is_empty() {
            return Err(CalcError::parse(*name, ParseError::Empty));
        }
        params.insert((*name).into(), ParamValue::Text(field.clone()));
    }
    Ok(params)
}
