//! Scientific and financial calculation engine
//!
//! This crate evaluates named formulas over raw user input. It supports:
//! - Numeric input with small arithmetic expressions (`2*sqrt(9)`)
//! - Loans, mortgages and rental property cash flow with amortization schedules
//! - Permutations, combinations, Stirling and Bell numbers, with enumeration
//! - Normal distribution z-scores, probabilities, quantiles and critical values
//! - Right triangles and solid volumes with unit conversion
//! - Logarithms, descriptive statistics and health ratios
//! - Batch evaluation and one-parameter sensitivity sweeps
//!
//! # Example
//!
//! ```
//! use calckit_core::{CalculationRequest, calculate};
//!
//! let request = CalculationRequest::new("loan")
//!     .param("principal", 50_000.0)
//!     .param("annual_rate", "3")
//!     .param("term_years", 5.0);
//! let result = calculate(&request).unwrap();
//! assert_eq!(result.raw("monthly_payment").map(|p| (p * 100.0).round() / 100.0), Some(898.43));
//! ```
//!
//! The engine is pure and synchronous: nothing here touches the filesystem.

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod batch;
pub mod engine;
pub mod error;
pub mod formulas;
pub mod history;

// ============================================================================
// Numeric building blocks
// ============================================================================

pub mod combinatorics;
pub mod distribution;
pub mod format;
pub mod parse;
pub mod special;
pub mod stats;
pub mod units;
pub mod validate;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{SensitivityPoint, SweepConfig, sweep, sweep_with};
pub use batch::{BatchEntry, BatchOptions, BatchRun, Dataset, parse_batch, run_batch, run_batch_with};
pub use engine::{calculate, calculate_combinatorics, calculate_formula};
pub use error::{
    BatchError, CalcError, ComputationError, ParseError, SkipReason, SweepError, ValidationError,
};
pub use formulas::{Calculation, Formula, FormulaId};
pub use history::HistoryEntry;
pub use model::{CalculationRequest, CalculationResult, OutputFormat, ParamValue, Params, ResultValue};
