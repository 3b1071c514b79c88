//! One-parameter sensitivity analysis.
//!
//! A sweep takes a valid set of base parameters, varies one numeric input by
//! a symmetric percentage range around its base value, and records how a
//! chosen output responds:
//!
//! ```
//! use calckit_core::analysis::sweep;
//! use calckit_core::formulas::FormulaId;
//! use calckit_core::model::Params;
//!
//! let mut base = Params::new();
//! base.insert("side".into(), 2.0.into());
//! let points = sweep(&base, "side", 10.0, FormulaId::Cube).unwrap();
//! assert_eq!(points.len(), 11);
//! assert_eq!(points[5].output_value, 8.0);
//! ```
//!
//! Points whose varied value the formula rejects are left out, so the result
//! may hold fewer points than requested.

mod config;
mod evaluator;

pub use config::*;
pub use evaluator::*;
