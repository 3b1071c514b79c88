//! Integration tests for the calckit calculation engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Worked examples evaluated end to end through `calculate`
//! - `properties` - Seeded randomized checks of mathematical identities
//! - `batch_runs` - Batch text parsing, type tags and skip handling
//! - `sensitivity` - Parameter sweeps over real formulas
//! - `statistics` - Descriptive summaries of generated samples
//! - `formatting` - Output formats and precision through the engine

mod properties;
mod sensitivity;
mod statistics;
