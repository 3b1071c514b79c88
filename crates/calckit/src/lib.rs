//! Command-line host for the calckit engine
//!
//! The engine in `calckit_core` never touches the filesystem. This crate owns
//! everything around it:
//! - User preferences in `config.yaml`
//! - Calculation history in `history.json`, with CSV/JSON export
//! - Batch files read from disk
//! - Log file initialisation and rotation

// ============================================================================
// Host modules
// ============================================================================

pub mod commands;
pub mod config;
pub mod export;
pub mod history;
pub mod logging;
pub mod report;

// ============================================================================
// Utilities
// ============================================================================

pub mod error;
pub mod io;

pub use commands::{BatchInput, RenderOverrides, Session};
pub use config::{AppConfig, default_data_dir};
pub use error::StorageError;
pub use logging::init_logging;
