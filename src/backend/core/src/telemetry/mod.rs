//! Telemetry: structured logging for the ability engine.
//!
//! Decision counters are emitted through the `metrics` facade; installing a
//! recorder/exporter is left to the embedding service.
//!
//! # Example
//!
//! ```rust,no_run
//! use saas_auth::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
