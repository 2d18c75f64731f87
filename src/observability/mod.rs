//! # Observability
//!
//! Structured logging for listener generation.

pub mod logging;

pub use logging::init_logging;
