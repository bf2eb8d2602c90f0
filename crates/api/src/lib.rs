//! # Timesheet application
//!
//! Application layer - commands and the headless entry point.
//!
//! This crate contains:
//! - Commands (the facade every user interface calls into)
//! - Application context (dependency injection)
//! - Command-line parsing for the `timesheet` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Selects the sync strategy from configuration and wires the services

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
