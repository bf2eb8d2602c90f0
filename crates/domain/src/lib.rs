//! # Timesheet Domain
//!
//! Business domain types and models for Timesheet.
//!
//! This crate contains:
//! - Domain data types (Project, TimeEntry, ActiveTimer, Snapshot)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Input validation rules
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Timesheet crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
