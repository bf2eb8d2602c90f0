//! Active timer

pub mod service;

pub use service::{hours_between, TimerService};
