//! Command plumbing: logging bootstrap and execution wrappers

pub mod command_helpers;
pub mod logging;
