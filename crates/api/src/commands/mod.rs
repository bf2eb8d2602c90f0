//! Command facade over the application context
//!
//! Every command is a plain async function taking the [`AppContext`]; each
//! one is timed and logged through `execute_command`.
//!
//! [`AppContext`]: crate::context::AppContext

mod entries;
mod projects;
mod reports;
mod sync;
mod timer;

pub use entries::*;
pub use projects::*;
pub use reports::*;
pub use sync::*;
pub use timer::*;
