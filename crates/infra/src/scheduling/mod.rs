//! Background job scheduling
//!
//! [`TokioScheduler`] backs the core `Scheduler` port with tokio timers. Every
//! job runs under a child of one root cancellation token so shutdown stops
//! all of them and awaits their join handles.

pub mod error;
pub mod tokio_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use tokio_scheduler::{TokioScheduler, TokioTaskHandle};
