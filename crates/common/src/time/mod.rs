//! Time utilities and abstractions
//!
//! - **[`clock`]**: wall clock trait with a real and a mock implementation
//! - **[`format`]**: human-readable hour and stopwatch formatting
//!
//! ## Usage
//!
//! ```rust
//! use timesheet_common::time::{format_hours, Clock, MockClock};
//!
//! assert_eq!(format_hours(1.5), "1h 30m");
//!
//! let clock = MockClock::at(0);
//! clock.advance_millis(5_400_000);
//! assert_eq!(clock.now_millis(), 5_400_000);
//! ```

pub mod clock;
pub mod format;

pub use clock::{local_date, Clock, MockClock, SystemClock};
pub use format::{format_clock, format_hours};
