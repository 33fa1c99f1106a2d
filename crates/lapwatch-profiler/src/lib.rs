//! In-process timers and milestones.
//!
//! A [`Profiler`] records named timers, grouped by a type tag, and milestones
//! measured from the moment it was created. Timers that did not run longer
//! than the configured threshold are left out of query results. At the end of
//! a session the milestones are handed to a [`Reporter`], which decides where
//! they go.
//!
//! # Feature Flags
//!
//! - `profiling`: Enable the [`profile_timer!`] and [`milestone!`] macros.
//!   When disabled, they expand to no-ops.
//!
//! # Usage
//!
//! ```
//! use lapwatch_profiler::ProfilerHandle;
//!
//! let profiler = ProfilerHandle::new();
//!
//! let id = profiler.start_timer("db");
//! // ... query
//! let record = profiler.stop_timer(id, "query done").unwrap();
//! assert!(record.duration.is_some());
//!
//! profiler.add_milestone("request handled");
//! assert_eq!(profiler.timers().len(), 1);
//! ```

mod clock;
mod config;
mod error;
mod handle;
mod macros;
mod profiler;
mod record;
mod reporter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ProfilerConfig, CHANNEL_ENV, DEFAULT_CHANNEL, THRESHOLD_ENV};
pub use error::{ConfigError, ProfilerError, Result};
pub use handle::ProfilerHandle;
pub use macros::TimerGuard;
pub use profiler::Profiler;
pub use record::{Milestone, TimerId, TimerRecord};
pub use reporter::Reporter;
