//! Reporters for lapwatch profiling sessions.
//!
//! [`ChannelReporter`] implements [`Reporter`](lapwatch_profiler::Reporter)
//! by writing a plain-text summary to a sink. The channel string passed to
//! `send_report` picks how, see [`Channel`].

mod channel;
mod format;

pub use channel::{Channel, ChannelReporter};
pub use format::{format_report, group_thousands, peak_memory_bytes};
