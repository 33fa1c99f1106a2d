//! Contract for the collaborator that renders profiling reports.

use std::time::Instant;

use crate::record::Milestone;

/// Renders and sends the milestones of a profiling session.
///
/// The profiler never interprets `channel`; it is passed through to the
/// reporter as given to [`Profiler::send_report`](crate::Profiler::send_report).
pub trait Reporter: Send + Sync {
    /// Deliver the milestones through `channel`.
    fn send(&self, milestones: &[Milestone], time_start: Instant, channel: &str);

    /// Render the milestones without sending them.
    fn format(&self, milestones: &[Milestone], time_start: Instant) -> String;
}

impl<R: Reporter + ?Sized> Reporter for std::sync::Arc<R> {
    fn send(&self, milestones: &[Milestone], time_start: Instant, channel: &str) {
        (**self).send(milestones, time_start, channel);
    }

    fn format(&self, milestones: &[Milestone], time_start: Instant) -> String {
        (**self).format(milestones, time_start)
    }
}
