//! Timer and milestone records.

use std::fmt;
use std::time::{Duration, Instant};

/// Identifier handed out by [`Profiler::create_timer`](crate::Profiler::create_timer).
///
/// Ids are 1-based and follow creation order, so the first timer of a session
/// is `TimerId(1)`. Id `n` addresses the `n - 1`th stored timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl TimerId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Id for the timer stored at `index`.
    #[must_use]
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u64 + 1)
    }

    /// Storage index, or `None` for id 0.
    #[must_use]
    pub(crate) fn index(self) -> Option<usize> {
        self.0.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single timer, open or finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerRecord {
    /// Timer id.
    pub id: TimerId,
    /// Type tag the timer was created under (empty by default).
    pub kind: String,
    /// When the timer was created.
    pub started: Instant,
    /// When the timer was last finalized.
    pub stopped: Option<Instant>,
    /// `stopped - started`, set together with `stopped`.
    pub duration: Option<Duration>,
    /// Message attached at finalization.
    pub message: Option<String>,
}

impl TimerRecord {
    pub(crate) fn open(id: TimerId, kind: &str, started: Instant) -> Self {
        Self {
            id,
            kind: kind.to_owned(),
            started,
            stopped: None,
            duration: None,
            message: None,
        }
    }

    /// Stamp the stop time and message. Calling this again overwrites both.
    pub(crate) fn finalize(&mut self, stopped: Instant, message: &str) {
        self.stopped = Some(stopped);
        self.duration = Some(stopped.saturating_duration_since(self.started));
        self.message = Some(message.to_owned());
    }

    /// Whether the timer has been stopped.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.stopped.is_some() && self.duration.is_some()
    }

    /// Duration in seconds, if finalized.
    #[must_use]
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }

    /// Whether this timer should show up in query results.
    ///
    /// Open timers never qualify. A threshold of `0.0` lets every finalized
    /// timer through, otherwise the duration must be strictly greater.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_significant(&self, threshold: f64) -> bool {
        if !self.is_finalized() {
            return false;
        }
        if threshold == 0.0 {
            return true;
        }
        self.duration_secs().is_some_and(|secs| secs > threshold)
    }
}

/// Point-in-time marker relative to the profiler start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    /// Elapsed time since the profiler was created.
    pub offset: Duration,
    /// Description of the event.
    pub text: String,
}

impl Milestone {
    /// Create a new milestone.
    #[must_use]
    pub fn new(offset: Duration, text: impl Into<String>) -> Self {
        Self {
            offset,
            text: text.into(),
        }
    }

    /// Offset in seconds.
    #[must_use]
    pub fn offset_secs(&self) -> f64 {
        self.offset.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_zero_has_no_index() {
        assert_eq!(TimerId::new(0).index(), None);
        assert_eq!(TimerId::new(1).index(), Some(0));
        assert_eq!(TimerId::from_index(4), TimerId(5));
    }

    #[test]
    fn open_timer_is_never_significant() {
        let record = TimerRecord::open(TimerId(1), "db", Instant::now());
        assert!(!record.is_finalized());
        assert!(!record.is_significant(0.0));
        assert!(!record.is_significant(-1.0));
    }

    #[test]
    fn zero_threshold_admits_zero_duration() {
        let now = Instant::now();
        let mut record = TimerRecord::open(TimerId(1), "", now);
        record.finalize(now, "instant");

        assert_eq!(record.duration, Some(Duration::ZERO));
        assert!(record.is_significant(0.0));
        assert!(!record.is_significant(0.001));
    }

    #[test]
    fn threshold_is_strict() {
        let start = Instant::now();
        let mut record = TimerRecord::open(TimerId(1), "", start);
        record.finalize(start + Duration::from_millis(500), "half");

        assert!(record.is_significant(0.25));
        assert!(!record.is_significant(0.5));
        assert!(!record.is_significant(1.0));
    }

    #[test]
    fn refinalize_overwrites() {
        let start = Instant::now();
        let mut record = TimerRecord::open(TimerId(3), "io", start);
        record.finalize(start + Duration::from_millis(10), "first");
        record.finalize(start + Duration::from_millis(30), "second");

        assert_eq!(record.duration, Some(Duration::from_millis(30)));
        assert_eq!(record.message.as_deref(), Some("second"));
    }

    #[test]
    fn display_id() {
        assert_eq!(TimerId(7).to_string(), "#7");
    }
}
