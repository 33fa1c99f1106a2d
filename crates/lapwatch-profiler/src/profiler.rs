//! Timer and milestone bookkeeping.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::config::ProfilerConfig;
use crate::error::{ProfilerError, Result};
use crate::record::{Milestone, TimerId, TimerRecord};
use crate::reporter::Reporter;

/// Collects timers and milestones relative to a fixed start time.
pub struct Profiler {
    /// Source of every timestamp.
    clock: Arc<dyn Clock>,
    /// Captured once at construction.
    time_start: Instant,
    /// Minimum duration in seconds for a timer to be reported.
    threshold: f64,
    /// Timers in creation order; id `n` lives at index `n - 1`.
    timers: Vec<TimerRecord>,
    /// Timer ids per type, in creation order.
    timer_types: HashMap<String, Vec<TimerId>>,
    /// Milestones in insertion order.
    milestones: Vec<Milestone>,
    /// Receives the milestones on `send_report`.
    reporter: Option<Arc<dyn Reporter>>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Create a profiler driven by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a profiler driven by the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let time_start = clock.now();
        Self {
            clock,
            time_start,
            threshold: 0.0,
            timers: Vec::new(),
            timer_types: HashMap::new(),
            milestones: Vec::new(),
            reporter: None,
        }
    }

    /// Create a profiler with settings from `config`.
    #[must_use]
    pub fn from_config(config: &ProfilerConfig, clock: Arc<dyn Clock>) -> Self {
        let mut profiler = Self::with_clock(clock);
        profiler.set_threshold(config.threshold);
        profiler
    }

    /// When the profiler was created.
    #[must_use]
    pub const fn time_start(&self) -> Instant {
        self.time_start
    }

    /// Current threshold in seconds.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Set the minimum duration, in seconds, a timer must exceed to be reported.
    ///
    /// `0.0` disables filtering. The value is stored as given.
    pub fn set_threshold(&mut self, seconds: f64) {
        self.threshold = seconds;
    }

    /// Install the reporter used by [`send_report`](Self::send_report).
    pub fn set_reporter(&mut self, reporter: Box<dyn Reporter>) {
        self.reporter = Some(Arc::from(reporter));
    }

    /// Shared reference to the installed reporter.
    pub(crate) fn reporter(&self) -> Option<Arc<dyn Reporter>> {
        self.reporter.clone()
    }

    /// Whether a reporter is installed.
    #[must_use]
    pub fn has_reporter(&self) -> bool {
        self.reporter.is_some()
    }

    /// Start a new timer under `kind` and return its id.
    pub fn create_timer(&mut self, kind: &str) -> TimerId {
        let id = TimerId::from_index(self.timers.len());
        self.timers.push(TimerRecord::open(id, kind, self.clock.now()));
        self.timer_types.entry(kind.to_owned()).or_default().push(id);

        tracing::trace!(%id, kind, "timer created");
        id
    }

    /// Stop the timer `id`, attach `message`, and return the completed record.
    ///
    /// Finalizing the same timer again overwrites the previous stop time and
    /// message.
    pub fn finalize_timer(&mut self, id: TimerId, message: &str) -> Result<TimerRecord> {
        let now = self.clock.now();
        let Some(record) = id.index().and_then(|i| self.timers.get_mut(i)) else {
            tracing::debug!(%id, "finalize on unknown timer");
            return Err(ProfilerError::TimerNotFound(id));
        };

        record.finalize(now, message);
        tracing::trace!(%id, duration = ?record.duration, "timer finalized");
        Ok(record.clone())
    }

    /// Stop every timer created under `kind` with one shared timestamp.
    ///
    /// Each timer keeps its own start time, so durations may differ while
    /// `stopped` is identical across the batch.
    pub fn finalize_typed_timers(
        &mut self,
        kind: &str,
        message: &str,
    ) -> Result<Vec<TimerRecord>> {
        let Some(ids) = self.timer_types.get(kind) else {
            tracing::debug!(kind, "finalize on unknown timer type");
            return Err(ProfilerError::TypeNotFound(kind.to_owned()));
        };

        let stopped = self.clock.now();
        let mut finalized = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = id.index().and_then(|i| self.timers.get_mut(i)) {
                record.finalize(stopped, message);
                finalized.push(record.clone());
            }
        }

        tracing::trace!(kind, count = finalized.len(), "typed timers finalized");
        Ok(finalized)
    }

    /// Finalized timers above the threshold, in creation order.
    #[must_use]
    pub fn timers(&self) -> Vec<TimerRecord> {
        self.timers
            .iter()
            .filter(|t| t.is_significant(self.threshold))
            .cloned()
            .collect()
    }

    /// Finalized timers above the threshold, grouped by type.
    ///
    /// An empty `kind` returns every known type. A known type with no
    /// qualifying timers maps to an empty list; an unknown type yields an
    /// empty map.
    #[must_use]
    pub fn typed_timers(&self, kind: &str) -> BTreeMap<String, Vec<TimerRecord>> {
        self.timer_types
            .iter()
            .filter(|(name, _)| kind.is_empty() || name.as_str() == kind)
            .map(|(name, ids)| (name.clone(), self.significant(ids)))
            .collect()
    }

    /// Ids created under `kind`, in creation order.
    #[must_use]
    pub fn timer_ids(&self, kind: &str) -> &[TimerId] {
        self.timer_types.get(kind).map_or(&[][..], Vec::as_slice)
    }

    /// Every timer, open or finalized, ignoring the threshold.
    #[must_use]
    pub fn all_timers(&self) -> &[TimerRecord] {
        &self.timers
    }

    fn significant(&self, ids: &[TimerId]) -> Vec<TimerRecord> {
        ids.iter()
            .filter_map(|id| id.index().and_then(|i| self.timers.get(i)))
            .filter(|t| t.is_significant(self.threshold))
            .cloned()
            .collect()
    }

    /// Record a milestone at the current offset from the start time.
    pub fn add_milestone(&mut self, text: impl Into<String>) {
        let offset = self.clock.now().saturating_duration_since(self.time_start);
        self.milestones.push(Milestone::new(offset, text));
    }

    /// Record a milestone for an activity that began at `activity_started`.
    ///
    /// The activity duration is appended to the text in milliseconds. Unlike
    /// [`add_milestone`](Self::add_milestone), the milestone is dropped when
    /// the activity did not take longer than the threshold. Returns whether it
    /// was recorded.
    pub fn add_timed_milestone(&mut self, text: &str, activity_started: Instant) -> bool {
        let now = self.clock.now();
        let activity = now.saturating_duration_since(activity_started);
        if activity.as_secs_f64() <= self.threshold {
            return false;
        }

        let text = format!("{text} in {:.4} milliseconds", activity.as_secs_f64() * 1000.0);
        let offset = now.saturating_duration_since(self.time_start);
        self.milestones.push(Milestone::new(offset, text));
        true
    }

    /// Milestones in the order they were added.
    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Hand the milestones to the reporter, if one is installed.
    pub fn send_report(&self, channel: &str) {
        if let Some(reporter) = &self.reporter {
            reporter.send(&self.milestones, self.time_start, channel);
        }
    }

    /// Render the milestones through the reporter without sending them.
    #[must_use]
    pub fn format_report(&self) -> Option<String> {
        self.reporter
            .as_ref()
            .map(|r| r.format(&self.milestones, self.time_start))
    }
}
