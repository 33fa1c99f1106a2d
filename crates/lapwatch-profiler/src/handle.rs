//! Shared profiler handle.
//!
//! Call sites across a program usually want to report into one profiler
//! without threading `&mut Profiler` everywhere. [`ProfilerHandle`] is that
//! shared reference: clone it into whatever needs it, and every clone talks to
//! the same [`Profiler`].
//!
//! The profiler behind a handle is built lazily, on the first operation that
//! touches it, so its start time is the moment profiling actually begins
//! rather than the moment the handle was created. It lives until the last
//! clone is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::config::ProfilerConfig;
use crate::error::Result;
use crate::profiler::Profiler;
use crate::record::{Milestone, TimerId, TimerRecord};
use crate::reporter::Reporter;

struct Shared {
    config: ProfilerConfig,
    clock: Arc<dyn Clock>,
    profiler: OnceLock<Mutex<Profiler>>,
}

/// Cloneable reference to one lazily created [`Profiler`].
#[derive(Clone)]
pub struct ProfilerHandle {
    shared: Arc<Shared>,
}

impl Default for ProfilerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProfilerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilerHandle")
            .field("config", &self.shared.config)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl ProfilerHandle {
    /// Handle to a default profiler on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ProfilerConfig::default())
    }

    /// Handle whose profiler will be built from `config`.
    #[must_use]
    pub fn with_config(config: ProfilerConfig) -> Self {
        Self::with_config_and_clock(config, Arc::new(SystemClock))
    }

    /// Handle whose profiler will be built from `config` and driven by `clock`.
    #[must_use]
    pub fn with_config_and_clock(config: ProfilerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                clock,
                profiler: OnceLock::new(),
            }),
        }
    }

    /// Configuration the profiler is (or will be) built from.
    #[must_use]
    pub fn config(&self) -> &ProfilerConfig {
        &self.shared.config
    }

    /// Whether the profiler has been created yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.shared.profiler.get().is_some()
    }

    /// Whether two handles refer to the same profiler.
    #[must_use]
    pub fn same_profiler(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Lock the profiler, creating it first if needed.
    ///
    /// Calling any other handle method while the guard is alive deadlocks.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Profiler> {
        self.shared
            .profiler
            .get_or_init(|| {
                tracing::debug!(threshold = self.shared.config.threshold, "profiler initialized");
                Mutex::new(Profiler::from_config(
                    &self.shared.config,
                    Arc::clone(&self.shared.clock),
                ))
            })
            .lock()
    }

    /// Start a timer under `kind`.
    pub fn start_timer(&self, kind: &str) -> TimerId {
        self.lock().create_timer(kind)
    }

    /// Stop the timer `id`.
    pub fn stop_timer(&self, id: TimerId, message: &str) -> Result<TimerRecord> {
        self.lock().finalize_timer(id, message)
    }

    /// Stop every timer of `kind` at the same instant.
    pub fn stop_typed_timers(&self, kind: &str, message: &str) -> Result<Vec<TimerRecord>> {
        self.lock().finalize_typed_timers(kind, message)
    }

    /// Record a milestone.
    pub fn add_milestone(&self, text: impl Into<String>) {
        self.lock().add_milestone(text);
    }

    /// Record a milestone for an activity that began at `activity_started`.
    pub fn add_timed_milestone(&self, text: &str, activity_started: Instant) -> bool {
        self.lock().add_timed_milestone(text, activity_started)
    }

    /// Finalized timers above the threshold.
    #[must_use]
    pub fn timers(&self) -> Vec<TimerRecord> {
        self.lock().timers()
    }

    /// Finalized timers above the threshold, grouped by type.
    #[must_use]
    pub fn typed_timers(&self, kind: &str) -> BTreeMap<String, Vec<TimerRecord>> {
        self.lock().typed_timers(kind)
    }

    /// Copy of the milestones recorded so far.
    #[must_use]
    pub fn milestones(&self) -> Vec<Milestone> {
        self.lock().milestones().to_vec()
    }

    /// Start time of the shared profiler.
    #[must_use]
    pub fn time_start(&self) -> Instant {
        self.lock().time_start()
    }

    /// Current threshold in seconds.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.lock().threshold()
    }

    /// Change the threshold.
    pub fn set_threshold(&self, seconds: f64) {
        self.lock().set_threshold(seconds);
    }

    /// Install a reporter.
    pub fn set_reporter(&self, reporter: Box<dyn Reporter>) {
        self.lock().set_reporter(reporter);
    }

    /// Send a report on `channel`.
    ///
    /// The reporter runs after the lock is released, so it may use this
    /// handle and other threads are not held up by its output.
    pub fn send_report(&self, channel: &str) {
        let (reporter, milestones, time_start) = {
            let profiler = self.lock();
            let Some(reporter) = profiler.reporter() else {
                return;
            };
            (reporter, profiler.milestones().to_vec(), profiler.time_start())
        };
        reporter.send(&milestones, time_start, channel);
    }

    /// Send a report on the configured channel.
    pub fn send_configured_report(&self) {
        let channel = self.shared.config.channel.clone();
        self.send_report(&channel);
    }
}
