//! Scope guards and instrumentation macros.

use crate::handle::ProfilerHandle;
use crate::record::TimerId;

/// RAII guard that finalizes a timer on drop.
pub struct TimerGuard {
    handle: ProfilerHandle,
    id: TimerId,
    message: String,
}

impl TimerGuard {
    /// Start a timer of `kind` on `handle`, to be stopped with `message`.
    #[inline]
    #[must_use]
    pub fn new(handle: &ProfilerHandle, kind: &str, message: impl Into<String>) -> Self {
        Self {
            handle: handle.clone(),
            id: handle.start_timer(kind),
            message: message.into(),
        }
    }

    /// Id of the running timer.
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// Replace the message recorded when the guard drops.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

impl Drop for TimerGuard {
    #[inline]
    fn drop(&mut self) {
        let _ = self.handle.stop_timer(self.id, &self.message);
    }
}

/// Time the rest of the enclosing scope.
///
/// When the `profiling` feature is disabled, this macro expands to nothing.
///
/// # Examples
///
/// ```ignore
/// use lapwatch_profiler::{profile_timer, ProfilerHandle};
///
/// fn load(handle: &ProfilerHandle) {
///     profile_timer!(handle, "db", "load finished");
///     // ... query
/// } // timer finalized here
/// ```
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_timer {
    ($handle:expr, $kind:expr, $message:expr) => {
        let _timer_guard = $crate::TimerGuard::new(&$handle, $kind, $message);
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_timer {
    ($handle:expr, $kind:expr, $message:expr) => {};
}

/// Record a milestone on a handle.
///
/// Accepts `format!` arguments. When the `profiling` feature is disabled,
/// this macro expands to nothing.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! milestone {
    ($handle:expr, $($arg:tt)+) => {
        $handle.add_milestone(format!($($arg)+));
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! milestone {
    ($handle:expr, $($arg:tt)+) => {};
}
