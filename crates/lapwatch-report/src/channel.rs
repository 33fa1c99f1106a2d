//! Channel dispatch for profiling reports.

use std::fmt;
use std::io::{self, Stdout, Write};
use std::time::Instant;

use lapwatch_profiler::{Milestone, Reporter};
use parking_lot::{Mutex, MutexGuard};

use crate::format::{format_report, peak_memory_bytes};

/// Where a report goes, chosen by the channel string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Channel {
    /// Write the report as plain text.
    Dump,
    /// Write the report wrapped in a markup comment.
    Hidden,
    /// Write nothing. Also used for unrecognized channel names.
    #[default]
    Suppress,
}

impl Channel {
    /// Map a channel name to a channel; unknown names suppress output.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "dump" => Self::Dump,
            "hidden" => Self::Hidden,
            _ => Self::Suppress,
        }
    }

    /// Canonical name of this channel.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Dump => "dump",
            Self::Hidden => "hidden",
            Self::Suppress => "none",
        }
    }
}

impl From<&str> for Channel {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reporter that writes a text summary to a sink according to the channel.
pub struct ChannelReporter<W> {
    sink: Mutex<W>,
}

impl ChannelReporter<Stdout> {
    /// Reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ChannelReporter<W> {
    /// Reporter writing to `sink`.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Access the underlying sink.
    pub fn sink(&self) -> MutexGuard<'_, W> {
        self.sink.lock()
    }

    /// Take the sink back.
    pub fn into_inner(self) -> W {
        self.sink.into_inner()
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut sink = self.sink.lock();
        sink.write_all(text.as_bytes())?;
        sink.flush()
    }
}

impl<W: Write + Send> Reporter for ChannelReporter<W> {
    fn send(&self, milestones: &[Milestone], time_start: Instant, channel: &str) {
        if milestones.is_empty() {
            return;
        }

        let text = match Channel::parse(channel) {
            Channel::Dump => self.format(milestones, time_start),
            Channel::Hidden => format!("<!--\n{}-->\n", self.format(milestones, time_start)),
            Channel::Suppress => {
                tracing::debug!(channel, "profiler report suppressed");
                return;
            }
        };

        if let Err(e) = self.write(&text) {
            tracing::warn!("Failed to write profiler report: {}", e);
        }
    }

    fn format(&self, milestones: &[Milestone], time_start: Instant) -> String {
        format_report(milestones, time_start, Instant::now(), peak_memory_bytes())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use lapwatch_profiler::{ManualClock, Profiler};

    use super::*;

    fn milestones() -> Vec<Milestone> {
        vec![
            Milestone::new(Duration::from_millis(2), "boot"),
            Milestone::new(Duration::from_millis(9), "request handled"),
        ]
    }

    fn output(reporter: ChannelReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn parses_channel_names() {
        assert_eq!(Channel::parse("dump"), Channel::Dump);
        assert_eq!(Channel::parse("hidden"), Channel::Hidden);
        assert_eq!(Channel::parse("none"), Channel::Suppress);
        assert_eq!(Channel::parse(""), Channel::Suppress);
        assert_eq!(Channel::from("DUMP"), Channel::Suppress);
        assert_eq!(Channel::Hidden.to_string(), "hidden");
    }

    #[test]
    fn dump_writes_plain_report() {
        let reporter = ChannelReporter::new(Vec::new());
        reporter.send(&milestones(), Instant::now(), "dump");

        let text = output(reporter);
        assert!(text.starts_with("total time: "));
        assert!(text.contains("peak memory: "));
        assert!(text.contains("  [0.0020] boot\n"));
        assert!(text.ends_with("  [0.0090] request handled\n"));
    }

    #[test]
    fn hidden_wraps_in_comment() {
        let reporter = ChannelReporter::new(Vec::new());
        reporter.send(&milestones(), Instant::now(), "hidden");

        let text = output(reporter);
        assert!(text.starts_with("<!--\ntotal time: "));
        assert!(text.ends_with("request handled\n-->\n"));
    }

    #[test]
    fn none_and_unknown_channels_write_nothing() {
        for channel in ["none", "", "email"] {
            let reporter = ChannelReporter::new(Vec::new());
            reporter.send(&milestones(), Instant::now(), channel);
            assert!(output(reporter).is_empty(), "channel {channel:?}");
        }
    }

    #[test]
    fn empty_session_writes_nothing() {
        let reporter = ChannelReporter::new(Vec::new());
        reporter.send(&[], Instant::now(), "dump");
        assert!(output(reporter).is_empty());
    }

    #[test]
    fn write_failure_is_swallowed() {
        let reporter = ChannelReporter::new(FailingSink);
        reporter.send(&milestones(), Instant::now(), "dump");
    }

    #[test]
    fn installed_on_profiler() {
        let clock = ManualClock::new();
        let mut profiler = Profiler::with_clock(Arc::new(clock.clone()));
        let reporter = Arc::new(ChannelReporter::new(Vec::new()));
        profiler.set_reporter(Box::new(Arc::clone(&reporter)));

        clock.advance_ms(5);
        profiler.add_milestone("request handled");
        profiler.send_report("dump");

        let text = String::from_utf8(reporter.sink().clone()).unwrap();
        assert!(text.contains("milestones: 1\n  [0.0050] request handled\n"));
    }
}
