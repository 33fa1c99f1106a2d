//! Simulated request workload instrumented with lapwatch.
//!
//! Runs a handful of fake requests, each with a database query and a batch
//! of cache lookups, then sends the milestone report on the selected channel.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p lapwatch-demo
//! cargo run -p lapwatch-demo -- --channel dump --threshold 0.005 --requests 3
//! LAPWATCH_CHANNEL=hidden RUST_LOG=debug cargo run -p lapwatch-demo
//! ```

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use lapwatch_profiler::{
    milestone, profile_timer, ProfilerConfig, ProfilerHandle, SystemClock, TimerRecord,
};
use lapwatch_report::ChannelReporter;
use tracing_subscriber::EnvFilter;

/// Requests simulated when `--requests` is not given.
const DEFAULT_REQUESTS: u32 = 3;

/// Cache lookups per request.
const CACHE_LOOKUPS: u32 = 4;

struct Args {
    channel: Option<String>,
    threshold: Option<f64>,
    requests: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let mut config = ProfilerConfig::from_env().context("invalid profiler environment")?;
    if let Some(channel) = args.channel {
        config.channel = channel;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let profiler = ProfilerHandle::with_config_and_clock(config, Arc::new(SystemClock));
    profiler.set_reporter(Box::new(ChannelReporter::stdout()));
    milestone!(profiler, "startup");

    for request in 1..=args.requests {
        handle_request(&profiler, request);
    }

    for (kind, timers) in profiler.typed_timers("") {
        let total: Duration = timers.iter().filter_map(|t| t.duration).sum();
        tracing::info!(kind = %kind, count = timers.len(), ?total, "significant timers");
    }

    milestone!(profiler, "shutdown");
    profiler.send_configured_report();
    Ok(())
}

fn handle_request(profiler: &ProfilerHandle, request: u32) {
    profile_timer!(profiler, "request", format!("request {request} served"));

    let id = profiler.start_timer("db");
    thread::sleep(Duration::from_millis(u64::from(2 + request % 3) * 3));
    if let Err(e) = profiler.stop_timer(id, &format!("query for request {request}")) {
        tracing::warn!("Failed to stop db timer: {}", e);
    }

    let lookups_started = Instant::now();
    match cache_lookups(profiler, request, thread::sleep) {
        Ok(records) => tracing::debug!(request, flushed = records.len(), "cache timers stopped"),
        Err(e) => tracing::warn!("Failed to stop cache timers: {}", e),
    }
    profiler.add_timed_milestone(&format!("cache lookups for request {request}"), lookups_started);

    milestone!(profiler, "request {request} handled");
}

/// Type tag for the cache timers of one request.
fn cache_kind(request: u32) -> String {
    format!("cache:{request}")
}

/// Time a batch of cache lookups and flush them together.
///
/// Each request gets its own type tag so the flush leaves earlier requests'
/// timers alone.
fn cache_lookups(
    profiler: &ProfilerHandle,
    request: u32,
    pause: impl Fn(Duration),
) -> lapwatch_profiler::Result<Vec<TimerRecord>> {
    let kind = cache_kind(request);
    for _ in 0..CACHE_LOOKUPS {
        profiler.start_timer(&kind);
        pause(Duration::from_millis(1));
    }
    profiler.stop_typed_timers(&kind, "cache flush")
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        channel: None,
        threshold: None,
        requests: DEFAULT_REQUESTS,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--channel" | "-c" => {
                parsed.channel = Some(value.context("--channel needs a value")?.clone());
                i += 1;
            }
            "--threshold" | "-t" => {
                let raw = value.context("--threshold needs a value")?;
                parsed.threshold =
                    Some(raw.parse::<f64>().with_context(|| format!("invalid threshold {raw:?}"))?);
                i += 1;
            }
            "--requests" | "-n" => {
                let raw = value.context("--requests needs a value")?;
                parsed.requests = raw
                    .parse::<u32>()
                    .with_context(|| format!("invalid request count {raw:?}"))?;
                i += 1;
            }
            "--help" | "-h" => {
                println!("lapwatch-demo - simulated workload with profiling report");
                println!();
                println!("Usage: lapwatch-demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --channel <NAME>     Report channel: dump, hidden, none");
                println!("  -t, --threshold <SECS>   Minimum timer duration to report");
                println!("  -n, --requests <COUNT>   Requests to simulate (default: {DEFAULT_REQUESTS})");
                println!("  -h, --help               Show this help");
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other:?}"),
        }
        i += 1;
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use lapwatch_profiler::ManualClock;

    use super::*;

    #[test]
    fn cache_flush_leaves_earlier_requests_alone() {
        let clock = ManualClock::new();
        let profiler =
            ProfilerHandle::with_config_and_clock(ProfilerConfig::default(), Arc::new(clock.clone()));
        let pause = |by: Duration| clock.advance(by);

        let first = cache_lookups(&profiler, 1, pause).unwrap();
        assert_eq!(first.len(), CACHE_LOOKUPS as usize);
        assert_eq!(first[0].duration, Some(Duration::from_millis(4)));

        clock.advance_ms(100);
        let second = cache_lookups(&profiler, 2, pause).unwrap();
        assert_eq!(second.len(), CACHE_LOOKUPS as usize);

        let typed = profiler.typed_timers("");
        assert_eq!(typed[&cache_kind(1)], first);
        assert_eq!(typed[&cache_kind(2)], second);
        let total: Duration = typed
            .values()
            .flatten()
            .filter_map(|t| t.duration)
            .sum();
        assert_eq!(total, Duration::from_millis(2 * (4 + 3 + 2 + 1)));
    }
}
