//! Plain-text rendering of a profiling session.

use std::fmt::Write as _;
use std::time::Instant;

use lapwatch_profiler::Milestone;

/// Render a summary of a session.
///
/// Includes the time elapsed between `time_start` and `now` in seconds with
/// eight decimals, the peak memory usage, and one line per milestone.
#[must_use]
pub fn format_report(
    milestones: &[Milestone],
    time_start: Instant,
    now: Instant,
    peak_memory: Option<u64>,
) -> String {
    let total = now.saturating_duration_since(time_start).as_secs_f64();
    let memory = peak_memory.map_or_else(
        || "n/a".to_owned(),
        |bytes| format!("{} bytes", group_thousands(bytes)),
    );

    let mut out = String::new();
    let _ = writeln!(out, "total time: {total:.8} s");
    let _ = writeln!(out, "peak memory: {memory}");
    let _ = writeln!(out, "milestones: {}", milestones.len());
    for milestone in milestones {
        let _ = writeln!(out, "  [{:.4}] {}", milestone.offset_secs(), milestone.text);
    }
    out
}

/// Format `value` with `,` between groups of three digits.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Peak resident memory of this process in bytes, where the platform exposes it.
#[must_use]
pub fn peak_memory_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => parse_vm_hwm(&status),
            Err(e) => {
                tracing::debug!("Failed to read process status: {}", e);
                None
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Extract the `VmHWM` line (reported in kB) from `/proc/<pid>/status`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_vm_hwm(status: &str) -> Option<u64> {
    let rest = status.lines().find_map(|l| l.strip_prefix("VmHWM:"))?;
    let mut parts = rest.split_whitespace();
    let value: u64 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some("kB") | None => value.checked_mul(1024),
        Some(_) => None,
    }
}
