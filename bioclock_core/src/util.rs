//! Common time helpers for bioclock_core.

use std::time::Duration;

/// Number of milliseconds in one minute.
pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// Shortest tick the ticker will honor.
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// Clamp a tick interval to at least [`MIN_TICK`].
#[inline]
pub fn clamp_interval(d: Duration) -> Duration {
    d.max(MIN_TICK)
}

/// Render minutes as `"2h 05m"` / `"45m"`; negative and non-finite inputs render as `"0m"`.
pub fn format_minutes(minutes: f64) -> String {
    let total = if minutes.is_finite() {
        minutes.max(0.0).round() as u64
    } else {
        0
    };
    let (h, m) = (total / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m")
    } else {
        format!("{m}m")
    }
}
