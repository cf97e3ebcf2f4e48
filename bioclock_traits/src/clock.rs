use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::{Arc, Mutex};

/// Wall-clock abstraction shared by the timeline, the ticker and the server.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Default, real-time clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock whose time is advanced manually.
///
/// now() = origin + offset, saturating at the largest representable time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: DateTime<Utc>,
    offset: Arc<Mutex<ChronoDuration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc::now())
    }
}

impl ManualClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            offset: Arc::new(Mutex::new(ChronoDuration::zero())),
        }
    }

    /// Advance the clock by whole minutes.
    pub fn advance_minutes(&self, minutes: i64) {
        let step = ChronoDuration::try_minutes(minutes).unwrap_or(ChronoDuration::MAX);
        if let Ok(mut off) = self.offset.lock() {
            *off = off.checked_add(&step).unwrap_or(ChronoDuration::MAX);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let off = self
            .offset
            .lock()
            .map(|g| *g)
            .unwrap_or_else(|_| ChronoDuration::zero());
        self.origin
            .checked_add_signed(off)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
