//! Lifecycle phase of a logged dose.
//!
//! Pure function of `(now - dose_time)` and the resolved onset/duration; cheap
//! enough to recompute on every tick.

use crate::config::{PhaseCfg, ResolverCfg};
use crate::dose::DoseEvent;
use crate::resolver::ResolvedTimes;
use crate::substance::SubstanceLookup;
use crate::util::MILLIS_PER_MINUTE;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[serde(rename = "Come Up")]
    ComeUp,
    #[serde(rename = "Peak / Plateau")]
    Peak,
    #[serde(rename = "Comedown")]
    Comedown,
    #[serde(rename = "Afterglow / Sober")]
    Afterglow,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::ComeUp => "Come Up",
            Stage::Peak => "Peak / Plateau",
            Stage::Comedown => "Comedown",
            Stage::Afterglow => "Afterglow / Sober",
        }
    }

    /// Everything before the afterglow counts as active.
    pub fn is_active(self) -> bool {
        !matches!(self, Stage::Afterglow)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseResult {
    pub stage: Stage,
    pub elapsed_minutes: f64,
    pub onset_minutes: f64,
    pub duration_minutes: f64,
    /// In [0, 100].
    pub percent_complete: f64,
}

impl PhaseResult {
    /// `duration * afterglow_factor`.
    pub fn total_window(&self, cfg: &PhaseCfg) -> f64 {
        self.duration_minutes * cfg.afterglow_factor
    }
}

/// Classify an elapsed time against resolved onset/duration. Negative elapsed
/// time is treated as 0. First matching rule wins.
pub fn classify(elapsed: f64, times: ResolvedTimes, cfg: &PhaseCfg) -> PhaseResult {
    let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
    let onset = times.onset_minutes;
    let duration = times.duration_minutes;
    let total_window = duration * cfg.afterglow_factor;

    let percent_complete = if total_window > 0.0 {
        (elapsed / total_window * 100.0).clamp(0.0, 100.0)
    } else {
        100.0
    };

    let stage = if elapsed < onset {
        Stage::ComeUp
    } else if elapsed < duration {
        Stage::Peak
    } else if elapsed < total_window {
        Stage::Comedown
    } else {
        Stage::Afterglow
    };

    PhaseResult {
        stage,
        elapsed_minutes: elapsed,
        onset_minutes: onset,
        duration_minutes: duration,
        percent_complete,
    }
}

/// Fractional minutes from `dose_time` to `now`, 0 when the dose is in the future.
pub fn elapsed_minutes(dose_time: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = now.signed_duration_since(dose_time).num_milliseconds();
    (ms.max(0) as f64) / MILLIS_PER_MINUTE as f64
}

/// Phase of `dose` at `now`, resolving timings through `lookup` with the
/// dose's recorded route. Unknown substances use the resolver defaults.
pub fn compute_phase<L: SubstanceLookup + ?Sized>(
    dose: &DoseEvent,
    lookup: &L,
    now: DateTime<Utc>,
    resolver: &ResolverCfg,
    phase: &PhaseCfg,
) -> PhaseResult {
    let profile = lookup.find(&dose.substance);
    if profile.is_none() {
        tracing::trace!(substance = %dose.substance, "substance not in catalog; using defaults");
    }
    let times = ResolvedTimes::resolve(profile, &dose.route, resolver);
    classify(elapsed_minutes(dose.dose_time, now), times, phase)
}
