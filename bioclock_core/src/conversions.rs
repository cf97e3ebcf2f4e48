//! `From` implementations bridging `bioclock_config` types to `bioclock_core` types.

use crate::config::{PhaseCfg, ResolverCfg, TickerCfg, TimelineCfg, ToleranceCfg};
use std::time::Duration;

// ── ResolverCfg ──────────────────────────────────────────────────────────────

impl From<&bioclock_config::ResolverCfg> for ResolverCfg {
    fn from(c: &bioclock_config::ResolverCfg) -> Self {
        Self {
            default_onset_min: c.default_onset_min,
            default_duration_min: c.default_duration_min,
        }
    }
}

// ── PhaseCfg ─────────────────────────────────────────────────────────────────

impl From<&bioclock_config::PhaseCfg> for PhaseCfg {
    fn from(c: &bioclock_config::PhaseCfg) -> Self {
        Self {
            afterglow_factor: c.afterglow_factor,
        }
    }
}

// ── ToleranceCfg ─────────────────────────────────────────────────────────────

impl From<&bioclock_config::ToleranceCfg> for ToleranceCfg {
    fn from(c: &bioclock_config::ToleranceCfg) -> Self {
        Self {
            reset_days: c.reset_days,
            coefficient: c.coefficient,
            exponent: c.exponent,
        }
    }
}

// ── TickerCfg ────────────────────────────────────────────────────────────────

impl From<&bioclock_config::TickerCfg> for TickerCfg {
    fn from(c: &bioclock_config::TickerCfg) -> Self {
        Self {
            interval: Duration::from_millis(c.interval_ms),
        }
    }
}

// ── TimelineCfg ──────────────────────────────────────────────────────────────

impl From<&bioclock_config::Config> for TimelineCfg {
    fn from(c: &bioclock_config::Config) -> Self {
        Self {
            resolver: (&c.resolver).into(),
            phase: (&c.phase).into(),
        }
    }
}
