//! Runtime configuration for the timeline engine.
//!
//! These are the structs the engine functions take. They are separate from the
//! TOML-deserialized config in `bioclock_config`; see `conversions`.

use std::time::Duration;

/// Missing-data defaults for the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverCfg {
    /// Onset used when no usable onset text exists (minutes). Default: 30.
    pub default_onset_min: f64,
    /// Duration used when no usable duration text exists (minutes). Default: 240.
    pub default_duration_min: f64,
}

impl Default for ResolverCfg {
    fn default() -> Self {
        Self {
            default_onset_min: 30.0,
            default_duration_min: 240.0,
        }
    }
}

/// Phase classification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCfg {
    /// Total window = duration * afterglow_factor. Default: 1.2 (20% tail).
    pub afterglow_factor: f64,
}

impl Default for PhaseCfg {
    fn default() -> Self {
        Self {
            afterglow_factor: 1.2,
        }
    }
}

/// Power-law tolerance model: percent = coefficient * days ^ exponent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceCfg {
    /// At or beyond this many days the desired dose is returned unchanged.
    pub reset_days: f64,
    pub coefficient: f64,
    pub exponent: f64,
}

impl Default for ToleranceCfg {
    fn default() -> Self {
        Self {
            reset_days: 14.0,
            coefficient: 280.059565,
            exponent: -0.412565956,
        }
    }
}

/// Everything the timeline view needs per tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineCfg {
    pub resolver: ResolverCfg,
    pub phase: PhaseCfg,
}

/// Background tick settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerCfg {
    pub interval: Duration,
}

impl Default for TickerCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5_000),
        }
    }
}
