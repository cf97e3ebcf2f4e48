//! Onset/duration resolution in minutes.
//!
//! Precedence, highest first:
//! 1. route-class hard overrides (`route` module)
//! 2. raw text: `formatted_<field>` (value + unit), else `properties.<field>`
//!    (the same string serves as value and unit)
//! 3. missing text or no usable number -> configured defaults
//! 4. range `a - b` -> mean, else the first number
//! 5. unit: hour/hr -> x60, min/m -> as is
//! 6. no unit: durations for short-acting names stay minutes, otherwise
//!    values <= 24 are hours; onsets are returned as parsed

use crate::config::ResolverCfg;
use crate::route::{RouteClass, is_short_acting};
use crate::substance::SubstanceProfile;
use serde::Serialize;

/// Bare numbers above this are taken as minutes rather than hours.
pub const AMBIGUOUS_HOURS_MAX: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Onset,
    Duration,
}

impl TimeField {
    fn default_minutes(self, cfg: &ResolverCfg) -> f64 {
        match self {
            TimeField::Onset => cfg.default_onset_min,
            TimeField::Duration => cfg.default_duration_min,
        }
    }
}

/// Unit inferred from a unit (or free-text) string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitHint {
    Hours,
    Minutes,
    Unknown,
}

impl UnitHint {
    pub fn detect(unit: &str) -> Self {
        let u = unit.to_lowercase();
        if u.contains("hour") || u.contains("hr") {
            UnitHint::Hours
        } else if u.contains("min")
            || u.split(|c: char| !c.is_alphabetic()).any(|tok| tok == "m")
        {
            UnitHint::Minutes
        } else {
            UnitHint::Unknown
        }
    }
}

/// Raw text picked for a field before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTime<'a> {
    pub value: &'a str,
    pub unit: &'a str,
}

/// Structured field first; the free-text property only when the structured one is absent.
pub fn raw_time(profile: &SubstanceProfile, field: TimeField) -> Option<RawTime<'_>> {
    let formatted = match field {
        TimeField::Onset => profile.formatted_onset.as_ref(),
        TimeField::Duration => profile.formatted_duration.as_ref(),
    };
    if let Some(f) = formatted {
        return (!f.value.is_empty()).then_some(RawTime {
            value: &f.value,
            unit: &f.unit,
        });
    }
    let props = profile.properties.as_ref()?;
    let text = match field {
        TimeField::Onset => props.onset.as_deref(),
        TimeField::Duration => props.duration.as_deref(),
    }?;
    (!text.is_empty()).then_some(RawTime {
        value: text,
        unit: text,
    })
}

/// Decimal numbers in `text` as `(start, end, value)` byte spans.
fn numbers(text: &str) -> Vec<(usize, usize, f64)> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        if let Ok(v) = text[start..i].parse::<f64>() {
            out.push((start, i, v));
        }
    }
    out
}

/// Parse `"2-4"` style text: the mean of the first hyphenated pair, else the
/// first number. Non-finite results count as unparseable; `"0"` is a real zero.
pub fn parse_range(text: &str) -> Option<f64> {
    let nums = numbers(text);
    let range = nums.windows(2).find_map(|w| {
        let (_, end, lo) = w[0];
        let (start, _, hi) = w[1];
        (text[end..start].trim() == "-").then_some((lo + hi) / 2.0)
    });
    range
        .or_else(|| nums.first().map(|n| n.2))
        .filter(|v| v.is_finite())
}

/// Resolve one field of a known profile to minutes.
pub fn resolve(
    profile: &SubstanceProfile,
    field: TimeField,
    route: &str,
    cfg: &ResolverCfg,
) -> f64 {
    let class = RouteClass::classify(route);
    let name = profile.name.as_str();

    let overridden = match field {
        TimeField::Onset => class.onset_override(),
        TimeField::Duration => class.duration_override(name),
    };
    if let Some(minutes) = overridden {
        tracing::trace!(substance = name, route, ?field, minutes, "route override");
        return minutes;
    }

    let Some(raw) = raw_time(profile, field) else {
        return field.default_minutes(cfg);
    };
    let Some(value) = parse_range(raw.value) else {
        tracing::debug!(substance = name, ?field, text = raw.value, "unparseable time text");
        return field.default_minutes(cfg);
    };

    let minutes = match UnitHint::detect(raw.unit) {
        UnitHint::Hours => value * 60.0,
        UnitHint::Minutes => value,
        UnitHint::Unknown => match field {
            TimeField::Onset => value,
            TimeField::Duration if is_short_acting(name) => value,
            TimeField::Duration if value <= AMBIGUOUS_HOURS_MAX => value * 60.0,
            TimeField::Duration => value,
        },
    };
    // hours near f64::MAX overflow to infinity
    if minutes.is_finite() {
        minutes
    } else {
        field.default_minutes(cfg)
    }
}

/// Like [`resolve`], but unknown substances get the configured defaults.
pub fn resolve_or_default(
    profile: Option<&SubstanceProfile>,
    field: TimeField,
    route: &str,
    cfg: &ResolverCfg,
) -> f64 {
    match profile {
        Some(p) => resolve(p, field, route, cfg),
        None => field.default_minutes(cfg),
    }
}

/// Both fields for one substance/route pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedTimes {
    pub onset_minutes: f64,
    pub duration_minutes: f64,
}

impl ResolvedTimes {
    pub fn resolve(profile: Option<&SubstanceProfile>, route: &str, cfg: &ResolverCfg) -> Self {
        Self {
            onset_minutes: resolve_or_default(profile, TimeField::Onset, route, cfg),
            duration_minutes: resolve_or_default(profile, TimeField::Duration, route, cfg),
        }
    }
}
