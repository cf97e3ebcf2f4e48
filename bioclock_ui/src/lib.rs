#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Plain-text rendering for timeline rows and tolerance results.

use bioclock_core::util::format_minutes;
use bioclock_core::{DoseEvent, ToleranceEstimate, TimelineEntry};
use chrono::{DateTime, TimeZone};

/// `[#####-----]` for `percent` in [0, 100]; out-of-range input is clamped.
pub fn render_progress_bar(percent: f64, width: usize) -> String {
    let pct = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One active-tab row, with the dose time shown in `tz`.
///
/// `LSD  8:00 PM  100ug  [####------] 40%  Peak / Plateau  (2h 00m in)`
pub fn render_entry<Tz: TimeZone>(entry: &TimelineEntry, tz: &Tz, bar_width: usize) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let d = &entry.dose;
    let p = &entry.phase;
    format!(
        "{}  {}  {}{}  {} {:>3.0}%  {}  ({} in)",
        d.substance,
        local(d.dose_time, tz).format("%-I:%M %p"),
        d.quantity,
        d.unit,
        render_progress_bar(p.percent_complete, bar_width),
        p.percent_complete,
        p.stage,
        format_minutes(p.elapsed_minutes),
    )
}

/// One history-tab row with the full date.
pub fn render_history_line<Tz: TimeZone>(dose: &DoseEvent, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "#{}  {}  {}  {}{}  {}",
        dose.id,
        dose.substance,
        dose.route,
        dose.quantity,
        dose.unit,
        local(dose.dose_time, tz).format("%B %-d, %Y %-I:%M %p"),
    )
}

/// "You need to take N ... to feel the same effects as M"; N is rounded.
pub fn render_tolerance(e: &ToleranceEstimate) -> String {
    let mut out = format!(
        "You need to take {} to feel the same effects as {}",
        e.equivalent_dose.round(),
        trim_float(e.desired_dose),
    );
    if let Some(last) = e.last_dose {
        out.push_str(&format!(" (last dose {}", trim_float(last)));
        out.push_str(&format!(", {} days ago)", trim_float(e.days_since)));
    }
    out
}

fn local<Tz: TimeZone>(t: DateTime<chrono::Utc>, tz: &Tz) -> DateTime<Tz> {
    t.with_timezone(tz)
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioclock_core::phase::{PhaseResult, Stage};
    use bioclock_core::NewDose;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 10, "[----------]")]
    #[case(40.0, 10, "[####------]")]
    #[case(100.0, 10, "[##########]")]
    #[case(250.0, 4, "[####]")]
    #[case(-5.0, 4, "[----]")]
    #[case(f64::NAN, 4, "[----]")]
    fn progress_bar(#[case] pct: f64, #[case] width: usize, #[case] want: &str) {
        assert_eq!(render_progress_bar(pct, width), want);
    }

    fn entry() -> TimelineEntry {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap();
        TimelineEntry {
            dose: NewDose::new("LSD", t0)
                .quantity("100", "ug")
                .validate()
                .unwrap()
                .into_event(3),
            phase: PhaseResult {
                stage: Stage::Peak,
                elapsed_minutes: 120.0,
                onset_minutes: 45.0,
                duration_minutes: 600.0,
                percent_complete: 40.0,
            },
        }
    }

    #[test]
    fn entry_line_has_time_stage_and_bar() {
        let line = render_entry(&entry(), &Utc, 10);
        assert_eq!(
            line,
            "LSD  8:00 PM  100ug  [####------]  40%  Peak / Plateau  (2h 00m in)"
        );
    }

    #[test]
    fn history_line_has_full_date() {
        let line = render_history_line(&entry().dose, &Utc);
        assert_eq!(line, "#3  LSD  Oral  100ug  May 1, 2024 8:00 PM");
    }

    #[test]
    fn tolerance_rounds_result() {
        let e = ToleranceEstimate {
            last_dose: Some(100.0),
            desired_dose: 100.0,
            days_since: 1.0,
            tolerance_percent: 280.059565,
            equivalent_dose: 280.059565,
        };
        assert_eq!(
            render_tolerance(&e),
            "You need to take 280 to feel the same effects as 100 (last dose 100, 1 days ago)"
        );
    }
}
