//! Tolerance estimator: equivalent-effect dose after a prior dose.
//!
//! percent = coefficient * days ^ exponent, applied below `reset_days`.
//! Zero, negative or non-finite day counts are rejected instead of producing
//! the unbounded multiplier the curve has at 0.

use crate::config::ToleranceCfg;
use crate::error::ToleranceError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceInput {
    /// Shown alongside the result; does not enter the formula.
    #[serde(default)]
    pub last_dose: Option<f64>,
    pub desired_dose: f64,
    pub days_since: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceEstimate {
    pub last_dose: Option<f64>,
    pub desired_dose: f64,
    pub days_since: f64,
    /// 100 means no tolerance.
    pub tolerance_percent: f64,
    pub equivalent_dose: f64,
}

/// Tolerance percent for `days` (> 0) under `cfg`; 100 at or past the reset point.
pub fn tolerance_percent(days: f64, cfg: &ToleranceCfg) -> Result<f64, ToleranceError> {
    if !days.is_finite() || days <= 0.0 {
        return Err(ToleranceError::InvalidInput(format!(
            "days since last dose must be > 0, got {days}"
        )));
    }
    if days >= cfg.reset_days {
        return Ok(100.0);
    }
    Ok(cfg.coefficient * days.powf(cfg.exponent))
}

pub fn estimate(input: ToleranceInput, cfg: &ToleranceCfg) -> Result<ToleranceEstimate, ToleranceError> {
    if !input.desired_dose.is_finite() || input.desired_dose < 0.0 {
        return Err(ToleranceError::InvalidInput(format!(
            "desired dose must be a non-negative number, got {}",
            input.desired_dose
        )));
    }
    let pct = tolerance_percent(input.days_since, cfg)?;
    let equivalent_dose = if input.days_since >= cfg.reset_days {
        input.desired_dose
    } else {
        input.desired_dose * pct / 100.0
    };
    tracing::debug!(
        desired = input.desired_dose,
        days = input.days_since,
        pct,
        equivalent_dose,
        "tolerance estimate"
    );
    Ok(ToleranceEstimate {
        last_dose: input.last_dose,
        desired_dose: input.desired_dose,
        days_since: input.days_since,
        tolerance_percent: pct,
        equivalent_dose,
    })
}

/// Equivalent dose under the default curve.
pub fn estimate_equivalent_dose(desired_dose: f64, days_since_last: f64) -> Result<f64, ToleranceError> {
    estimate(
        ToleranceInput {
            last_dose: None,
            desired_dose,
            days_since: days_since_last,
        },
        &ToleranceCfg::default(),
    )
    .map(|e| e.equivalent_dose)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_reset_at_fourteen_days() {
        assert_eq!(estimate_equivalent_dose(100.0, 14.0).unwrap(), 100.0);
        assert_eq!(estimate_equivalent_dose(100.0, 30.0).unwrap(), 100.0);
    }

    #[test]
    fn one_day_is_the_coefficient() {
        let v = estimate_equivalent_dose(100.0, 1.0).unwrap();
        assert!((v - 280.059565).abs() < 1e-9);
    }

    #[test]
    fn decays_between_one_and_fourteen_days() {
        let mut prev = f64::INFINITY;
        for d in 1..14 {
            let v = estimate_equivalent_dose(100.0, d as f64).unwrap();
            assert!(v < prev, "day {d}: {v} !< {prev}");
            prev = v;
        }
    }

    #[test]
    fn rejects_zero_negative_and_nan_days() {
        for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                estimate_equivalent_dose(100.0, d),
                Err(ToleranceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn rejects_negative_desired_dose() {
        assert!(estimate_equivalent_dose(-5.0, 3.0).is_err());
    }

    #[test]
    fn last_dose_is_carried_through() {
        let e = estimate(
            ToleranceInput {
                last_dose: Some(150.0),
                desired_dose: 100.0,
                days_since: 14.0,
            },
            &ToleranceCfg::default(),
        )
        .unwrap();
        assert_eq!(e.last_dose, Some(150.0));
        assert_eq!(e.tolerance_percent, 100.0);
    }
}
