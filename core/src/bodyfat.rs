//! Body-fat estimation from circumference measurements (US Navy method)
//! and the auto/manual mode state machine that governs the derived value.
//!
//! The estimator is a pure function: given the same inputs it always
//! produces the same output, and "insufficient data" is `None`, never an
//! error — a normal state while a user is mid-entry.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::units::round1;

/// Biological sex, selecting the formula variant. A per-entry setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            _ => anyhow::bail!("Invalid sex '{s}'. Must be 'male' or 'female'"),
        }
    }
}

/// Who owns the body-fat value: the estimator (`Auto`) or the user (`Manual`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFatMode {
    Auto,
    Manual,
}

impl BodyFatMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BodyFatMode::Auto => "auto",
            BodyFatMode::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(BodyFatMode::Auto),
            "manual" => Ok(BodyFatMode::Manual),
            _ => anyhow::bail!("Invalid body-fat mode '{s}'. Must be 'auto' or 'manual'"),
        }
    }
}

/// Estimator inputs, all in inches (the formula's native unit).
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatorInputs {
    pub neck_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub height_in: Option<f64>,
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

/// Estimate body-fat percentage with the US Navy circumference formulas.
///
/// Preconditions: neck, waist, and height present, finite, and positive;
/// male additionally requires `waist > neck`, female requires hips present
/// and `waist + hips > neck`. A result is accepted only if finite and
/// strictly within (0, 75); anything else is `None` (insufficient data).
#[must_use]
pub fn estimate(sex: Sex, inputs: &EstimatorInputs) -> Option<f64> {
    let neck = positive(inputs.neck_in)?;
    let waist = positive(inputs.waist_in)?;
    let height = positive(inputs.height_in)?;

    let bf = match sex {
        Sex::Male => {
            if waist <= neck {
                return None;
            }
            86.01 * (waist - neck).log10() - 70.041 * height.log10() + 36.76
        }
        Sex::Female => {
            let hips = positive(inputs.hips_in)?;
            if waist + hips <= neck {
                return None;
            }
            163.205 * (waist + hips - neck).log10() - 97.684 * height.log10() - 78.387
        }
    };

    if bf.is_finite() && bf > 0.0 && bf < 75.0 {
        Some(bf)
    } else {
        None
    }
}

/// Apply a fresh estimate to the current `(mode, value)` pair.
///
/// - `Manual` with an empty value adopts a successful estimate and
///   promotes to `Auto` — a one-time promotion that never overrides a
///   value the user already typed.
/// - `Auto` tracks the estimator: every call overwrites the value with
///   the current output (1 decimal), and `None` clears it.
#[must_use]
pub fn apply_estimate(
    mode: BodyFatMode,
    current: Option<f64>,
    estimate: Option<f64>,
) -> (BodyFatMode, Option<f64>) {
    match (mode, current, estimate) {
        (BodyFatMode::Manual, None, Some(bf)) => (BodyFatMode::Auto, Some(round1(bf))),
        (BodyFatMode::Manual, current, _) => (BodyFatMode::Manual, current),
        (BodyFatMode::Auto, _, est) => (BodyFatMode::Auto, est.map(round1)),
    }
}
