//! Length and weight unit conversions.
//!
//! Lengths are stored in centimeters and displayed in inches; weight is
//! stored in pounds. Stored precision is 2 decimals for cm and 1 decimal
//! for inches, so a cm→inches→cm round trip may drift by up to the
//! rounding step. That is an accepted property, not a bug.

pub const LBS_PER_KG: f64 = 2.20462;
pub const KG_PER_LB: f64 = 0.453_592;

/// Convert inches to centimeters, rounded to 2 decimals.
/// Returns `None` for non-finite input (covers empty/invalid UI fields).
#[must_use]
pub fn inches_to_cm(inches: f64) -> Option<f64> {
    if !inches.is_finite() {
        return None;
    }
    Some((inches * 2.54 * 100.0).round() / 100.0)
}

/// Convert centimeters to inches, rounded to 1 decimal.
/// Returns `None` for non-finite input; an absent cm value maps to an
/// absent inch value, never to zero.
#[must_use]
pub fn cm_to_inches(cm: f64) -> Option<f64> {
    if !cm.is_finite() {
        return None;
    }
    Some((cm / 2.54 * 10.0).round() / 10.0)
}

/// Round to 1 decimal place (display precision for deltas and body fat).
#[must_use]
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
