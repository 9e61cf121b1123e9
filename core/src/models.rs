use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bodyfat::{self, BodyFatMode, EstimatorInputs, Sex};
use crate::units::{cm_to_inches, inches_to_cm};

/// The named circumference/length fields an entry can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementField {
    Neck,
    Waist,
    Hips,
    Height,
    Chest,
    Shoulders,
    Biceps,
    Forearms,
    Wrist,
    UpperThigh,
    LowerThigh,
    Calves,
}

pub const MEASUREMENT_FIELDS: &[MeasurementField] = &[
    MeasurementField::Neck,
    MeasurementField::Waist,
    MeasurementField::Hips,
    MeasurementField::Height,
    MeasurementField::Chest,
    MeasurementField::Shoulders,
    MeasurementField::Biceps,
    MeasurementField::Forearms,
    MeasurementField::Wrist,
    MeasurementField::UpperThigh,
    MeasurementField::LowerThigh,
    MeasurementField::Calves,
];

impl MeasurementField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementField::Neck => "neck",
            MeasurementField::Waist => "waist",
            MeasurementField::Hips => "hips",
            MeasurementField::Height => "height",
            MeasurementField::Chest => "chest",
            MeasurementField::Shoulders => "shoulders",
            MeasurementField::Biceps => "biceps",
            MeasurementField::Forearms => "forearms",
            MeasurementField::Wrist => "wrist",
            MeasurementField::UpperThigh => "upper_thigh",
            MeasurementField::LowerThigh => "lower_thigh",
            MeasurementField::Calves => "calves",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace('-', "_");
        for field in MEASUREMENT_FIELDS {
            if field.as_str() == normalized {
                return Ok(*field);
            }
        }
        bail!(
            "Unknown measurement field '{s}'. Must be one of: {}",
            MEASUREMENT_FIELDS
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }

    /// Fields that feed the body-fat estimator.
    #[must_use]
    pub fn affects_body_fat(self) -> bool {
        matches!(
            self,
            MeasurementField::Neck
                | MeasurementField::Waist
                | MeasurementField::Hips
                | MeasurementField::Height
        )
    }
}

/// Circumference/length measurements, stored in centimeters (canonical
/// unit; the UI unit is inches).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neck_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hips_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chest_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulders_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biceps_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forearms_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrist_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_thigh_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_thigh_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calves_cm: Option<f64>,
}

impl Measurements {
    #[must_use]
    pub fn get(&self, field: MeasurementField) -> Option<f64> {
        match field {
            MeasurementField::Neck => self.neck_cm,
            MeasurementField::Waist => self.waist_cm,
            MeasurementField::Hips => self.hips_cm,
            MeasurementField::Height => self.height_cm,
            MeasurementField::Chest => self.chest_cm,
            MeasurementField::Shoulders => self.shoulders_cm,
            MeasurementField::Biceps => self.biceps_cm,
            MeasurementField::Forearms => self.forearms_cm,
            MeasurementField::Wrist => self.wrist_cm,
            MeasurementField::UpperThigh => self.upper_thigh_cm,
            MeasurementField::LowerThigh => self.lower_thigh_cm,
            MeasurementField::Calves => self.calves_cm,
        }
    }

    pub fn set(&mut self, field: MeasurementField, cm: Option<f64>) {
        let slot = match field {
            MeasurementField::Neck => &mut self.neck_cm,
            MeasurementField::Waist => &mut self.waist_cm,
            MeasurementField::Hips => &mut self.hips_cm,
            MeasurementField::Height => &mut self.height_cm,
            MeasurementField::Chest => &mut self.chest_cm,
            MeasurementField::Shoulders => &mut self.shoulders_cm,
            MeasurementField::Biceps => &mut self.biceps_cm,
            MeasurementField::Forearms => &mut self.forearms_cm,
            MeasurementField::Wrist => &mut self.wrist_cm,
            MeasurementField::UpperThigh => &mut self.upper_thigh_cm,
            MeasurementField::LowerThigh => &mut self.lower_thigh_cm,
            MeasurementField::Calves => &mut self.calves_cm,
        };
        *slot = cm.filter(|v| v.is_finite() && *v >= 0.0);
    }

    /// Display value in inches (1 decimal), the UI unit.
    #[must_use]
    pub fn get_inches(&self, field: MeasurementField) -> Option<f64> {
        self.get(field).and_then(cm_to_inches)
    }
}

/// Progress-photo slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSlot {
    Front,
    Side,
    Back,
}

pub const PHOTO_SLOTS: &[PhotoSlot] = &[PhotoSlot::Front, PhotoSlot::Side, PhotoSlot::Back];

impl PhotoSlot {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSlot::Front => "front",
            PhotoSlot::Side => "side",
            PhotoSlot::Back => "back",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "front" => Ok(PhotoSlot::Front),
            "side" => Ok(PhotoSlot::Side),
            "back" => Ok(PhotoSlot::Back),
            _ => bail!("Invalid photo slot '{s}'. Must be 'front', 'side', or 'back'"),
        }
    }
}

/// Per-slot opaque photo storage references. Persisted as a single JSON
/// text blob; references are never display URLs (resolution belongs to
/// the storage collaborator).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
}

impl PhotoSet {
    /// Decode the persisted JSON blob. Absent, malformed, or non-object
    /// text degrades to an empty mapping, never an error.
    #[must_use]
    pub fn parse(text: Option<&str>) -> Self {
        match text {
            Some(t) => serde_json::from_str(t).unwrap_or_default(),
            None => PhotoSet::default(),
        }
    }

    /// Encode for persistence; an empty set stores NULL rather than `{}`.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            serde_json::to_string(self).ok()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.side.is_none() && self.back.is_none()
    }

    #[must_use]
    pub fn get(&self, slot: PhotoSlot) -> Option<&str> {
        match slot {
            PhotoSlot::Front => self.front.as_deref(),
            PhotoSlot::Side => self.side.as_deref(),
            PhotoSlot::Back => self.back.as_deref(),
        }
    }

    pub fn set(&mut self, slot: PhotoSlot, reference: Option<String>) {
        let slot = match slot {
            PhotoSlot::Front => &mut self.front,
            PhotoSlot::Side => &mut self.side,
            PhotoSlot::Back => &mut self.back,
        };
        *slot = reference;
    }
}

/// One user's recorded measurements/photos/notes for a single calendar
/// date. At most one entry exists per `(user, date)`; saving replaces any
/// prior record for that key.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_lb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percent: Option<f64>,
    pub body_fat_mode: BodyFatMode,
    pub sex: Sex,
    pub measurements: Measurements,
    #[serde(skip_serializing_if = "PhotoSet::is_empty")]
    pub photos: PhotoSet,
    pub created_at: String,
    pub updated_at: String,
}

impl Entry {
    /// A fresh default entry for a date the user has not logged yet.
    #[must_use]
    pub fn new(user_id: &str, date: NaiveDate) -> Self {
        Entry {
            id: 0,
            uuid: String::new(),
            user_id: user_id.to_string(),
            date,
            notes: None,
            weight_lb: None,
            body_fat_percent: None,
            body_fat_mode: BodyFatMode::Manual,
            sex: Sex::Male,
            measurements: Measurements::default(),
            photos: PhotoSet::default(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes.filter(|n| !n.trim().is_empty());
    }

    /// Set weight in pounds; non-finite or non-positive input clears it.
    pub fn set_weight_lb(&mut self, weight_lb: Option<f64>) {
        self.weight_lb = weight_lb.filter(|v| v.is_finite() && *v > 0.0);
    }

    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = sex;
        self.recompute_body_fat();
    }

    /// Set a measurement from UI inches; stored in cm. Invalid input
    /// (non-finite) clears the field rather than erroring.
    pub fn set_measurement_in(&mut self, field: MeasurementField, inches: Option<f64>) {
        let cm = inches.and_then(inches_to_cm);
        self.measurements.set(field, cm);
        if field.affects_body_fat() {
            self.recompute_body_fat();
        }
    }

    /// Direct user edit of the body-fat value: takes manual ownership.
    /// Values outside (0, 100) or non-finite are treated as empty, which
    /// lets the auto-promotion rule re-engage.
    pub fn set_body_fat_manual(&mut self, value: Option<f64>) {
        self.body_fat_mode = BodyFatMode::Manual;
        self.body_fat_percent = value.filter(|v| v.is_finite() && *v > 0.0 && *v < 100.0);
        self.recompute_body_fat();
    }

    /// Explicit mode selection. Switching to auto forces recomputation;
    /// switching to manual keeps the current value (and stays manual as
    /// long as that value is non-empty).
    pub fn set_body_fat_mode(&mut self, mode: BodyFatMode) {
        self.body_fat_mode = mode;
        self.recompute_body_fat();
    }

    /// Estimator inputs as the 1-decimal inch rendering of the stored cm
    /// values, matching what the user sees on screen.
    #[must_use]
    pub fn estimator_inputs(&self) -> EstimatorInputs {
        EstimatorInputs {
            neck_in: self.measurements.get_inches(MeasurementField::Neck),
            waist_in: self.measurements.get_inches(MeasurementField::Waist),
            hips_in: self.measurements.get_inches(MeasurementField::Hips),
            height_in: self.measurements.get_inches(MeasurementField::Height),
        }
    }

    /// Recompute the derived body-fat value. Called after every mutation
    /// of a field the estimator depends on.
    pub fn recompute_body_fat(&mut self) {
        let estimate = bodyfat::estimate(self.sex, &self.estimator_inputs());
        let (mode, value) = bodyfat::apply_estimate(self.body_fat_mode, self.body_fat_percent, estimate);
        self.body_fat_mode = mode;
        self.body_fat_percent = value;
    }
}

/// Validate an entry before persisting: weight positive, body fat within
/// (0, 100), measurements finite and non-negative.
pub fn validate_entry(entry: &Entry) -> Result<()> {
    if entry.user_id.trim().is_empty() {
        bail!("Entry user_id must not be empty");
    }
    if entry.weight_lb.is_some_and(|v| !v.is_finite() || v <= 0.0) {
        bail!("weight_lb must be a positive number");
    }
    if entry
        .body_fat_percent
        .is_some_and(|v| !v.is_finite() || v <= 0.0 || v >= 100.0)
    {
        bail!("body_fat_percent must be between 0 and 100 (exclusive)");
    }
    for field in MEASUREMENT_FIELDS {
        if let Some(v) = entry.measurements.get(*field) {
            if !v.is_finite() || v < 0.0 {
                bail!("Measurement '{}' must be finite and non-negative", field.as_str());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_for(date: &str) -> Entry {
        Entry::new("default", NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn test_measurement_field_parse() {
        assert_eq!(MeasurementField::parse("neck").unwrap(), MeasurementField::Neck);
        assert_eq!(
            MeasurementField::parse("upper-thigh").unwrap(),
            MeasurementField::UpperThigh
        );
        assert_eq!(
            MeasurementField::parse("Upper_Thigh").unwrap(),
            MeasurementField::UpperThigh
        );
        assert!(MeasurementField::parse("bicep").is_err());
    }

    #[test]
    fn test_set_measurement_converts_to_cm() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        assert!((e.measurements.waist_cm.unwrap() - 86.36).abs() < f64::EPSILON);
        assert!(
            (e.measurements.get_inches(MeasurementField::Waist).unwrap() - 34.0).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_set_measurement_invalid_clears() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Chest, Some(40.0));
        e.set_measurement_in(MeasurementField::Chest, Some(f64::NAN));
        assert!(e.measurements.chest_cm.is_none());
        e.set_measurement_in(MeasurementField::Chest, None);
        assert!(e.measurements.chest_cm.is_none());
    }

    #[test]
    fn test_negative_measurement_rejected() {
        let mut m = Measurements::default();
        m.set(MeasurementField::Neck, Some(-3.0));
        assert!(m.neck_cm.is_none());
    }

    #[test]
    fn test_auto_promotion_on_complete_measurements() {
        let mut e = entry_for("2025-12-01");
        assert_eq!(e.body_fat_mode, BodyFatMode::Manual);
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        assert!(e.body_fat_percent.is_none());
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);
        assert!((e.body_fat_percent.unwrap() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_promotion_never_overrides_typed_value() {
        let mut e = entry_for("2025-12-01");
        e.set_body_fat_manual(Some(20.0));
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        assert_eq!(e.body_fat_mode, BodyFatMode::Manual);
        assert!((e.body_fat_percent.unwrap() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_auto_tracks_measurement_edits() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        let first = e.body_fat_percent.unwrap();

        e.set_measurement_in(MeasurementField::Waist, Some(36.0));
        let second = e.body_fat_percent.unwrap();
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);
        assert!(second > first);
    }

    #[test]
    fn test_auto_clears_when_input_removed() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        assert!(e.body_fat_percent.is_some());

        e.set_measurement_in(MeasurementField::Waist, None);
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);
        assert!(e.body_fat_percent.is_none());
    }

    #[test]
    fn test_explicit_manual_keeps_computed_value() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        let computed = e.body_fat_percent.unwrap();

        e.set_body_fat_mode(BodyFatMode::Manual);
        assert_eq!(e.body_fat_mode, BodyFatMode::Manual);
        assert!((e.body_fat_percent.unwrap() - computed).abs() < f64::EPSILON);

        // Measurement edits no longer touch the value.
        e.set_measurement_in(MeasurementField::Waist, Some(38.0));
        assert!((e.body_fat_percent.unwrap() - computed).abs() < f64::EPSILON);
    }

    #[test]
    fn test_switching_back_to_auto_recomputes() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        e.set_body_fat_manual(Some(22.0));
        assert_eq!(e.body_fat_mode, BodyFatMode::Manual);

        e.set_body_fat_mode(BodyFatMode::Auto);
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);
        assert!((e.body_fat_percent.unwrap() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clearing_manual_value_re_engages_promotion() {
        let mut e = entry_for("2025-12-01");
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));
        e.set_body_fat_manual(Some(22.0));

        e.set_body_fat_manual(None);
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);
        assert!((e.body_fat_percent.unwrap() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_weight_rejects_non_positive() {
        let mut e = entry_for("2025-12-01");
        e.set_weight_lb(Some(230.0));
        assert!((e.weight_lb.unwrap() - 230.0).abs() < f64::EPSILON);
        e.set_weight_lb(Some(-10.0));
        assert!(e.weight_lb.is_none());
        e.set_weight_lb(Some(0.0));
        assert!(e.weight_lb.is_none());
    }

    #[test]
    fn test_set_notes_blank_is_none() {
        let mut e = entry_for("2025-12-01");
        e.set_notes(Some("  ".to_string()));
        assert!(e.notes.is_none());
        e.set_notes(Some("felt strong".to_string()));
        assert_eq!(e.notes.as_deref(), Some("felt strong"));
    }

    #[test]
    fn test_photo_set_parse_valid() {
        let set = PhotoSet::parse(Some(r#"{"front":"u1/2025-12-01/front.jpg"}"#));
        assert_eq!(set.get(PhotoSlot::Front), Some("u1/2025-12-01/front.jpg"));
        assert!(set.get(PhotoSlot::Side).is_none());
    }

    #[test]
    fn test_photo_set_parse_malformed_degrades_to_empty() {
        assert!(PhotoSet::parse(None).is_empty());
        assert!(PhotoSet::parse(Some("")).is_empty());
        assert!(PhotoSet::parse(Some("not json")).is_empty());
        assert!(PhotoSet::parse(Some("[1,2,3]")).is_empty());
        assert!(PhotoSet::parse(Some("42")).is_empty());
    }

    #[test]
    fn test_photo_set_json_roundtrip() {
        let mut set = PhotoSet::default();
        assert!(set.to_json().is_none());
        set.set(PhotoSlot::Side, Some("u1/2025-12-01/side.jpg".to_string()));
        let json = set.to_json().unwrap();
        assert_eq!(PhotoSet::parse(Some(&json)), set);
    }

    #[test]
    fn test_validate_entry_valid() {
        let mut e = entry_for("2025-12-01");
        e.set_weight_lb(Some(218.0));
        e.set_body_fat_manual(Some(22.5));
        assert!(validate_entry(&e).is_ok());
    }

    #[test]
    fn test_validate_entry_bad_weight() {
        let mut e = entry_for("2025-12-01");
        e.weight_lb = Some(-5.0);
        assert!(validate_entry(&e).is_err());
    }

    #[test]
    fn test_validate_entry_bad_body_fat() {
        let mut e = entry_for("2025-12-01");
        e.body_fat_percent = Some(100.0);
        assert!(validate_entry(&e).is_err());
    }

    #[test]
    fn test_validate_entry_bad_measurement() {
        let mut e = entry_for("2025-12-01");
        e.measurements.neck_cm = Some(f64::NAN);
        assert!(validate_entry(&e).is_err());
    }
}
