use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::export;
use crate::models::{Entry, PhotoSlot, validate_entry};
use crate::trend::{Metric, RangeKey, TrendSeries, compute_trend};

/// Platform-native photo storage collaborator.
///
/// The core treats photo references as opaque strings; turning one into a
/// displayable URL (time-limited signing, local file resolution) is the
/// storage layer's job. CLI implements this against the local filesystem,
/// mobile callers against their object store.
pub trait PhotoStorage: Send + Sync {
    /// Resolve `reference` into a URL valid for at least `ttl_secs`
    /// seconds, or fail if the photo cannot be resolved.
    fn signed_url(&self, reference: &str, ttl_secs: u64) -> Result<String>;
}

pub struct CaliperService {
    db: Database,
}

impl CaliperService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Entries ---

    /// Load the entry for a date, or a fresh default when none exists.
    /// "Not found" is a normal state (the user opened a new date), not an
    /// error.
    pub fn load_or_default(&self, user_id: &str, date: NaiveDate) -> Result<Entry> {
        Ok(self
            .db
            .get_entry(user_id, date)?
            .unwrap_or_else(|| Entry::new(user_id, date)))
    }

    pub fn get_entry(&self, user_id: &str, date: NaiveDate) -> Result<Option<Entry>> {
        self.db.get_entry(user_id, date)
    }

    /// Validate, resolve the derived body-fat value, and upsert keyed by
    /// `(user_id, date)` — last write wins.
    pub fn save_entry(&self, entry: &Entry) -> Result<Entry> {
        let mut normalized = entry.clone();
        normalized.recompute_body_fat();
        validate_entry(&normalized)?;
        self.db.upsert_entry(&normalized)
    }

    pub fn delete_entry(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        self.db.delete_entry(user_id, date)
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<Entry>> {
        self.db.get_history(user_id)
    }

    // --- Trends ---

    pub fn trend(
        &self,
        user_id: &str,
        metric: Metric,
        range: RangeKey,
        today: NaiveDate,
    ) -> Result<TrendSeries> {
        let history = self.db.get_history(user_id)?;
        Ok(compute_trend(&history, metric, range, today))
    }

    // --- Photos ---

    /// Resolve an entry's photo slot to a display URL through the storage
    /// collaborator. An empty slot is `Ok(None)`, not an error.
    pub fn photo_url(
        &self,
        storage: &dyn PhotoStorage,
        entry: &Entry,
        slot: PhotoSlot,
        ttl_secs: u64,
    ) -> Result<Option<String>> {
        match entry.photos.get(slot) {
            Some(reference) => storage.signed_url(reference, ttl_secs).map(Some),
            None => Ok(None),
        }
    }

    // --- Export ---

    pub fn export_csv(&self, user_id: &str) -> Result<String> {
        let history = self.db.get_history(user_id)?;
        export::history_to_csv(&history)
    }

    pub fn export_json(&self, user_id: &str) -> Result<String> {
        let history = self.db.get_history(user_id)?;
        export::history_to_json(&history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodyfat::BodyFatMode;
    use crate::models::MeasurementField;

    struct MockStorage;

    impl PhotoStorage for MockStorage {
        fn signed_url(&self, reference: &str, ttl_secs: u64) -> Result<String> {
            Ok(format!("https://storage.test/{reference}?ttl={ttl_secs}"))
        }
    }

    struct FailingStorage;

    impl PhotoStorage for FailingStorage {
        fn signed_url(&self, _reference: &str, _ttl_secs: u64) -> Result<String> {
            anyhow::bail!("storage unavailable")
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_load_or_default_fresh() {
        let svc = CaliperService::new_in_memory().unwrap();
        let e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        assert_eq!(e.id, 0);
        assert_eq!(e.date, date("2025-12-01"));
        assert!(e.weight_lb.is_none());
        assert_eq!(e.body_fat_mode, BodyFatMode::Manual);
    }

    #[test]
    fn test_save_then_load() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        e.set_weight_lb(Some(230.0));
        svc.save_entry(&e).unwrap();

        let loaded = svc.load_or_default("default", date("2025-12-01")).unwrap();
        assert!(loaded.id > 0);
        assert!((loaded.weight_lb.unwrap() - 230.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_twice_leaves_one_entry() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        e.set_weight_lb(Some(230.0));
        svc.save_entry(&e).unwrap();
        e.set_weight_lb(Some(229.0));
        svc.save_entry(&e).unwrap();

        let history = svc.history("default").unwrap();
        assert_eq!(history.len(), 1);
        assert!((history[0].weight_lb.unwrap() - 229.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_save_resolves_derived_body_fat() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        e.set_measurement_in(MeasurementField::Neck, Some(15.0));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e.set_measurement_in(MeasurementField::Height, Some(70.0));

        let saved = svc.save_entry(&e).unwrap();
        assert_eq!(saved.body_fat_mode, BodyFatMode::Auto);
        assert!((saved.body_fat_percent.unwrap() - 17.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trend_over_saved_history() {
        let svc = CaliperService::new_in_memory().unwrap();
        for (d, w) in [
            ("2025-11-01", 230.0),
            ("2025-11-08", 227.0),
            ("2025-11-15", 224.0),
            ("2025-11-22", 222.0),
            ("2025-11-29", 220.0),
            ("2025-12-05", 218.0),
        ] {
            let mut e = svc.load_or_default("default", date(d)).unwrap();
            e.set_weight_lb(Some(w));
            svc.save_entry(&e).unwrap();
        }

        let series = svc
            .trend("default", Metric::Weight, RangeKey::All, date("2025-12-05"))
            .unwrap();
        assert_eq!(series.points.len(), 6);
        assert!((series.latest.unwrap().value - 218.0).abs() < f64::EPSILON);
        assert!((series.previous.unwrap().value - 220.0).abs() < f64::EPSILON);
        assert!((series.delta.unwrap() - -2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_photo_url_resolution() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        e.photos.set(
            PhotoSlot::Front,
            Some("default/2025-12-01/front.jpg".to_string()),
        );

        let url = svc
            .photo_url(&MockStorage, &e, PhotoSlot::Front, 3600)
            .unwrap()
            .unwrap();
        assert_eq!(
            url,
            "https://storage.test/default/2025-12-01/front.jpg?ttl=3600"
        );

        // Empty slot is not an error.
        assert!(svc
            .photo_url(&MockStorage, &e, PhotoSlot::Back, 3600)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_photo_url_storage_failure_propagates() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        e.photos.set(PhotoSlot::Front, Some("missing.jpg".to_string()));

        assert!(svc
            .photo_url(&FailingStorage, &e, PhotoSlot::Front, 3600)
            .is_err());
    }

    #[test]
    fn test_save_invalid_entry_rejected() {
        let svc = CaliperService::new_in_memory().unwrap();
        let mut e = svc.load_or_default("default", date("2025-12-01")).unwrap();
        // Bypass the setter to simulate a corrupt caller.
        e.weight_lb = Some(-10.0);
        assert!(svc.save_entry(&e).is_err());
    }
}
