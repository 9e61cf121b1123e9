use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::bodyfat::{BodyFatMode, Sex};
use crate::models::{Entry, Measurements, PhotoSet};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    notes TEXT,
                    weight_lb REAL,
                    body_fat_percent REAL,
                    body_fat_mode TEXT NOT NULL DEFAULT 'manual',
                    sex TEXT NOT NULL DEFAULT 'male',
                    neck_cm REAL,
                    waist_cm REAL,
                    hips_cm REAL,
                    height_cm REAL,
                    chest_cm REAL,
                    shoulders_cm REAL,
                    biceps_cm REAL,
                    forearms_cm REAL,
                    wrist_cm REAL,
                    upper_thigh_cm REAL,
                    lower_thigh_cm REAL,
                    calves_cm REAL,
                    photo_json TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    UNIQUE(user_id, date)
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_uuid ON entries(uuid);
                CREATE INDEX IF NOT EXISTS idx_entries_user_date ON entries(user_id, date);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping ---

    // Expects columns:
    // 0: id, 1: uuid, 2: user_id, 3: date, 4: notes, 5: weight_lb,
    // 6: body_fat_percent, 7: body_fat_mode, 8: sex,
    // 9..=20: the twelve *_cm measurement columns in declaration order,
    // 21: photo_json, 22: created_at, 23: updated_at
    fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<Entry> {
        let date_str: String = row.get(3)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"));
        let mode_str: String = row.get(7)?;
        let body_fat_mode = BodyFatMode::parse(&mode_str).unwrap_or(BodyFatMode::Manual);
        let sex_str: String = row.get(8)?;
        let sex = Sex::parse(&sex_str).unwrap_or(Sex::Male);
        let photo_json: Option<String> = row.get(21)?;

        Ok(Entry {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            date,
            notes: row.get(4)?,
            weight_lb: row.get(5)?,
            body_fat_percent: row.get(6)?,
            body_fat_mode,
            sex,
            measurements: Measurements {
                neck_cm: row.get(9)?,
                waist_cm: row.get(10)?,
                hips_cm: row.get(11)?,
                height_cm: row.get(12)?,
                chest_cm: row.get(13)?,
                shoulders_cm: row.get(14)?,
                biceps_cm: row.get(15)?,
                forearms_cm: row.get(16)?,
                wrist_cm: row.get(17)?,
                upper_thigh_cm: row.get(18)?,
                lower_thigh_cm: row.get(19)?,
                calves_cm: row.get(20)?,
            },
            photos: PhotoSet::parse(photo_json.as_deref()),
            created_at: row.get(22)?,
            updated_at: row.get(23)?,
        })
    }

    const ENTRY_COLUMNS: &'static str = "id, uuid, user_id, date, notes, weight_lb,
        body_fat_percent, body_fat_mode, sex,
        neck_cm, waist_cm, hips_cm, height_cm, chest_cm, shoulders_cm,
        biceps_cm, forearms_cm, wrist_cm, upper_thigh_cm, lower_thigh_cm,
        calves_cm, photo_json, created_at, updated_at";

    // --- Entries ---

    /// Insert or replace the entry for `(user_id, date)`. Last write wins;
    /// the second save's values replace the first's.
    pub fn upsert_entry(&self, entry: &Entry) -> Result<Entry> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        let m = &entry.measurements;
        self.conn.execute(
            "INSERT INTO entries (uuid, user_id, date, notes, weight_lb,
                body_fat_percent, body_fat_mode, sex,
                neck_cm, waist_cm, hips_cm, height_cm, chest_cm, shoulders_cm,
                biceps_cm, forearms_cm, wrist_cm, upper_thigh_cm, lower_thigh_cm,
                calves_cm, photo_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)
             ON CONFLICT(user_id, date) DO UPDATE SET
                notes = excluded.notes,
                weight_lb = excluded.weight_lb,
                body_fat_percent = excluded.body_fat_percent,
                body_fat_mode = excluded.body_fat_mode,
                sex = excluded.sex,
                neck_cm = excluded.neck_cm,
                waist_cm = excluded.waist_cm,
                hips_cm = excluded.hips_cm,
                height_cm = excluded.height_cm,
                chest_cm = excluded.chest_cm,
                shoulders_cm = excluded.shoulders_cm,
                biceps_cm = excluded.biceps_cm,
                forearms_cm = excluded.forearms_cm,
                wrist_cm = excluded.wrist_cm,
                upper_thigh_cm = excluded.upper_thigh_cm,
                lower_thigh_cm = excluded.lower_thigh_cm,
                calves_cm = excluded.calves_cm,
                photo_json = excluded.photo_json,
                updated_at = excluded.updated_at",
            params![
                uuid,
                entry.user_id,
                date_str,
                entry.notes,
                entry.weight_lb,
                entry.body_fat_percent,
                entry.body_fat_mode.as_str(),
                entry.sex.as_str(),
                m.neck_cm,
                m.waist_cm,
                m.hips_cm,
                m.height_cm,
                m.chest_cm,
                m.shoulders_cm,
                m.biceps_cm,
                m.forearms_cm,
                m.wrist_cm,
                m.upper_thigh_cm,
                m.lower_thigh_cm,
                m.calves_cm,
                entry.photos.to_json(),
                now,
                now,
            ],
        )?;
        self.get_entry(&entry.user_id, entry.date)?
            .context("Entry not found after upsert")
    }

    pub fn get_entry(&self, user_id: &str, date: NaiveDate) -> Result<Option<Entry>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let sql = format!(
            "SELECT {} FROM entries WHERE user_id = ?1 AND date = ?2",
            Self::ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id, date_str])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::entry_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    /// Full history for a user, ascending by date.
    pub fn get_history(&self, user_id: &str) -> Result<Vec<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE user_id = ?1 ORDER BY date ASC",
            Self::ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![user_id], Self::entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Returns true if an entry existed and was deleted.
    pub fn delete_entry(&self, user_id: &str, date: NaiveDate) -> Result<bool> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "DELETE FROM entries WHERE user_id = ?1 AND date = ?2",
            params![user_id, date_str],
        )?;
        Ok(rows > 0)
    }

    pub fn count_entries(&self, user_id: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasurementField, PhotoSlot};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_entry(d: &str) -> Entry {
        let mut e = Entry::new("default", date(d));
        e.set_weight_lb(Some(230.0));
        e.set_notes(Some("first log".to_string()));
        e.set_measurement_in(MeasurementField::Waist, Some(34.0));
        e
    }

    #[test]
    fn test_upsert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let saved = db.upsert_entry(&sample_entry("2025-12-01")).unwrap();
        assert!(saved.id > 0);
        assert!(!saved.uuid.is_empty());
        assert_eq!(saved.date, date("2025-12-01"));
        assert!((saved.weight_lb.unwrap() - 230.0).abs() < f64::EPSILON);
        assert!((saved.measurements.waist_cm.unwrap() - 86.36).abs() < f64::EPSILON);

        let loaded = db.get_entry("default", date("2025-12-01")).unwrap().unwrap();
        assert_eq!(loaded.notes.as_deref(), Some("first log"));
        assert_eq!(loaded.sex, Sex::Male);
        assert_eq!(loaded.body_fat_mode, BodyFatMode::Manual);
    }

    #[test]
    fn test_upsert_second_save_wins() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry("2025-12-01")).unwrap();

        let mut second = sample_entry("2025-12-01");
        second.set_weight_lb(Some(228.5));
        second.set_notes(Some("corrected".to_string()));
        db.upsert_entry(&second).unwrap();

        assert_eq!(db.count_entries("default").unwrap(), 1);
        let loaded = db.get_entry("default", date("2025-12-01")).unwrap().unwrap();
        assert!((loaded.weight_lb.unwrap() - 228.5).abs() < f64::EPSILON);
        assert_eq!(loaded.notes.as_deref(), Some("corrected"));
    }

    #[test]
    fn test_entries_keyed_per_user() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry("2025-12-01")).unwrap();

        let mut other = Entry::new("other", date("2025-12-01"));
        other.set_weight_lb(Some(150.0));
        db.upsert_entry(&other).unwrap();

        assert_eq!(db.count_entries("default").unwrap(), 1);
        assert_eq!(db.count_entries("other").unwrap(), 1);
        let loaded = db.get_entry("other", date("2025-12-01")).unwrap().unwrap();
        assert!((loaded.weight_lb.unwrap() - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_get_entry_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_entry("default", date("2025-12-01")).unwrap().is_none());
    }

    #[test]
    fn test_history_ascending() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry("2025-12-05")).unwrap();
        db.upsert_entry(&sample_entry("2025-11-01")).unwrap();
        db.upsert_entry(&sample_entry("2025-11-15")).unwrap();

        let history = db.get_history("default").unwrap();
        let dates: Vec<NaiveDate> = history.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-11-01"), date("2025-11-15"), date("2025-12-05")]
        );
    }

    #[test]
    fn test_photo_json_persistence() {
        let db = Database::open_in_memory().unwrap();
        let mut e = sample_entry("2025-12-01");
        e.photos
            .set(PhotoSlot::Front, Some("default/2025-12-01/front.jpg".to_string()));
        let saved = db.upsert_entry(&e).unwrap();
        assert_eq!(
            saved.photos.get(PhotoSlot::Front),
            Some("default/2025-12-01/front.jpg")
        );
        assert!(saved.photos.get(PhotoSlot::Back).is_none());
    }

    #[test]
    fn test_malformed_photo_json_degrades_to_empty() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry("2025-12-01")).unwrap();
        db.conn
            .execute("UPDATE entries SET photo_json = 'garbage'", [])
            .unwrap();
        let loaded = db.get_entry("default", date("2025-12-01")).unwrap().unwrap();
        assert!(loaded.photos.is_empty());
    }

    #[test]
    fn test_delete_entry() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_entry(&sample_entry("2025-12-01")).unwrap();
        assert!(db.delete_entry("default", date("2025-12-01")).unwrap());
        assert!(!db.delete_entry("default", date("2025-12-01")).unwrap());
        assert!(db.get_entry("default", date("2025-12-01")).unwrap().is_none());
    }

    #[test]
    fn test_mode_and_sex_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let mut e = Entry::new("default", date("2025-12-01"));
        e.set_sex(Sex::Female);
        e.set_measurement_in(MeasurementField::Neck, Some(13.0));
        e.set_measurement_in(MeasurementField::Waist, Some(28.0));
        e.set_measurement_in(MeasurementField::Hips, Some(38.0));
        e.set_measurement_in(MeasurementField::Height, Some(65.0));
        assert_eq!(e.body_fat_mode, BodyFatMode::Auto);

        let loaded = db.upsert_entry(&e).unwrap();
        assert_eq!(loaded.sex, Sex::Female);
        assert_eq!(loaded.body_fat_mode, BodyFatMode::Auto);
        assert!(loaded.body_fat_percent.is_some());
    }
}
