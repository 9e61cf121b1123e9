//! History export: CSV for spreadsheets, JSON for backups.

use anyhow::{Context, Result};

use crate::models::{Entry, MEASUREMENT_FIELDS};

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Render history as CSV, one row per entry, oldest first. Empty cells
/// for unrecorded values.
pub fn history_to_csv(history: &[Entry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "date".to_string(),
        "weight_lb".to_string(),
        "body_fat_percent".to_string(),
        "body_fat_mode".to_string(),
        "sex".to_string(),
    ];
    for field in MEASUREMENT_FIELDS {
        header.push(format!("{}_cm", field.as_str()));
    }
    header.push("notes".to_string());
    wtr.write_record(&header)?;

    for entry in history {
        let mut record = vec![
            entry.date.format("%Y-%m-%d").to_string(),
            fmt_opt(entry.weight_lb),
            fmt_opt(entry.body_fat_percent),
            entry.body_fat_mode.as_str().to_string(),
            entry.sex.as_str().to_string(),
        ];
        for field in MEASUREMENT_FIELDS {
            record.push(fmt_opt(entry.measurements.get(*field)));
        }
        record.push(entry.notes.clone().unwrap_or_default());
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().context("Failed to finalize CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Render history as pretty-printed JSON, oldest first.
pub fn history_to_json(history: &[Entry]) -> Result<String> {
    serde_json::to_string_pretty(history).context("Failed to serialize history")
}
