use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caliper_core::service::CaliperService;

use super::helpers::{fmt_opt1, json_error, parse_date, truncate, weight_to_lb};
use crate::config::DEFAULT_USER;
use caliper_core::models::MEASUREMENT_FIELDS;
use caliper_core::units::LBS_PER_KG;

pub(crate) fn cmd_log(
    svc: &CaliperService,
    weight: Option<f64>,
    unit: &str,
    date: Option<String>,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;

    if let Some(w) = weight {
        entry.set_weight_lb(Some(weight_to_lb(w, unit)?));
    }
    if notes.is_some() {
        entry.set_notes(notes);
    }

    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        let date_str = saved.date.format("%Y-%m-%d");
        match saved.weight_lb {
            Some(lb) => println!(
                "Logged {:.1} lbs ({:.1} kg) for {date_str}",
                lb,
                lb / LBS_PER_KG
            ),
            None => println!("Saved entry for {date_str}"),
        }
        if let Some(ref n) = saved.notes {
            println!("  Notes: {n}");
        }
    }

    Ok(())
}

pub(crate) fn cmd_show(svc: &CaliperService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let Some(entry) = svc.get_entry(DEFAULT_USER, date)? else {
        let date_str = date.format("%Y-%m-%d");
        if json {
            println!("{}", json_error(&format!("No entry for {date_str}")));
        } else {
            eprintln!("No entry for {date_str}");
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("{}", entry.date.format("%Y-%m-%d"));
    if let Some(lb) = entry.weight_lb {
        println!("  Weight:   {:.1} lbs ({:.1} kg)", lb, lb / LBS_PER_KG);
    }
    if let Some(bf) = entry.body_fat_percent {
        println!("  Body fat: {bf:.1}% ({})", entry.body_fat_mode.as_str());
    }
    println!("  Sex:      {}", entry.sex.as_str());

    let mut any = false;
    for field in MEASUREMENT_FIELDS {
        if let Some(inches) = entry.measurements.get_inches(*field) {
            if !any {
                println!("  Measurements (in):");
                any = true;
            }
            println!("    {:<12} {inches:.1}", field.as_str());
        }
    }

    for slot in caliper_core::models::PHOTO_SLOTS {
        if entry.photos.get(*slot).is_some() {
            println!("  Photo:    {}", slot.as_str());
        }
    }
    if let Some(ref n) = entry.notes {
        println!("  Notes:    {n}");
    }

    Ok(())
}

pub(crate) fn cmd_delete(svc: &CaliperService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let deleted = svc.delete_entry(DEFAULT_USER, date)?;
    let date_str = date.format("%Y-%m-%d");

    if json {
        println!("{}", serde_json::json!({ "date": date_str.to_string(), "deleted": deleted }));
    } else if deleted {
        println!("Deleted entry for {date_str}");
    } else {
        eprintln!("No entry for {date_str}");
    }

    Ok(())
}

pub(crate) fn cmd_history(svc: &CaliperService, json: bool) -> Result<()> {
    let entries = svc.history(DEFAULT_USER)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No entries found. Use `caliper log` to record your first entry.");
    } else {
        #[derive(Tabled)]
        struct EntryRow {
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (lbs)")]
            weight: String,
            #[tabled(rename = "Body fat %")]
            body_fat: String,
            #[tabled(rename = "Mode")]
            mode: String,
            #[tabled(rename = "Notes")]
            notes: String,
        }

        let rows: Vec<EntryRow> = entries
            .iter()
            .map(|e| EntryRow {
                date: e.date.format("%Y-%m-%d").to_string(),
                weight: fmt_opt1(e.weight_lb),
                body_fat: fmt_opt1(e.body_fat_percent),
                mode: e.body_fat_mode.as_str().to_string(),
                notes: e.notes.as_deref().map(|n| truncate(n, 30)).unwrap_or_default(),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}
