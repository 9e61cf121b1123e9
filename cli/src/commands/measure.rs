use anyhow::Result;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use caliper_core::bodyfat::{BodyFatMode, Sex};
use caliper_core::models::{MEASUREMENT_FIELDS, MeasurementField};
use caliper_core::service::CaliperService;

use super::helpers::{fmt_opt1, parse_date};
use crate::config::DEFAULT_USER;

pub(crate) fn cmd_measure_set(
    svc: &CaliperService,
    field: &str,
    inches: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let field = MeasurementField::parse(field)?;
    let date = parse_date(date)?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_measurement_in(field, Some(inches));
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "Set {} to {inches:.1} in for {}",
            field.as_str(),
            saved.date.format("%Y-%m-%d")
        );
        if field.affects_body_fat() && saved.body_fat_mode == BodyFatMode::Auto {
            if let Some(bf) = saved.body_fat_percent {
                println!("  Estimated body fat: {bf:.1}%");
            }
        }
    }

    Ok(())
}

pub(crate) fn cmd_measure_clear(
    svc: &CaliperService,
    field: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let field = MeasurementField::parse(field)?;
    let date = parse_date(date)?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_measurement_in(field, None);
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "Cleared {} for {}",
            field.as_str(),
            saved.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_measure_show(
    svc: &CaliperService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.load_or_default(DEFAULT_USER, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry.measurements)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct MeasureRow {
        #[tabled(rename = "Field")]
        field: &'static str,
        #[tabled(rename = "Inches")]
        inches: String,
        #[tabled(rename = "cm")]
        cm: String,
    }

    let rows: Vec<MeasureRow> = MEASUREMENT_FIELDS
        .iter()
        .map(|f| MeasureRow {
            field: f.as_str(),
            inches: fmt_opt1(entry.measurements.get_inches(*f)),
            cm: entry
                .measurements
                .get(*f)
                .map_or("-".into(), |v| format!("{v:.2}")),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_sex(
    svc: &CaliperService,
    sex: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let sex = Sex::parse(sex)?;
    let date = parse_date(date)?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_sex(sex);
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "Set sex to {} for {}",
            saved.sex.as_str(),
            saved.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}
