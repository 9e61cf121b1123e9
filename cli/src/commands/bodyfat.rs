use anyhow::Result;

use caliper_core::bodyfat::BodyFatMode;
use caliper_core::service::CaliperService;

use super::helpers::parse_date;
use crate::config::DEFAULT_USER;

pub(crate) fn cmd_bodyfat_set(
    svc: &CaliperService,
    percent: f64,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_body_fat_manual(Some(percent));
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        match saved.body_fat_percent {
            Some(bf) => println!(
                "Set body fat to {bf:.1}% ({}) for {}",
                saved.body_fat_mode.as_str(),
                saved.date.format("%Y-%m-%d")
            ),
            None => println!(
                "Cleared body fat for {} (value out of range)",
                saved.date.format("%Y-%m-%d")
            ),
        }
    }

    Ok(())
}

pub(crate) fn cmd_bodyfat_clear(
    svc: &CaliperService,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_body_fat_manual(None);
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        let date_str = saved.date.format("%Y-%m-%d");
        match saved.body_fat_percent {
            // Clearing with complete measurements re-engages the estimator.
            Some(bf) => println!("Body fat re-estimated at {bf:.1}% for {date_str}"),
            None => println!("Cleared body fat for {date_str}"),
        }
    }

    Ok(())
}

pub(crate) fn cmd_bodyfat_mode(
    svc: &CaliperService,
    mode: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let mode = BodyFatMode::parse(mode)?;
    let date = parse_date(date)?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.set_body_fat_mode(mode);
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        let date_str = saved.date.format("%Y-%m-%d");
        match saved.body_fat_percent {
            Some(bf) => println!(
                "Body fat mode is {} for {date_str} (current value {bf:.1}%)",
                saved.body_fat_mode.as_str()
            ),
            None => println!(
                "Body fat mode is {} for {date_str}",
                saved.body_fat_mode.as_str()
            ),
        }
    }

    Ok(())
}
