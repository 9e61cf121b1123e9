use std::path::Path;

use anyhow::Result;

use caliper_core::models::{PHOTO_SLOTS, PhotoSlot};
use caliper_core::service::CaliperService;

use super::helpers::{json_error, parse_date};
use crate::config::DEFAULT_USER;
use crate::photos::LocalPhotoStore;

/// Local URLs never expire, but the service API still wants a TTL.
const PHOTO_URL_TTL_SECS: u64 = 3600;

pub(crate) fn cmd_photo_attach(
    svc: &CaliperService,
    store: &LocalPhotoStore,
    slot: &str,
    file: &Path,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let slot = PhotoSlot::parse(slot)?;
    let date = parse_date(date)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let reference = store.import(file, DEFAULT_USER, &date_str, slot.as_str())?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.photos.set(slot, Some(reference.clone()));
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!("Attached {} photo for {date_str}: {reference}", slot.as_str());
    }

    Ok(())
}

pub(crate) fn cmd_photo_remove(
    svc: &CaliperService,
    slot: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let slot = PhotoSlot::parse(slot)?;
    let date = parse_date(date)?;

    let mut entry = svc.load_or_default(DEFAULT_USER, date)?;
    entry.photos.set(slot, None);
    let saved = svc.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        println!(
            "Removed {} photo for {}",
            slot.as_str(),
            saved.date.format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub(crate) fn cmd_photo_list(
    svc: &CaliperService,
    store: &LocalPhotoStore,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.load_or_default(DEFAULT_USER, date)?;
    let date_str = date.format("%Y-%m-%d");

    if json {
        println!("{}", serde_json::to_string_pretty(&entry.photos)?);
        return Ok(());
    }

    if entry.photos.is_empty() {
        eprintln!("No photos for {date_str}");
        return Ok(());
    }

    println!("Photos for {date_str}:");
    for slot in PHOTO_SLOTS {
        if let Some(url) = svc.photo_url(store, &entry, *slot, PHOTO_URL_TTL_SECS)? {
            println!("  {:<6} {url}", slot.as_str());
        }
    }

    Ok(())
}

pub(crate) fn cmd_photo_show(
    svc: &CaliperService,
    store: &LocalPhotoStore,
    slot: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let slot = PhotoSlot::parse(slot)?;
    let date = parse_date(date)?;
    let entry = svc.load_or_default(DEFAULT_USER, date)?;

    match svc.photo_url(store, &entry, slot, PHOTO_URL_TTL_SECS)? {
        Some(url) => {
            if json {
                println!("{}", serde_json::json!({ "slot": slot.as_str(), "url": url }));
            } else {
                println!("{url}");
            }
        }
        None => {
            let msg = format!(
                "No {} photo for {}",
                slot.as_str(),
                date.format("%Y-%m-%d")
            );
            if json {
                println!("{}", json_error(&msg));
            } else {
                eprintln!("{msg}");
            }
        }
    }

    Ok(())
}
