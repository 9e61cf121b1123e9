use std::path::Path;

use anyhow::{Context, Result, bail};

use caliper_core::service::CaliperService;

use crate::config::DEFAULT_USER;

pub(crate) fn cmd_export(
    svc: &CaliperService,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = match format.to_lowercase().as_str() {
        "csv" => svc.export_csv(DEFAULT_USER)?,
        "json" => svc.export_json(DEFAULT_USER)?,
        _ => bail!("Invalid format '{format}'. Use 'csv' or 'json'"),
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported history to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
