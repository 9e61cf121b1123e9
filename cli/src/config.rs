use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Single-user CLI: every entry is keyed under this user id.
pub const DEFAULT_USER: &str = "default";

pub struct Config {
    pub db_path: PathBuf,
    pub photos_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "caliper").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("caliper.db");
        let photos_dir = data_dir.join("photos");
        std::fs::create_dir_all(&photos_dir).with_context(|| {
            format!("Failed to create photos directory: {}", photos_dir.display())
        })?;

        Ok(Config {
            db_path,
            photos_dir,
        })
    }
}
