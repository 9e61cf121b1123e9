use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use caliper_core::service::PhotoStorage;

/// Photo storage backed by a local directory. References are paths
/// relative to the store root (e.g. `default/2025-12-01/front.jpg`), and
/// "signed URLs" are plain `file://` URLs — there is nothing to sign
/// locally, but the trait keeps the core oblivious to that.
pub struct LocalPhotoStore {
    root: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(root: PathBuf) -> Self {
        LocalPhotoStore { root }
    }

    /// Copy a photo file into the store and return its reference.
    pub fn import(&self, source: &Path, user_id: &str, date: &str, slot: &str) -> Result<String> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg");
        let reference = format!("{user_id}/{date}/{slot}.{ext}");
        let dest = self.root.join(&reference);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create photo directory: {}", parent.display())
            })?;
        }
        std::fs::copy(source, &dest)
            .with_context(|| format!("Failed to copy photo from {}", source.display()))?;

        Ok(reference)
    }
}

impl PhotoStorage for LocalPhotoStore {
    fn signed_url(&self, reference: &str, _ttl_secs: u64) -> Result<String> {
        let path = self.root.join(reference);
        if !path.is_file() {
            bail!("Photo not found: {reference}");
        }
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("snap.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let store = LocalPhotoStore::new(dir.path().join("photos"));
        let reference = store
            .import(&source, "default", "2025-12-01", "front")
            .unwrap();
        assert_eq!(reference, "default/2025-12-01/front.jpg");

        let url = store.signed_url(&reference, 3600).unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("default/2025-12-01/front.jpg"));
    }

    #[test]
    fn test_missing_photo_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalPhotoStore::new(dir.path().to_path_buf());
        assert!(store.signed_url("default/2025-12-01/front.jpg", 3600).is_err());
    }
}
