//! On-disk state shared by all commands.
//!
//! The catalog (`catalog.json`) and the registry snapshot (`photos.json`)
//! live next to the stored photos in the storage root. A missing file means
//! an empty catalog or an empty registry.

use anyhow::Context;
use atelier_core::{Atelier, Catalog, Config, RegistrySnapshot};
use std::path::{Path, PathBuf};

pub const CATALOG_FILE: &str = "catalog.json";
pub const PHOTOS_FILE: &str = "photos.json";

/// Load config from an explicit path, or from the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            Config::load_from(Path::new(&expanded))
                .with_context(|| format!("Failed to load config from {expanded}"))
        }
        None => Ok(Config::load()?),
    }
}

/// Paths of the state files under one storage root.
#[derive(Debug, Clone)]
pub struct StateFiles {
    root: PathBuf,
}

impl StateFiles {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.storage_root(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn photos_path(&self) -> PathBuf {
        self.root.join(PHOTOS_FILE)
    }

    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let path = self.catalog_path();
        if !path.exists() {
            return Ok(Catalog::new());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Catalog::from_json(&content).with_context(|| format!("Invalid catalog in {}", path.display()))
    }

    pub fn save_catalog(&self, catalog: &Catalog) -> anyhow::Result<()> {
        write_atomically(&self.catalog_path(), &catalog.to_json()?)
    }

    pub fn load_snapshot(&self) -> anyhow::Result<RegistrySnapshot> {
        let path = self.photos_path();
        if !path.exists() {
            return Ok(RegistrySnapshot::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid photo registry in {}", path.display()))
    }

    pub fn save_snapshot(&self, snapshot: &RegistrySnapshot) -> anyhow::Result<()> {
        write_atomically(&self.photos_path(), &serde_json::to_string_pretty(snapshot)?)
    }

    /// Build an engine over local disk storage from the saved state.
    pub fn open(&self, config: Config) -> anyhow::Result<Atelier> {
        let catalog = self.load_catalog()?;
        let snapshot = self.load_snapshot()?;
        tracing::debug!(
            "Loaded state from {}: {} atelier(s), {} product(s), {} photo row(s)",
            self.root.display(),
            catalog.ateliers().len(),
            catalog.products().len(),
            snapshot.photos.len()
        );
        Ok(Atelier::local(config, catalog, snapshot))
    }

    /// Persist the engine's registry rows.
    pub async fn persist(&self, atelier: &Atelier) -> anyhow::Result<()> {
        self.save_snapshot(&atelier.snapshot().await)
    }
}

/// Write `content` to a sibling temp file, then rename over `path`.
fn write_atomically(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{AtelierId, ProductId, UserId};

    fn files_in(dir: &Path) -> StateFiles {
        let mut config = Config::default();
        config.storage.root = dir.to_path_buf();
        StateFiles::new(&config)
    }

    #[test]
    fn test_missing_files_mean_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(dir.path());
        assert!(files.load_catalog().unwrap().products().is_empty());
        assert!(files.load_snapshot().unwrap().photos.is_empty());
    }

    #[test]
    fn test_catalog_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(&dir.path().join("nested"));

        let mut catalog = Catalog::new();
        catalog.add_atelier(AtelierId(1), UserId(2));
        catalog.add_product(ProductId(3), AtelierId(1)).unwrap();
        files.save_catalog(&catalog).unwrap();

        let loaded = files.load_catalog().unwrap();
        assert_eq!(loaded.product(ProductId(3)).unwrap().atelier_id, AtelierId(1));
        assert!(!files.root().join("catalog.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = files_in(dir.path());
        std::fs::write(files.photos_path(), "{ not json").unwrap();
        assert!(files.load_snapshot().is_err());
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_batch_files = 4\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.limits.max_batch_files, 4);
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
