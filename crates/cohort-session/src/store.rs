//! JSON persistence for the model.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::Model;
use crate::transactions::Bootstrap;

/// A model file on disk.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored model, or `None` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<Model>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let model: Model = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), ticks = model.ticks(), "model loaded");
        Ok(Some(model))
    }

    /// Read the stored model, starting fresh if it is missing or unreadable.
    pub fn load_or_default(&self, bootstrap: Bootstrap) -> Model {
        match self.load() {
            Ok(Some(model)) => model,
            Ok(None) => {
                info!(path = %self.path.display(), "no saved model, starting fresh");
                Model::new(bootstrap)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "saved model unreadable, starting fresh");
                Model::new(bootstrap)
            }
        }
    }

    /// Write the model, replacing the previous file in one step.
    pub fn save(&self, model: &Model) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(model)?;
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        debug!(path = %self.path.display(), ticks = model.ticks(), "model saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Terrain, TerrainKind};

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("model.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("model.json"));

        let mut model = Model::default();
        model.tick();
        model.add_terrain(Terrain::new(TerrainKind::Guitars));
        store.save(&model).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.ticks(), 1);
        assert_eq!(loaded.actor_count(), model.actor_count());
        assert_eq!(loaded.last_groups(), model.last_groups());
        assert!(!dir.path().join("nested").join("model.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_falls_back_to_fresh_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{not json").unwrap();

        let store = Store::new(&path);
        assert!(store.load().is_err());

        let model = store.load_or_default(Bootstrap::SingleGroup);
        assert_eq!(model.ticks(), 0);
        assert_eq!(model.last_groups().len(), 1);
    }

    #[test]
    fn save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("model.json"));

        let mut model = Model::default();
        store.save(&model).unwrap();
        model.tick();
        model.tick();
        store.save(&model).unwrap();

        assert_eq!(store.load().unwrap().unwrap().ticks(), 2);
    }
}
