//! Session configuration.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. `COHORT_PORT` and `COHORT_DATA` override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cohort_proximity::{DeviceClass, ProximityRadius};
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::scene::CanvasSize;
use crate::transactions::Bootstrap;

/// Settings for one hosted session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Device class, which picks the proximity radius
    pub device: DeviceClass,
    /// Explicit radius, overriding the device default
    pub radius: Option<f64>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Where the model is saved
    pub data_path: PathBuf,
    pub tick_interval_ms: u64,
    /// Save every this many ticks; 0 disables autosave
    pub autosave_every: u64,
    pub port: u16,
    pub bootstrap: Bootstrap,
    /// Where exports are written
    pub export_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: DeviceClass::default(),
            radius: None,
            canvas_width: 400.0,
            canvas_height: 800.0,
            data_path: PathBuf::from("data/model.json"),
            tick_interval_ms: 1000,
            autosave_every: 10,
            port: 3000,
            bootstrap: Bootstrap::default(),
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl SessionConfig {
    /// Parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `COHORT_PORT` and `COHORT_DATA` through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("COHORT_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!(value = %port, "ignoring invalid COHORT_PORT"),
            }
        }
        if let Some(data) = lookup("COHORT_DATA") {
            self.data_path = PathBuf::from(data);
        }
    }

    /// The proximity radius in effect.
    pub fn radius(&self) -> Result<ProximityRadius> {
        match self.radius {
            Some(r) => Ok(ProximityRadius::new(r)?),
            None => Ok(ProximityRadius::for_device(self.device)),
        }
    }

    pub fn canvas(&self) -> Result<CanvasSize> {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(SessionConfig::from_toml("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn device_picks_radius() {
        let config = SessionConfig::from_toml("device = \"tablet\"").unwrap();
        assert_eq!(config.radius().unwrap().value(), 150.0);

        let config = SessionConfig::default();
        assert_eq!(config.radius().unwrap().value(), 75.0);
    }

    #[test]
    fn explicit_radius_wins() {
        let config = SessionConfig::from_toml("device = \"tablet\"\nradius = 90.0").unwrap();
        assert_eq!(config.radius().unwrap().value(), 90.0);
    }

    #[test]
    fn bad_radius_is_rejected() {
        let config = SessionConfig::from_toml("radius = -1.0").unwrap();
        assert!(matches!(config.radius(), Err(Error::Proximity(_))));
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        assert!(matches!(
            SessionConfig::from_toml("port = \"many\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn full_file() {
        let config = SessionConfig::from_toml(
            r#"
            canvas_width = 1024.0
            canvas_height = 768.0
            data_path = "/tmp/cohort.json"
            tick_interval_ms = 250
            autosave_every = 4
            port = 8080
            bootstrap = "single_group"
            export_dir = "/tmp/exports"
            "#,
        )
        .unwrap();

        assert_eq!(config.canvas().unwrap().width(), 1024.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.autosave_every, 4);
        assert_eq!(config.port, 8080);
        assert_eq!(config.bootstrap, Bootstrap::SingleGroup);
        assert_eq!(config.data_path, PathBuf::from("/tmp/cohort.json"));
    }

    #[test]
    fn env_overrides() {
        let mut config = SessionConfig::default();
        config.apply_env(|key| match key {
            "COHORT_PORT" => Some("9000".into()),
            "COHORT_DATA" => Some("elsewhere.json".into()),
            _ => None,
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("elsewhere.json"));

        config.apply_env(|key| (key == "COHORT_PORT").then(|| "nope".to_string()));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohort.toml");
        fs::write(&path, "port = 4000").unwrap();
        assert_eq!(SessionConfig::from_file(&path).unwrap().port, 4000);
        assert!(matches!(
            SessionConfig::from_file(dir.path().join("missing.toml")),
            Err(Error::Io(_))
        ));
    }
}
