//! Error types for cohort-session.

use thiserror::Error;

use crate::model::{ActorId, TerrainId};

/// Result type for cohort-session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while hosting a session.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing the model or an export failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The model or an export could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A CSV export could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is not valid TOML
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The configured proximity radius was rejected
    #[error("Proximity error: {0}")]
    Proximity(#[from] cohort_proximity::Error),

    /// No active actor has this id
    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),

    /// No terrain has this id
    #[error("unknown terrain: {0}")]
    UnknownTerrain(TerrainId),

    /// Canvas dimensions must be positive and finite
    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    /// The requested export format does not exist
    #[error("unknown export format: {0}")]
    UnknownExportFormat(String),
}
