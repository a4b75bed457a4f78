use std::path::PathBuf;

use crate::game::{Location, Power};

/// Errors that can occur during checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("no 'latest' symlink found in {0}")]
    NoLatestSymlink(PathBuf),

    #[error("failed to read metadata from {path}: {source}")]
    MetadataRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse metadata from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Data-consistency errors raised while turning a policy into orders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("location {location} is orderable but has no legal order in the catalog")]
    NoLegalOrders { location: Location },

    #[error("action {action} is outside the order catalog (size {catalog_size})")]
    UnknownAction { action: usize, catalog_size: usize },

    #[error("cannot sample an order at {location}: {reason}")]
    InvalidDistribution { location: Location, reason: String },
}

/// Errors from choosing one power's orders outside of training.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Observation(#[from] ConfigError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Errors that abort a training run. Turn-level failures carry the episode,
/// turn and power needed to reproduce them.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("episode {episode}, turn {turn}, power {power}: {source}")]
    Selection {
        episode: usize,
        turn: usize,
        power: Power,
        source: SelectionError,
    },

    #[error("episode {episode}, turn {turn}: {source}")]
    Observation {
        episode: usize,
        turn: usize,
        source: ConfigError,
    },

    #[error("episode {episode}: non-finite loss {loss}")]
    NonFiniteLoss { episode: usize, loss: f32 },

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration or building the network.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to parse order catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("{what} has width {actual}, network expects {expected}")]
    FeatureWidth {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
