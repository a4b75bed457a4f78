mod manager;
mod metadata;

pub use manager::{CheckpointData, CheckpointManager, CheckpointManagerConfig};
pub use metadata::{
    AcTrainingState, CheckpointHyperparameters, CheckpointMetadata, CheckpointMetrics,
};
