use serde::{Deserialize, Serialize};

use crate::game::NUM_POWERS;

/// Metrics snapshot at checkpoint time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetrics {
    /// Win share per power, in `Power::index` order.
    pub win_rates: [f32; NUM_POWERS],
    pub average_game_length: f32,
    pub current_loss: f32,
    pub update_count: usize,
}

/// Network shape and learner settings recorded in checkpoint metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointHyperparameters {
    pub learning_rate: f64,
    pub gamma: f32,
    pub embed_size: usize,
    pub transformer_layers: usize,
    pub attention_heads: usize,
    pub lstm_layers: usize,
    pub catalog_size: usize,
}

/// Top-level checkpoint metadata written to metadata.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub episode: usize,
    pub timestamp: u64,
    pub metrics: CheckpointMetrics,
    pub hyperparameters: CheckpointHyperparameters,
}

/// Learner state written to training_state.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcTrainingState {
    pub episode_count: usize,
    pub update_count: usize,
    pub learning_rate: f64,
    pub gamma: f32,
}
