use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use burn::tensor::backend::AutodiffBackend;

use crate::ai::algorithms::ActorCriticAgent;
use crate::checkpoint::metadata::{
    AcTrainingState, CheckpointHyperparameters, CheckpointMetadata, CheckpointMetrics,
};
use crate::error::CheckpointError;

const METADATA_FILE: &str = "metadata.json";
const TRAINING_STATE_FILE: &str = "training_state.json";

/// Configuration for the checkpoint manager.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CheckpointManagerConfig {
    pub checkpoint_dir: PathBuf,
    pub keep_last_n: usize,
}

impl Default for CheckpointManagerConfig {
    fn default() -> Self {
        CheckpointManagerConfig {
            checkpoint_dir: PathBuf::from("checkpoints"),
            keep_last_n: 5,
        }
    }
}

/// A checkpoint read back from disk. Weights stay on disk until restored.
#[derive(Debug)]
pub struct CheckpointData {
    pub path: PathBuf,
    pub metadata: CheckpointMetadata,
    pub training_state: AcTrainingState,
}

impl CheckpointData {
    /// Load weights and learner state into `agent`.
    pub fn restore_into<B: AutodiffBackend>(
        &self,
        agent: &mut ActorCriticAgent<B>,
    ) -> Result<(), CheckpointError> {
        agent.load_from_dir(&self.path)?;
        agent.restore_training_state(&self.training_state);
        Ok(())
    }
}

/// Saves, loads, lists, and prunes checkpoints under one directory.
pub struct CheckpointManager {
    config: CheckpointManagerConfig,
}

impl CheckpointManager {
    pub fn new(config: CheckpointManagerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        Ok(CheckpointManager { config })
    }

    /// Open an existing checkpoint directory without creating it.
    pub fn open(config: CheckpointManagerConfig) -> Result<Self, CheckpointError> {
        if !config.checkpoint_dir.is_dir() {
            return Err(CheckpointError::DirNotFound(config.checkpoint_dir));
        }
        Ok(CheckpointManager { config })
    }

    pub fn checkpoint_dir(&self) -> &Path {
        &self.config.checkpoint_dir
    }

    /// Write `checkpoint_<episode>/` through a `.tmp` directory, repoint `latest`,
    /// then prune.
    pub fn save_checkpoint<B: AutodiffBackend>(
        &self,
        agent: &ActorCriticAgent<B>,
        metrics: &CheckpointMetrics,
        episode: usize,
    ) -> Result<PathBuf, CheckpointError> {
        let dir_name = format!("checkpoint_{:07}", episode);
        let tmp_dir = self.config.checkpoint_dir.join(format!("{}.tmp", dir_name));
        let final_dir = self.config.checkpoint_dir.join(&dir_name);

        fs::create_dir_all(&tmp_dir)?;

        agent.save_to_dir(&tmp_dir)?;

        let state_json = serde_json::to_string_pretty(&agent.training_state())?;
        fs::write(tmp_dir.join(TRAINING_STATE_FILE), state_json)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let network = agent.network_config();
        let metadata = CheckpointMetadata {
            episode,
            timestamp,
            metrics: metrics.clone(),
            hyperparameters: CheckpointHyperparameters {
                learning_rate: agent.config().learning_rate,
                gamma: agent.config().gamma,
                embed_size: network.embed_size,
                transformer_layers: network.transformer_layers,
                attention_heads: network.attention_heads,
                lstm_layers: network.lstm_layers,
                catalog_size: agent.catalog().len(),
            },
        };
        fs::write(
            tmp_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;

        self.update_latest_symlink(&dir_name)?;
        self.prune_old_checkpoints()?;

        Ok(final_dir)
    }

    pub fn load_checkpoint(&self, dir: &Path) -> Result<CheckpointData, CheckpointError> {
        let metadata = read_json(&dir.join(METADATA_FILE))?;
        let training_state = read_json(&dir.join(TRAINING_STATE_FILE))?;
        Ok(CheckpointData {
            path: dir.to_path_buf(),
            metadata,
            training_state,
        })
    }

    /// Follow the `latest` symlink.
    pub fn load_latest(&self) -> Result<CheckpointData, CheckpointError> {
        let latest_link = self.config.checkpoint_dir.join("latest");
        if latest_link.symlink_metadata().is_err() {
            return Err(CheckpointError::NoLatestSymlink(
                self.config.checkpoint_dir.clone(),
            ));
        }
        let resolved = fs::read_link(&latest_link)?;
        let target = if resolved.is_relative() {
            self.config.checkpoint_dir.join(resolved)
        } else {
            resolved
        };
        self.load_checkpoint(&target)
    }

    /// All complete checkpoints, sorted by episode.
    pub fn list_checkpoints(&self) -> Result<Vec<(PathBuf, CheckpointMetadata)>, CheckpointError> {
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.config.checkpoint_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() || path.is_symlink() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("checkpoint_") || name.ends_with(".tmp") {
                continue;
            }
            let meta_path = path.join(METADATA_FILE);
            if meta_path.exists() {
                let metadata = read_json(&meta_path)?;
                results.push((path, metadata));
            }
        }
        results.sort_by_key(|(_, m): &(PathBuf, CheckpointMetadata)| m.episode);
        Ok(results)
    }

    fn prune_old_checkpoints(&self) -> Result<(), CheckpointError> {
        let checkpoints = self.list_checkpoints()?;
        let keep = self.config.keep_last_n.max(1);
        if checkpoints.len() <= keep {
            return Ok(());
        }
        let excess = checkpoints.len() - keep;
        for (path, _) in checkpoints.iter().take(excess) {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    fn update_latest_symlink(&self, dir_name: &str) -> Result<(), CheckpointError> {
        let link_path = self.config.checkpoint_dir.join("latest");
        if link_path.symlink_metadata().is_ok() {
            fs::remove_file(&link_path)?;
        }
        std::os::unix::fs::symlink(dir_name, &link_path)?;
        Ok(())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CheckpointError> {
    let json = fs::read_to_string(path).map_err(|e| CheckpointError::MetadataRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&json).map_err(|e| CheckpointError::MetadataParse {
        path: path.to_path_buf(),
        source: e,
    })
}
