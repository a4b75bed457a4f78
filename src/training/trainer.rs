use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::algorithms::ActorCriticAgent;
use crate::ai::state_encoding::FeatureExtractor;
use crate::checkpoint::{CheckpointManager, CheckpointManagerConfig, CheckpointMetrics};
use crate::error::{CheckpointError, TrainingError};
use crate::game::{DiplomacyGame, Power, ALL_POWERS};
use crate::training::episode::{episode_seed, play_episode};
use crate::training::metrics::TrainingMetrics;

/// Trainer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    /// Phase limit per game.
    pub max_turns: usize,
    /// Episodes between checkpoints and saved-game exports.
    pub checkpoint_interval: usize,
    /// Episodes between rolling-statistics log lines.
    pub log_interval: usize,
    pub games_dir: PathBuf,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 100,
            max_turns: 20_000,
            checkpoint_interval: 10,
            log_interval: 10,
            games_dir: PathBuf::from("games"),
            seed: None,
        }
    }
}

/// Self-play trainer: every power of every game is played by the same agent.
pub struct Trainer {
    config: TrainerConfig,
    checkpoint_manager: CheckpointManager,
}

impl Trainer {
    pub fn new(
        config: TrainerConfig,
        checkpoint: CheckpointManagerConfig,
    ) -> Result<Self, CheckpointError> {
        Ok(Trainer {
            config,
            checkpoint_manager: CheckpointManager::new(checkpoint)?,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Restore the latest checkpoint into `agent`. Returns the episode it was
    /// taken at, or `None` when there is nothing to resume from.
    pub fn resume<B: AutodiffBackend>(
        &self,
        agent: &mut ActorCriticAgent<B>,
    ) -> Result<Option<usize>, TrainingError> {
        let data = match self.checkpoint_manager.load_latest() {
            Ok(data) => data,
            Err(CheckpointError::NoLatestSymlink(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        data.restore_into(agent)?;
        info!(
            episode = data.metadata.episode,
            path = %data.path.display(),
            "resumed from checkpoint"
        );
        Ok(Some(data.metadata.episode))
    }

    /// Run `num_episodes` games, each on a fresh engine from `new_game`, with one
    /// update per game. Continues the agent's episode numbering.
    pub fn train<B, G, F, NG>(
        &self,
        agent: &mut ActorCriticAgent<B>,
        mut new_game: NG,
        features: &F,
    ) -> Result<TrainingMetrics, TrainingError>
    where
        B: AutodiffBackend,
        G: DiplomacyGame,
        F: FeatureExtractor<G> + ?Sized,
        NG: FnMut() -> G,
    {
        let mut metrics = TrainingMetrics::with_capacity(self.config.log_interval.max(1));

        let start_episode = agent.episode_count();
        let end_episode = start_episode + self.config.num_episodes;
        info!(
            episodes = self.config.num_episodes,
            start = start_episode,
            end = end_episode,
            "starting actor-critic training"
        );

        for episode in start_episode..end_episode {
            let started = Instant::now();
            if let Some(seed) = self.config.seed {
                agent.reseed(episode_seed(seed, episode));
            }

            let mut game = new_game();
            let trace = play_episode(agent, &mut game, features, episode, self.config.max_turns)?;
            let updates_before = agent.update_count();
            let update = agent.update(&trace.trajectories, &trace.final_observation, episode)?;
            if agent.update_count() > updates_before {
                metrics.record_update(update.loss);
            }

            let result = trace.result;
            info!(
                episode,
                turns = result.turns,
                centers = ?result.final_centers,
                winners = %format_winners(&result.winners),
                loss = update.loss,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "episode finished"
            );
            for power in ALL_POWERS {
                let loss = update.powers[power.index()];
                debug!(episode, %power, actor = ?loss.actor, critic = loss.critic, "power loss");
            }
            metrics.record_episode(result);

            let completed = episode + 1;
            if completed % self.config.log_interval.max(1) == 0 {
                let window = self.config.log_interval.max(1);
                info!(
                    episode = completed,
                    avg_loss = metrics.average_loss(window),
                    avg_turns = metrics.average_game_length(window),
                    unfinished = metrics.unfinished_rate(window),
                    win_counts = ?metrics.win_counts(),
                    "training progress"
                );
            }

            if completed % self.config.checkpoint_interval.max(1) == 0 {
                if let Some(saved) = game.saved_game() {
                    let path = write_saved_game(&self.config.games_dir, completed, &saved)?;
                    debug!(path = %path.display(), "saved game exported");
                }
                let window = self.config.log_interval.max(1);
                let ckpt_metrics = CheckpointMetrics {
                    win_rates: metrics.win_rates(window),
                    average_game_length: metrics.average_game_length(window),
                    current_loss: metrics.average_loss(window),
                    update_count: agent.update_count(),
                };
                let path = self
                    .checkpoint_manager
                    .save_checkpoint(agent, &ckpt_metrics, completed)?;
                info!(path = %path.display(), "checkpoint saved");
            }
        }

        info!(
            total_episodes = metrics.total_episodes(),
            updates = agent.update_count(),
            "training complete"
        );
        Ok(metrics)
    }
}

/// Write an engine's saved-game JSON to `<dir>/game_<episode>.json`.
pub fn write_saved_game(
    dir: &Path,
    episode: usize,
    saved: &serde_json::Value,
) -> Result<PathBuf, TrainingError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("game_{episode}.json"));
    fs::write(&path, serde_json::to_string_pretty(saved)?)?;
    Ok(path)
}

fn format_winners(winners: &[Power]) -> String {
    if winners.is_empty() {
        return "-".to_string();
    }
    winners
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_agent, ConstantFeatures, ScriptedGame};

    fn short_game() -> ScriptedGame {
        ScriptedGame::new(3)
            .with_orderable(Power::France, &["PAR", "MAR"])
            .with_legal("PAR", &[0, 1])
            .with_legal("MAR", &[2, 3])
            .with_growth(Power::France, 1)
            .ends_after(3, &[Power::France])
    }

    fn trainer_in(dir: &Path, num_episodes: usize) -> Trainer {
        Trainer::new(
            TrainerConfig {
                num_episodes,
                max_turns: 10,
                checkpoint_interval: 2,
                log_interval: 1,
                games_dir: dir.join("games"),
                seed: Some(17),
            },
            CheckpointManagerConfig {
                checkpoint_dir: dir.join("checkpoints"),
                keep_last_n: 5,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_train_runs_episodes_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 4);
        let mut agent = test_agent(Some(1));

        let metrics = trainer
            .train(&mut agent, short_game, &ConstantFeatures::small())
            .unwrap();

        assert_eq!(metrics.total_episodes(), 4);
        assert_eq!(metrics.win_counts()[Power::France.index()], 4);
        assert_eq!(agent.episode_count(), 4);
        assert_eq!(agent.update_count(), 4);
    }

    #[test]
    fn test_checkpoints_and_saved_games_on_interval() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 4);
        let mut agent = test_agent(Some(1));

        trainer
            .train(&mut agent, short_game, &ConstantFeatures::small())
            .unwrap();

        assert!(dir.path().join("games/game_2.json").exists());
        assert!(dir.path().join("games/game_4.json").exists());
        assert!(!dir.path().join("games/game_3.json").exists());

        let saved: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("games/game_4.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["phases"], 3);

        assert!(dir.path().join("checkpoints/checkpoint_0000002").is_dir());
        assert!(dir.path().join("checkpoints/checkpoint_0000004").is_dir());
    }

    #[test]
    fn test_resume_continues_episode_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 2);
        let mut agent = test_agent(Some(1));
        trainer
            .train(&mut agent, short_game, &ConstantFeatures::small())
            .unwrap();

        let mut resumed = test_agent(Some(2));
        assert_eq!(trainer.resume(&mut resumed).unwrap(), Some(2));
        assert_eq!(resumed.episode_count(), 2);

        trainer
            .train(&mut resumed, short_game, &ConstantFeatures::small())
            .unwrap();
        assert_eq!(resumed.episode_count(), 4);
        assert!(dir.path().join("checkpoints/checkpoint_0000004").is_dir());
    }

    #[test]
    fn test_resume_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 1);
        let mut agent = test_agent(Some(1));
        assert_eq!(trainer.resume(&mut agent).unwrap(), None);
    }

    #[test]
    fn test_episode_error_aborts_training() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = trainer_in(dir.path(), 3);
        let mut agent = test_agent(Some(1));
        let broken = || ScriptedGame::new(3).with_orderable(Power::Italy, &["ROM"]);

        let err = trainer
            .train(&mut agent, broken, &ConstantFeatures::small())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TrainingError::Selection {
                episode: 0,
                turn: 0,
                power: Power::Italy,
                ..
            }
        ));
        assert_eq!(agent.update_count(), 0);
    }

    #[test]
    fn test_write_saved_game() {
        let dir = tempfile::tempdir().unwrap();
        let value = serde_json::json!({"phases": ["S1901M"]});
        let path = write_saved_game(&dir.path().join("games"), 12, &value).unwrap();
        assert!(path.ends_with("game_12.json"));
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_format_winners() {
        assert_eq!(format_winners(&[]), "-");
        assert_eq!(
            format_winners(&[Power::England, Power::Russia]),
            "ENGLAND,RUSSIA"
        );
    }
}
