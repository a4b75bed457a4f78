use std::path::Path;

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::DefaultRecorder;
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::ai::networks::{ActorCriticNetwork, NetworkConfig, NetworkOutput, PowerPolicy};
use crate::ai::selection::{select_actions, Selection};
use crate::ai::state_encoding::{FeatureExtractor, Observation};
use crate::checkpoint::AcTrainingState;
use crate::error::{CheckpointError, ConfigError, OrderError, SelectionError, TrainingError};
use crate::game::{DiplomacyGame, Location, OrderCatalog, Power, ALL_POWERS, NUM_POWERS};
use crate::training::trajectory::PowerTrajectories;

const NETWORK_FILE: &str = "actor_critic_network";

/// Actor-critic hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcConfig {
    pub learning_rate: f64,
    pub gamma: f32,
}

impl Default for AcConfig {
    fn default() -> Self {
        AcConfig {
            learning_rate: 1e-4,
            gamma: 0.99,
        }
    }
}

/// Loss terms reported for one power after an update.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerLossMetrics {
    /// `None` if the power never had an orderable location this episode.
    pub actor: Option<f32>,
    pub critic: f32,
}

/// Metrics returned from one episode's update.
#[derive(Debug, Clone, Default)]
pub struct UpdateMetrics {
    /// Sum of every power's actor and critic loss.
    pub loss: f32,
    pub powers: [PowerLossMetrics; NUM_POWERS],
}

/// Seven-power actor-critic learner sharing one network and one optimizer.
pub struct ActorCriticAgent<B: AutodiffBackend> {
    network: ActorCriticNetwork<B>,
    optimizer: OptimizerAdaptor<Adam, ActorCriticNetwork<B>, B>,
    network_config: NetworkConfig,
    config: AcConfig,
    catalog: OrderCatalog,
    device: B::Device,
    episode_count: usize,
    update_count: usize,
    rng: StdRng,
}

impl<B: AutodiffBackend> ActorCriticAgent<B> {
    /// Build the network for `catalog`. With a seed, parameter initialisation and
    /// order sampling are reproducible.
    pub fn new(
        network_config: NetworkConfig,
        config: AcConfig,
        catalog: OrderCatalog,
        device: B::Device,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if config.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "actor_critic.learning_rate must be > 0".into(),
            ));
        }
        if let Some(seed) = seed {
            B::seed(seed);
        }
        let network = network_config.init::<B>(catalog.len(), &device)?;
        let optimizer = AdamConfig::new().init();
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(ActorCriticAgent {
            network,
            optimizer,
            network_config,
            config,
            catalog,
            device,
            episode_count: 0,
            update_count: 0,
            rng,
        })
    }

    /// Re-seed order sampling, e.g. at the start of an episode.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn catalog(&self) -> &OrderCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &AcConfig {
        &self.config
    }

    pub fn network_config(&self) -> &NetworkConfig {
        &self.network_config
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    /// Extract this turn's features and check them against the network's input widths.
    pub fn observe<G: ?Sized, F: FeatureExtractor<G> + ?Sized>(
        &self,
        game: &G,
        features: &F,
    ) -> Result<Observation, ConfigError> {
        let obs = Observation::observe(game, features)?;
        self.network_config
            .check_feature_widths(obs.board_width(), obs.order_width())?;
        Ok(obs)
    }

    /// Training forward pass: the returned tensors are tracked for backprop.
    pub fn forward(
        &self,
        obs: &Observation,
        orderable: Vec<(Power, Vec<Location>)>,
    ) -> NetworkOutput<B> {
        self.network.forward(
            obs.board_tensor(&self.device),
            obs.orders_tensor(&self.device),
            orderable,
        )
    }

    /// Sample legal actions for one power's policy. `None` if it has nothing to order.
    pub fn select<BP: Backend, G: DiplomacyGame + ?Sized>(
        &mut self,
        policy: &PowerPolicy<BP>,
        game: &G,
    ) -> Result<Option<Selection<BP>>, SelectionError> {
        match &policy.probs {
            Some(probs) => select_actions(
                probs.clone(),
                &policy.locations,
                game,
                &self.catalog,
                &mut self.rng,
            )
            .map(Some),
            None => Ok(None),
        }
    }

    /// Resolve sampled action indices to order strings.
    pub fn orders_for(&self, actions: &[usize]) -> Result<Vec<String>, SelectionError> {
        actions
            .iter()
            .map(|&a| self.catalog.order(a).map(str::to_string))
            .collect()
    }

    /// Choose orders for a single power without recording anything for training.
    pub fn get_orders<G, F>(
        &mut self,
        game: &G,
        features: &F,
        power: Power,
    ) -> Result<Vec<String>, OrderError>
    where
        G: DiplomacyGame + ?Sized,
        F: FeatureExtractor<G> + ?Sized,
    {
        let obs = self.observe(game, features)?;
        let locations = game.orderable_locations(power);
        let network = self.network.valid();
        let output = network.forward(
            obs.board_tensor(&self.device),
            obs.orders_tensor(&self.device),
            vec![(power, locations)],
        );

        match self.select(&output.policies[0], game)? {
            Some(selection) => Ok(self.orders_for(&selection.actions)?),
            None => Ok(Vec::new()),
        }
    }

    /// Value estimate of every power for a position, without gradient.
    pub fn values(&self, obs: &Observation) -> [f32; NUM_POWERS] {
        let network = self.network.valid();
        let embedding = network.embed(
            obs.board_tensor(&self.device),
            obs.orders_tensor(&self.device),
        );
        let data: Vec<f32> = network.value(embedding).into_data().iter::<f32>().collect();
        let mut values = [0.0f32; NUM_POWERS];
        for (v, d) in values.iter_mut().zip(data) {
            *v = d;
        }
        values
    }

    /// One gradient update from a finished episode.
    ///
    /// Every power's actor and critic loss is summed into one scalar, so the
    /// gradients of all seven powers add up before the single optimizer step.
    pub fn update(
        &mut self,
        trajectories: &PowerTrajectories<B>,
        final_obs: &Observation,
        episode: usize,
    ) -> Result<UpdateMetrics, TrainingError> {
        let bootstrap = self.values(final_obs);
        let mut metrics = UpdateMetrics::default();
        let mut total: Option<Tensor<B, 1>> = None;

        for power in ALL_POWERS {
            let i = power.index();
            let Some(loss) = trajectories[i].losses(bootstrap[i], self.config.gamma) else {
                continue;
            };
            metrics.powers[i] = PowerLossMetrics {
                actor: loss.actor.as_ref().map(scalar),
                critic: scalar(&loss.critic),
            };
            let power_total = loss.total();
            total = Some(match total {
                Some(t) => t + power_total,
                None => power_total,
            });
        }

        self.episode_count += 1;
        let Some(total) = total else {
            return Ok(metrics);
        };

        let loss = scalar(&total);
        if !loss.is_finite() {
            return Err(TrainingError::NonFiniteLoss { episode, loss });
        }
        metrics.loss = loss;

        let grads = total.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optimizer
            .step(self.config.learning_rate, self.network.clone(), grads);
        self.update_count += 1;

        Ok(metrics)
    }

    /// Save network weights to a directory.
    pub fn save_to_dir(&self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.network
            .clone()
            .valid()
            .save_file(dir.join(NETWORK_FILE), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))
    }

    /// Load network weights from a directory.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.network = self
            .network
            .clone()
            .load_file(dir.join(NETWORK_FILE), &recorder, &self.device)
            .map_err(|e| CheckpointError::ModelLoad(e.to_string()))?;
        Ok(())
    }

    /// Export current training state for checkpointing.
    pub fn training_state(&self) -> AcTrainingState {
        AcTrainingState {
            episode_count: self.episode_count,
            update_count: self.update_count,
            learning_rate: self.config.learning_rate,
            gamma: self.config.gamma,
        }
    }

    /// Restore training state from a checkpoint.
    pub fn restore_training_state(&mut self, state: &AcTrainingState) {
        self.episode_count = state.episode_count;
        self.update_count = state.update_count;
        self.config = AcConfig {
            learning_rate: state.learning_rate,
            gamma: state.gamma,
        };
    }
}

fn scalar<B: Backend>(t: &Tensor<B, 1>) -> f32 {
    t.clone().into_data().iter::<f32>().next().unwrap_or(f32::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_agent, ConstantFeatures, ScriptedGame, TestBackend};
    use crate::training::trajectory::new_power_trajectories;

    fn scripted_game() -> ScriptedGame {
        ScriptedGame::new(5)
            .with_orderable(Power::France, &["PAR", "MAR"])
            .with_legal("PAR", &[0, 1])
            .with_legal("MAR", &[2, 3])
    }

    #[test]
    fn test_get_orders_are_legal() {
        let mut agent = test_agent(Some(3));
        let game = scripted_game();

        for _ in 0..20 {
            let orders = agent
                .get_orders(&game, &ConstantFeatures::small(), Power::France)
                .unwrap();
            assert_eq!(orders.len(), 2);
            assert!(orders[0] == "ORDER 0" || orders[0] == "ORDER 1");
            assert!(orders[1] == "ORDER 2" || orders[1] == "ORDER 3");
        }
    }

    #[test]
    fn test_get_orders_empty_when_nothing_orderable() {
        let mut agent = test_agent(Some(3));
        let game = scripted_game();
        let orders = agent
            .get_orders(&game, &ConstantFeatures::small(), Power::Russia)
            .unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_get_orders_surfaces_missing_legal_orders() {
        let mut agent = test_agent(Some(3));
        let game = ScriptedGame::new(5).with_orderable(Power::Italy, &["ROM"]);
        let err = agent
            .get_orders(&game, &ConstantFeatures::small(), Power::Italy)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::Selection(SelectionError::NoLegalOrders { .. })
        ));
    }

    #[test]
    fn test_feature_width_mismatch_is_config_error() {
        let agent = test_agent(Some(3));
        let game = scripted_game();
        let err = agent
            .observe(&game, &ConstantFeatures::new(4, 2))
            .unwrap_err();
        assert!(matches!(err, ConfigError::FeatureWidth { .. }));
    }

    #[test]
    fn test_orders_for_unknown_action() {
        let agent = test_agent(Some(3));
        let err = agent.orders_for(&[0, 99]).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownAction { action: 99, .. }));
    }

    #[test]
    fn test_values_are_shares() {
        let agent = test_agent(Some(3));
        let obs = agent
            .observe(&scripted_game(), &ConstantFeatures::small())
            .unwrap();
        let values = agent.values(&obs);
        assert!((values.iter().sum::<f32>() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_update_changes_parameters() {
        let mut agent = test_agent(Some(3));
        let game = scripted_game();
        let features = ConstantFeatures::small();
        let obs = agent.observe(&game, &features).unwrap();

        let before = agent.values(&obs);

        let mut trajectories = new_power_trajectories::<TestBackend>();
        let orderable: Vec<(Power, Vec<Location>)> = ALL_POWERS
            .iter()
            .map(|&p| (p, game.orderable_locations(p)))
            .collect();
        let output = agent.forward(&obs, orderable);
        for policy in &output.policies {
            let i = policy.power.index();
            let selection = agent.select(policy, &game).unwrap();
            let value = output.value.clone().slice([i..i + 1]);
            let reward = if policy.power == Power::France { 1.0 } else { 0.0 };
            trajectories[i].record_turn(value, selection.map(|s| s.log_probs), reward);
        }

        let metrics = agent.update(&trajectories, &obs, 0).unwrap();
        assert!(metrics.loss.is_finite());
        assert!(metrics.powers[Power::France.index()].actor.is_some());
        assert!(metrics.powers[Power::England.index()].actor.is_none());
        assert_eq!(agent.update_count(), 1);
        assert_eq!(agent.episode_count(), 1);

        let after = agent.values(&obs);
        assert_ne!(before, after);
    }

    #[test]
    fn test_training_state_roundtrip() {
        let mut agent = test_agent(Some(3));
        let state = AcTrainingState {
            episode_count: 40,
            update_count: 38,
            learning_rate: 5e-4,
            gamma: 0.95,
        };
        agent.restore_training_state(&state);
        let restored = agent.training_state();
        assert_eq!(restored.episode_count, 40);
        assert_eq!(restored.update_count, 38);
        assert!((restored.learning_rate - 5e-4).abs() < 1e-12);
        assert!((restored.gamma - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_save_and_load_weights() {
        let dir = tempfile::tempdir().unwrap();
        let source = test_agent(Some(11));
        source.save_to_dir(dir.path()).unwrap();

        let mut target = test_agent(Some(12));
        let obs = source
            .observe(&scripted_game(), &ConstantFeatures::small())
            .unwrap();
        assert_ne!(source.values(&obs), target.values(&obs));

        target.load_from_dir(dir.path()).unwrap();
        let a = source.values(&obs);
        let b = target.values(&obs);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let result = ActorCriticAgent::<TestBackend>::new(
            crate::testing::small_network_config(),
            AcConfig {
                learning_rate: 0.0,
                gamma: 0.99,
            },
            crate::testing::small_catalog(),
            Default::default(),
            Some(1),
        );
        assert!(result.is_err());
    }
}
