use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use tracing::debug;

use crate::ai::algorithms::ActorCriticAgent;
use crate::ai::state_encoding::{FeatureExtractor, Observation};
use crate::error::TrainingError;
use crate::game::{center_counts, DiplomacyGame, Location, Power, ALL_POWERS, NUM_POWERS};
use crate::training::metrics::EpisodeResult;
use crate::training::trajectory::{new_power_trajectories, PowerTrajectories};

/// Total reward shared by the winners of a finished game.
pub const VICTORY_REWARD: f32 = 34.0;

/// Everything the update step needs from one finished episode.
pub struct EpisodeTrace<B: Backend> {
    pub trajectories: PowerTrajectories<B>,
    /// Features of the position after the last simulated turn, for bootstrapping.
    pub final_observation: Observation,
    pub result: EpisodeResult,
}

/// Reward of one power for one phase.
///
/// `winners` is `Some` only on the phase that ended the game. A winner receives
/// an equal share of [`VICTORY_REWARD`]; everyone else gets the change in
/// supply-centre count.
pub fn turn_reward(before: usize, after: usize, power: Power, winners: Option<&[Power]>) -> f32 {
    if let Some(winners) = winners {
        if winners.contains(&power) {
            return VICTORY_REWARD / winners.len() as f32;
        }
    }
    after as f32 - before as f32
}

/// Play one self-play game, all seven powers sharing `agent`, until the engine
/// reports the game done or `max_turns` phases have been processed.
pub fn play_episode<B, G, F>(
    agent: &mut ActorCriticAgent<B>,
    game: &mut G,
    features: &F,
    episode: usize,
    max_turns: usize,
) -> Result<EpisodeTrace<B>, TrainingError>
where
    B: AutodiffBackend,
    G: DiplomacyGame + ?Sized,
    F: FeatureExtractor<G> + ?Sized,
{
    let mut trajectories = new_power_trajectories::<B>();
    let mut turn = 0;

    while turn < max_turns && !game.is_game_done() {
        let obs = agent
            .observe(&*game, features)
            .map_err(|source| TrainingError::Observation {
                episode,
                turn,
                source,
            })?;
        let orderable: Vec<(Power, Vec<Location>)> = ALL_POWERS
            .iter()
            .map(|&power| (power, game.orderable_locations(power)))
            .collect();
        let before = center_counts(&*game);

        let output = agent.forward(&obs, orderable);

        let mut log_probs: [Option<Tensor<B, 1>>; NUM_POWERS] = Default::default();
        let mut submissions = Vec::with_capacity(NUM_POWERS);
        for policy in &output.policies {
            let power = policy.power;
            let context = |source| TrainingError::Selection {
                episode,
                turn,
                power,
                source,
            };
            let orders = match agent.select(policy, &*game).map_err(context)? {
                Some(selection) => {
                    let orders = agent.orders_for(&selection.actions).map_err(context)?;
                    log_probs[power.index()] = Some(selection.log_probs);
                    orders
                }
                None => Vec::new(),
            };
            submissions.push((power, orders));
        }

        let phase = game.phase_name();
        for (power, orders) in submissions {
            game.set_orders(power, orders);
        }
        game.process();

        let after = center_counts(&*game);
        let done = game.is_game_done();
        let winners = if done { game.winners() } else { Vec::new() };

        for power in ALL_POWERS {
            let i = power.index();
            let reward = turn_reward(
                before[i],
                after[i],
                power,
                done.then_some(winners.as_slice()),
            );
            let value = output.value.clone().slice([i..i + 1]);
            trajectories[i].record_turn(value, log_probs[i].take(), reward);
        }

        debug!(episode, turn, phase = %phase, centers = ?after, "phase processed");
        turn += 1;
    }

    let final_observation =
        agent
            .observe(&*game, features)
            .map_err(|source| TrainingError::Observation {
                episode,
                turn,
                source,
            })?;

    let finished = game.is_game_done();
    let result = EpisodeResult {
        episode,
        turns: turn,
        final_centers: center_counts(&*game),
        winners: if finished { game.winners() } else { Vec::new() },
        finished,
    };

    Ok(EpisodeTrace {
        trajectories,
        final_observation,
        result,
    })
}

/// Derive a deterministic seed for a given episode index.
pub fn episode_seed(base_seed: u64, episode_index: usize) -> u64 {
    let mut hash = base_seed ^ 0x517cc1b727220a95;
    let index = episode_index as u64;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index;
    hash = hash.wrapping_mul(0x100000001b3);
    hash ^= index >> 32;
    hash
}
