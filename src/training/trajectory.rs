use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::NUM_POWERS;

/// One power's record of a single episode.
///
/// `values` and `rewards` get one entry per simulated turn. `log_probs` gets an
/// entry only for turns where the power had something to order, tagged with the
/// turn it belongs to.
#[derive(Debug, Clone)]
pub struct Trajectory<B: Backend> {
    values: Vec<Tensor<B, 1>>,
    log_probs: Vec<(usize, Tensor<B, 1>)>,
    rewards: Vec<f32>,
}

/// Trajectories of all seven powers, indexed by `Power::index`.
pub type PowerTrajectories<B> = [Trajectory<B>; NUM_POWERS];

pub fn new_power_trajectories<B: Backend>() -> PowerTrajectories<B> {
    std::array::from_fn(|_| Trajectory::new())
}

impl<B: Backend> Trajectory<B> {
    pub fn new() -> Self {
        Trajectory {
            values: Vec::new(),
            log_probs: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Append one turn. `value` has shape `[1]`; `log_probs` has one entry per
    /// orderable location and is `None` when the power had nothing to order.
    pub fn record_turn(&mut self, value: Tensor<B, 1>, log_probs: Option<Tensor<B, 1>>, reward: f32) {
        let turn = self.rewards.len();
        self.values.push(value);
        if let Some(lp) = log_probs {
            self.log_probs.push((turn, lp));
        }
        self.rewards.push(reward);
    }

    /// Number of simulated turns.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Turns for which a log-probability entry exists.
    pub fn ordered_turns(&self) -> Vec<usize> {
        self.log_probs.iter().map(|(turn, _)| *turn).collect()
    }

    /// Actor and critic losses against a bootstrap value from the post-episode board.
    /// Returns `None` for an empty trajectory.
    pub fn losses(&self, bootstrap: f32, gamma: f32) -> Option<PowerLoss<B>> {
        if self.is_empty() {
            return None;
        }
        let device = self.values[0].device();
        let n = self.len();

        let qvals = discounted_returns(&self.rewards, bootstrap, gamma);
        let qvals = Tensor::<B, 1>::from_data(TensorData::new(qvals, [n]), &device);
        let values = Tensor::cat(self.values.clone(), 0);
        let advantage = qvals - values;

        // The actor weights are constants; the critic keeps the value gradient.
        let weights: Vec<f32> = advantage.clone().detach().into_data().iter::<f32>().collect();
        let step_losses: Vec<Tensor<B, 1>> = self
            .log_probs
            .iter()
            .map(|(turn, lp)| lp.clone().mul_scalar(-weights[*turn]).mean())
            .collect();
        let actor = if step_losses.is_empty() {
            None
        } else {
            Some(Tensor::cat(step_losses, 0).mean())
        };

        let critic = advantage.powf_scalar(2.0).mean().mul_scalar(0.5);

        Some(PowerLoss { actor, critic })
    }
}

impl<B: Backend> Default for Trajectory<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Loss terms for one power. `actor` is `None` if the power never had orders.
#[derive(Debug, Clone)]
pub struct PowerLoss<B: Backend> {
    pub actor: Option<Tensor<B, 1>>,
    pub critic: Tensor<B, 1>,
}

impl<B: Backend> PowerLoss<B> {
    /// `actor + critic`, shape `[1]`.
    pub fn total(&self) -> Tensor<B, 1> {
        match &self.actor {
            Some(actor) => actor.clone() + self.critic.clone(),
            None => self.critic.clone(),
        }
    }
}

/// Discounted return from every turn to the end of the episode, bootstrapped
/// by the value of the final position:
/// `q[T-1] = r[T-1] + gamma * bootstrap`, `q[t] = r[t] + gamma * q[t+1]`.
pub fn discounted_returns(rewards: &[f32], bootstrap: f32, gamma: f32) -> Vec<f32> {
    let mut qvals = vec![0.0f32; rewards.len()];
    let mut qval = bootstrap;
    for t in (0..rewards.len()).rev() {
        qval = rewards[t] + gamma * qval;
        qvals[t] = qval;
    }
    qvals
}
