//! Legality masking and per-location order sampling.
//!
//! Sampling works on a detached copy of the policy with illegal orders zeroed.
//! The log-probability kept for training is read from the original, unmasked
//! distribution at the sampled action, so gradients flow through the full policy.

use burn::prelude::*;
use burn::tensor::TensorData;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::error::SelectionError;
use crate::game::{DiplomacyGame, Location, OrderCatalog};

/// Actions chosen for one power in one turn.
#[derive(Debug, Clone)]
pub struct Selection<B: Backend> {
    /// One catalog index per orderable location, in location order.
    pub actions: Vec<usize>,
    /// `[actions.len()]` log-probabilities under the unmasked policy.
    pub log_probs: Tensor<B, 1>,
}

/// Zero every catalog entry not in `legal`. Weights are not renormalised.
pub fn mask_illegal(probs: &[f32], legal: &[usize]) -> Vec<f32> {
    let mut masked = vec![0.0f32; probs.len()];
    for &action in legal {
        if let Some(&p) = probs.get(action) {
            masked[action] = p;
        }
    }
    masked
}

/// Draw one legal action for `location` from a single row of the policy.
pub fn sample_legal<R: Rng + ?Sized>(
    probs: &[f32],
    legal: &[usize],
    location: Location,
    rng: &mut R,
) -> Result<usize, SelectionError> {
    if legal.is_empty() {
        return Err(SelectionError::NoLegalOrders { location });
    }
    let masked = mask_illegal(probs, legal);
    let dist = WeightedIndex::new(&masked).map_err(|e| SelectionError::InvalidDistribution {
        location,
        reason: e.to_string(),
    })?;
    Ok(dist.sample(rng))
}

/// Log-probability of each row's chosen action: `log(probs[i, actions[i]])`.
pub fn log_prob<B: Backend>(probs: Tensor<B, 2>, actions: &[usize]) -> Tensor<B, 1> {
    let n = actions.len();
    let indices: Vec<i64> = actions.iter().map(|&a| a as i64).collect();
    let indices =
        Tensor::<B, 2, Int>::from_data(TensorData::new(indices, [n, 1]), &probs.device());
    probs.log().gather(1, indices).reshape([n])
}

/// Sample one legal action per orderable location of a single power.
///
/// `probs` is the decoder output `[locations.len(), catalog_size]`.
pub fn select_actions<B, G, R>(
    probs: Tensor<B, 2>,
    locations: &[Location],
    game: &G,
    catalog: &OrderCatalog,
    rng: &mut R,
) -> Result<Selection<B>, SelectionError>
where
    B: Backend,
    G: DiplomacyGame + ?Sized,
    R: Rng + ?Sized,
{
    let [_, width] = probs.dims();
    let detached: Vec<f32> = probs.clone().detach().into_data().iter::<f32>().collect();

    let mut actions = Vec::with_capacity(locations.len());
    for (row, &location) in detached.chunks(width).zip(locations) {
        let legal = catalog.legal_actions(game, location);
        actions.push(sample_legal(row, &legal, location, rng)?);
    }

    let log_probs = log_prob(probs, &actions);
    Ok(Selection { actions, log_probs })
}
