use burn::nn::{Linear, LinearConfig, Lstm, LstmConfig};
use burn::prelude::*;
use burn::tensor::activation::softmax;
use burn::tensor::TensorData;

use crate::game::Location;

use super::NetworkConfig;

/// Recurrent per-power policy decoder.
///
/// The embeddings of a power's orderable locations are fed, in order, through a
/// stack of LSTM layers, so the distribution at one location is conditioned on the
/// locations decoded before it in the same turn. Recurrent state starts from zero
/// on every call.
#[derive(Module, Debug)]
pub struct PolicyDecoder<B: Backend> {
    layers: Vec<Lstm<B>>,
    policy_head: Linear<B>,
}

impl<B: Backend> PolicyDecoder<B> {
    pub fn new(config: &NetworkConfig, catalog_size: usize, device: &B::Device) -> Self {
        let layers = (0..config.lstm_layers)
            .map(|_| LstmConfig::new(config.embed_size, config.embed_size, true).init(device))
            .collect();

        PolicyDecoder {
            layers,
            policy_head: LinearConfig::new(config.embed_size, catalog_size).init(device),
        }
    }

    /// Order distributions `[locations.len(), catalog_size]`, one row per location.
    /// Returns `None` when the power has nothing to order.
    pub fn forward(&self, embedding: Tensor<B, 2>, locations: &[Location]) -> Option<Tensor<B, 2>> {
        if locations.is_empty() {
            return None;
        }

        let device = embedding.device();
        let indices: Vec<i64> = locations.iter().map(|loc| loc.index() as i64).collect();
        let indices =
            Tensor::<B, 1, Int>::from_data(TensorData::new(indices, [locations.len()]), &device);

        // [1, n, embed_size]: one sequence of n locations
        let mut x = embedding.select(0, indices).unsqueeze::<3>();
        for layer in &self.layers {
            let (output, _state) = layer.forward(x, None);
            x = output;
        }

        let logits = self.policy_head.forward(x.squeeze::<2>(0));
        Some(softmax(logits, 1))
    }
}
