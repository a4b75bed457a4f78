use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{Location, Power};

use super::{BoardEncoder, PolicyDecoder, ValueHead};

/// Network shape. Built once per run and passed to every constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub embed_size: usize,
    pub transformer_layers: usize,
    pub attention_heads: usize,
    pub feedforward_size: usize,
    pub dropout: f64,
    pub lstm_layers: usize,
    /// Per-location board-state width expected from the feature extractor.
    pub board_features: usize,
    /// Per-location previous-order width expected from the feature extractor.
    pub order_features: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            embed_size: 224,
            transformer_layers: 10,
            attention_heads: 8,
            feedforward_size: 2048,
            dropout: 0.0,
            lstm_layers: 2,
            board_features: 36,
            order_features: 40,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embed_size == 0 {
            return Err(ConfigError::Validation(
                "network.embed_size must be > 0".into(),
            ));
        }
        if self.attention_heads == 0 || self.embed_size % self.attention_heads != 0 {
            return Err(ConfigError::Validation(
                "network.embed_size must be divisible by network.attention_heads".into(),
            ));
        }
        if self.transformer_layers == 0 {
            return Err(ConfigError::Validation(
                "network.transformer_layers must be >= 1".into(),
            ));
        }
        if self.lstm_layers == 0 {
            return Err(ConfigError::Validation(
                "network.lstm_layers must be >= 1".into(),
            ));
        }
        if self.feedforward_size == 0 {
            return Err(ConfigError::Validation(
                "network.feedforward_size must be > 0".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::Validation(
                "network.dropout must be in [0, 1)".into(),
            ));
        }
        if self.board_features == 0 || self.order_features == 0 {
            return Err(ConfigError::Validation(
                "network.board_features and network.order_features must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Compare the declared input widths with what a feature extractor produces.
    pub fn check_feature_widths(
        &self,
        board_width: usize,
        order_width: usize,
    ) -> Result<(), ConfigError> {
        if board_width != self.board_features {
            return Err(ConfigError::FeatureWidth {
                what: "board state",
                expected: self.board_features,
                actual: board_width,
            });
        }
        if order_width != self.order_features {
            return Err(ConfigError::FeatureWidth {
                what: "previous orders",
                expected: self.order_features,
                actual: order_width,
            });
        }
        Ok(())
    }

    pub fn init<B: Backend>(
        &self,
        catalog_size: usize,
        device: &B::Device,
    ) -> Result<ActorCriticNetwork<B>, ConfigError> {
        self.validate()?;
        if catalog_size == 0 {
            return Err(ConfigError::Validation("order catalog is empty".into()));
        }
        Ok(ActorCriticNetwork {
            encoder: BoardEncoder::new(self, device),
            decoder: PolicyDecoder::new(self, catalog_size, device),
            value_head: ValueHead::new(self, device),
        })
    }
}

/// Order distributions for one power's orderable locations.
#[derive(Debug, Clone)]
pub struct PowerPolicy<B: Backend> {
    pub power: Power,
    pub locations: Vec<Location>,
    /// `[locations.len(), catalog_size]`, `None` when there is nothing to order.
    pub probs: Option<Tensor<B, 2>>,
}

/// Result of one turn's forward pass.
#[derive(Debug, Clone)]
pub struct NetworkOutput<B: Backend> {
    pub policies: Vec<PowerPolicy<B>>,
    /// Per-power value shares `[7]`.
    pub value: Tensor<B, 1>,
}

/// Shared-encoder actor-critic network:
/// ```text
/// Encoder:  (board, prev orders) => joint embedding [81, E]
/// Policy:   embedding rows of a power's orderable locations => LSTM => softmax over catalog
/// Value:    full embedding => [7] softmax over powers
/// ```
#[derive(Module, Debug)]
pub struct ActorCriticNetwork<B: Backend> {
    encoder: BoardEncoder<B>,
    decoder: PolicyDecoder<B>,
    value_head: ValueHead<B>,
}

impl<B: Backend> ActorCriticNetwork<B> {
    /// Joint embedding `[81, E]` for this turn.
    pub fn embed(&self, board: Tensor<B, 2>, orders: Tensor<B, 2>) -> Tensor<B, 2> {
        self.encoder.forward(board, orders)
    }

    pub fn policy(&self, embedding: Tensor<B, 2>, locations: &[Location]) -> Option<Tensor<B, 2>> {
        self.decoder.forward(embedding, locations)
    }

    pub fn value(&self, embedding: Tensor<B, 2>) -> Tensor<B, 1> {
        self.value_head.forward(embedding)
    }

    /// Embed once, decode each requested power independently, and evaluate the board.
    pub fn forward(
        &self,
        board: Tensor<B, 2>,
        orders: Tensor<B, 2>,
        orderable: Vec<(Power, Vec<Location>)>,
    ) -> NetworkOutput<B> {
        let embedding = self.embed(board, orders);

        let policies = orderable
            .into_iter()
            .map(|(power, locations)| {
                let probs = self.policy(embedding.clone(), &locations);
                PowerPolicy {
                    power,
                    locations,
                    probs,
                }
            })
            .collect();

        let value = self.value(embedding);
        NetworkOutput { policies, value }
    }
}
