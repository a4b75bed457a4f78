use burn::nn::transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;

use super::NetworkConfig;

/// Joint board embedding shared by the policy decoder and the value head.
///
/// ```text
/// board [81, board_features] ++ orders [81, order_features]
/// Linear (shared across locations) => [81, embed_size]
/// TransformerEncoder x transformer_layers, every location attends to every other
/// Output: [81, embed_size]
/// ```
///
/// There is no positional encoding; a location's identity is its row.
#[derive(Module, Debug)]
pub struct BoardEncoder<B: Backend> {
    projection: Linear<B>,
    transformer: TransformerEncoder<B>,
}

impl<B: Backend> BoardEncoder<B> {
    pub fn new(config: &NetworkConfig, device: &B::Device) -> Self {
        let input_size = config.board_features + config.order_features;
        BoardEncoder {
            projection: LinearConfig::new(input_size, config.embed_size).init(device),
            transformer: TransformerEncoderConfig::new(
                config.embed_size,
                config.feedforward_size,
                config.attention_heads,
                config.transformer_layers,
            )
            .with_dropout(config.dropout)
            .init(device),
        }
    }

    /// Forward pass: board `[81, b]`, orders `[81, o]` -> embedding `[81, embed_size]`.
    pub fn forward(&self, board: Tensor<B, 2>, orders: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = Tensor::cat(vec![board, orders], 1);
        let x = self.projection.forward(x);

        // The 81 locations form one sequence.
        let x = self
            .transformer
            .forward(TransformerEncoderInput::new(x.unsqueeze::<3>()));
        x.squeeze::<2>(0)
    }
}
