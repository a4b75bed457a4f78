use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::game::{NUM_LOCATIONS, NUM_POWERS};

use super::NetworkConfig;

/// Value head over the whole board.
///
/// ```text
/// Flatten: [81, embed_size] => [81 * embed_size]
/// Linear => embed_size, ReLU
/// Linear => 7, softmax over powers
/// ```
///
/// The output is each power's share of the position, so the seven values sum to 1.
#[derive(Module, Debug)]
pub struct ValueHead<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
    relu: Relu,
}

impl<B: Backend> ValueHead<B> {
    pub fn new(config: &NetworkConfig, device: &B::Device) -> Self {
        ValueHead {
            hidden: LinearConfig::new(NUM_LOCATIONS * config.embed_size, config.embed_size)
                .init(device),
            output: LinearConfig::new(config.embed_size, NUM_POWERS).init(device),
            relu: Relu::new(),
        }
    }

    /// Forward pass: embedding `[81, embed_size]` -> values `[7]`.
    pub fn forward(&self, embedding: Tensor<B, 2>) -> Tensor<B, 1> {
        let [locations, width] = embedding.dims();
        let x = embedding.reshape([1, locations * width]);
        let x = self.relu.forward(self.hidden.forward(x));
        softmax(self.output.forward(x), 1).reshape([NUM_POWERS])
    }
}
