use burn::prelude::*;
use burn::tensor::TensorData;

use crate::error::ConfigError;
use crate::game::NUM_LOCATIONS;

/// Per-location feature vectors produced by an external feature pipeline.
///
/// Both methods return a row-major `[NUM_LOCATIONS * width]` vector ordered by
/// location index.
pub trait FeatureExtractor<G: ?Sized> {
    /// Width of one location's board-state vector.
    fn board_width(&self) -> usize;

    /// Width of one location's previous-order vector.
    fn order_width(&self) -> usize;

    fn board_state(&self, game: &G) -> Vec<f32>;

    /// What happened at each location during the preceding phase.
    fn previous_orders(&self, game: &G) -> Vec<f32>;
}

/// One turn's network input, validated against the declared widths.
#[derive(Debug, Clone)]
pub struct Observation {
    board: Vec<f32>,
    orders: Vec<f32>,
    board_width: usize,
    order_width: usize,
}

impl Observation {
    pub fn new(
        board: Vec<f32>,
        orders: Vec<f32>,
        board_width: usize,
        order_width: usize,
    ) -> Result<Self, ConfigError> {
        check_len("board state", &board, board_width)?;
        check_len("previous orders", &orders, order_width)?;
        Ok(Observation {
            board,
            orders,
            board_width,
            order_width,
        })
    }

    /// Extract the current turn's features from `game`.
    pub fn observe<G: ?Sized, F: FeatureExtractor<G> + ?Sized>(
        game: &G,
        features: &F,
    ) -> Result<Self, ConfigError> {
        Self::new(
            features.board_state(game),
            features.previous_orders(game),
            features.board_width(),
            features.order_width(),
        )
    }

    pub fn board_width(&self) -> usize {
        self.board_width
    }

    pub fn order_width(&self) -> usize {
        self.order_width
    }

    /// Board state as a `[NUM_LOCATIONS, board_width]` tensor.
    pub fn board_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        to_matrix(&self.board, self.board_width, device)
    }

    /// Previous orders as a `[NUM_LOCATIONS, order_width]` tensor.
    pub fn orders_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        to_matrix(&self.orders, self.order_width, device)
    }
}

fn check_len(what: &'static str, data: &[f32], width: usize) -> Result<(), ConfigError> {
    if width == 0 || data.len() != NUM_LOCATIONS * width {
        return Err(ConfigError::FeatureWidth {
            what,
            expected: NUM_LOCATIONS * width,
            actual: data.len(),
        });
    }
    Ok(())
}

fn to_matrix<B: Backend>(data: &[f32], width: usize, device: &B::Device) -> Tensor<B, 2> {
    Tensor::<B, 2>::from_data(TensorData::new(data.to_vec(), [NUM_LOCATIONS, width]), device)
}
