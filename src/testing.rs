//! Scripted engine and fixed features for unit tests.

use std::collections::HashMap;

use burn::backend::{Autodiff, NdArray};

use crate::ai::algorithms::{AcConfig, ActorCriticAgent};
use crate::ai::networks::NetworkConfig;
use crate::ai::state_encoding::FeatureExtractor;
use crate::game::{DiplomacyGame, Location, OrderCatalog, Power, NUM_LOCATIONS, NUM_POWERS};

pub(crate) type TestBackend = Autodiff<NdArray>;

pub(crate) const CATALOG_SIZE: usize = 6;

pub(crate) fn small_network_config() -> NetworkConfig {
    NetworkConfig {
        embed_size: 16,
        transformer_layers: 1,
        attention_heads: 2,
        feedforward_size: 32,
        dropout: 0.0,
        lstm_layers: 2,
        board_features: 3,
        order_features: 2,
    }
}

/// `ORDER 0` .. `ORDER 5`.
pub(crate) fn small_catalog() -> OrderCatalog {
    OrderCatalog::new((0..CATALOG_SIZE).map(order_name).collect())
}

pub(crate) fn order_name(action: usize) -> String {
    format!("ORDER {action}")
}

pub(crate) fn test_agent(seed: Option<u64>) -> ActorCriticAgent<TestBackend> {
    ActorCriticAgent::new(
        small_network_config(),
        AcConfig::default(),
        small_catalog(),
        Default::default(),
        seed,
    )
    .unwrap()
}

/// Features that depend only on the location, not on the game.
pub(crate) struct ConstantFeatures {
    board_width: usize,
    order_width: usize,
}

impl ConstantFeatures {
    pub(crate) fn new(board_width: usize, order_width: usize) -> Self {
        ConstantFeatures {
            board_width,
            order_width,
        }
    }

    /// Widths matching [`small_network_config`].
    pub(crate) fn small() -> Self {
        Self::new(3, 2)
    }

    fn fill(width: usize) -> Vec<f32> {
        (0..NUM_LOCATIONS * width)
            .map(|i| ((i % 17) as f32) / 17.0)
            .collect()
    }
}

impl<G: ?Sized> FeatureExtractor<G> for ConstantFeatures {
    fn board_width(&self) -> usize {
        self.board_width
    }

    fn order_width(&self) -> usize {
        self.order_width
    }

    fn board_state(&self, _game: &G) -> Vec<f32> {
        Self::fill(self.board_width)
    }

    fn previous_orders(&self, _game: &G) -> Vec<f32> {
        Self::fill(self.order_width)
    }
}

/// An engine whose centre counts and ending are scripted up front.
///
/// Orderable locations and legal orders stay fixed for the whole game. Every
/// `process` adds each power's growth to its centre count.
pub(crate) struct ScriptedGame {
    centers: [usize; NUM_POWERS],
    growth: [i64; NUM_POWERS],
    orderable: HashMap<Power, Vec<Location>>,
    legal: HashMap<Location, Vec<String>>,
    end_after: Option<usize>,
    winners: Vec<Power>,
    processed: usize,
    pending: HashMap<Power, Vec<String>>,
    submitted: HashMap<Power, Vec<Vec<String>>>,
}

impl ScriptedGame {
    /// Every power starts with `centers` supply centres.
    pub(crate) fn new(centers: usize) -> Self {
        ScriptedGame {
            centers: [centers; NUM_POWERS],
            growth: [0; NUM_POWERS],
            orderable: HashMap::new(),
            legal: HashMap::new(),
            end_after: None,
            winners: Vec::new(),
            processed: 0,
            pending: HashMap::new(),
            submitted: HashMap::new(),
        }
    }

    pub(crate) fn with_orderable(mut self, power: Power, locations: &[&str]) -> Self {
        let locations = locations
            .iter()
            .map(|n| Location::from_name(n).unwrap())
            .collect();
        self.orderable.insert(power, locations);
        self
    }

    /// Legal orders at `location`, given as catalog indices of [`small_catalog`].
    pub(crate) fn with_legal(mut self, location: &str, actions: &[usize]) -> Self {
        let location = Location::from_name(location).unwrap();
        self.legal
            .insert(location, actions.iter().map(|&a| order_name(a)).collect());
        self
    }

    pub(crate) fn with_growth(mut self, power: Power, per_phase: i64) -> Self {
        self.growth[power.index()] = per_phase;
        self
    }

    /// Finish after `phases` calls to `process`, won by `winners`.
    pub(crate) fn ends_after(mut self, phases: usize, winners: &[Power]) -> Self {
        self.end_after = Some(phases);
        self.winners = winners.to_vec();
        self
    }

    pub(crate) fn processed(&self) -> usize {
        self.processed
    }

    /// Orders submitted by `power`, one entry per processed phase.
    pub(crate) fn submitted(&self, power: Power) -> Vec<Vec<String>> {
        self.submitted.get(&power).cloned().unwrap_or_default()
    }
}

impl DiplomacyGame for ScriptedGame {
    fn supply_centers(&self, power: Power) -> usize {
        self.centers[power.index()]
    }

    fn orderable_locations(&self, power: Power) -> Vec<Location> {
        self.orderable.get(&power).cloned().unwrap_or_default()
    }

    fn legal_orders(&self, location: Location) -> Vec<String> {
        self.legal.get(&location).cloned().unwrap_or_default()
    }

    fn set_orders(&mut self, power: Power, orders: Vec<String>) {
        self.pending.insert(power, orders);
    }

    fn process(&mut self) {
        for (power, orders) in self.pending.drain() {
            self.submitted.entry(power).or_default().push(orders);
        }
        for (c, &g) in self.centers.iter_mut().zip(self.growth.iter()) {
            *c = (*c as i64 + g).max(0) as usize;
        }
        self.processed += 1;
    }

    fn is_game_done(&self) -> bool {
        self.end_after.is_some_and(|n| self.processed >= n)
    }

    fn winners(&self) -> Vec<Power> {
        if self.is_game_done() {
            self.winners.clone()
        } else {
            Vec::new()
        }
    }

    fn phase_name(&self) -> String {
        format!("PHASE{}", self.processed)
    }

    fn saved_game(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({ "phases": self.processed }))
    }
}
