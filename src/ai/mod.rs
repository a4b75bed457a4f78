pub mod algorithms;
pub mod networks;
pub mod selection;
pub mod state_encoding;

pub use algorithms::{AcConfig, ActorCriticAgent, UpdateMetrics};
pub use networks::{ActorCriticNetwork, NetworkConfig};
pub use state_encoding::{FeatureExtractor, Observation};
