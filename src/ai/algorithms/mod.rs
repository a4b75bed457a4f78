mod actor_critic;

pub use actor_critic::{AcConfig, ActorCriticAgent, PowerLossMetrics, UpdateMetrics};
