//! Self-play training: per-power trajectories, the episode driver, rolling
//! metrics, and the multi-episode trainer.

pub mod episode;
pub mod metrics;
pub mod trainer;
pub mod trajectory;
