//! # Diplomacy actor-critic
//!
//! Multi-agent actor-critic learning for seven-player Diplomacy. One shared
//! network embeds the whole board with a transformer, decodes each power's
//! orders with an LSTM, and estimates every power's share of the game with a
//! softmax value head. Built on the Burn ML framework.
//!
//! ## Modules
//!
//! - [`game`]: Powers, map locations, the order catalog and the engine trait
//! - [`ai`]: Feature encoding, networks, legal-order sampling, the learner
//! - [`training`]: Trajectories, episode driver, metrics, trainer loop
//! - [`checkpoint`]: Model persistence and versioning
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod training;

#[cfg(test)]
pub(crate) mod testing;
