//! Diplomacy vocabulary shared by the learner: powers, map locations, the order
//! catalog, and the engine interface the episode driver plays against.

mod catalog;
mod engine;
mod location;
mod power;

pub use catalog::OrderCatalog;
pub use engine::{center_counts, DiplomacyGame};
pub use location::{Location, LOCATION_NAMES, NUM_LOCATIONS};
pub use power::{Power, ALL_POWERS, NUM_POWERS};
