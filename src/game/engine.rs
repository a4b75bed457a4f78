use super::location::Location;
use super::power::{Power, ALL_POWERS, NUM_POWERS};

/// The game engine as seen by the learner.
///
/// Adjudication, phase sequencing and termination live behind this trait. The
/// episode driver is the only caller of the mutating methods.
pub trait DiplomacyGame {
    /// Number of supply centres currently controlled by `power`.
    fn supply_centers(&self, power: Power) -> usize;

    /// Locations at which `power` must issue an order this phase, in board order.
    fn orderable_locations(&self, power: Power) -> Vec<Location>;

    /// Legal order strings at `location` this phase.
    fn legal_orders(&self, location: Location) -> Vec<String>;

    /// Submit the orders for one power. Replaces any previous submission.
    fn set_orders(&mut self, power: Power, orders: Vec<String>);

    /// Adjudicate the submitted orders and advance one phase.
    fn process(&mut self);

    fn is_game_done(&self) -> bool;

    /// Winning powers once the game is done. Empty while the game is running.
    fn winners(&self) -> Vec<Power>;

    /// Short phase name for logging, e.g. `"S1901M"`.
    fn phase_name(&self) -> String {
        String::new()
    }

    /// Engine-specific saved-game representation, if the engine can export one.
    fn saved_game(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Supply-centre counts for every power, indexed by [`Power::index`].
pub fn center_counts<G: DiplomacyGame + ?Sized>(game: &G) -> [usize; NUM_POWERS] {
    let mut counts = [0; NUM_POWERS];
    for power in ALL_POWERS {
        counts[power.index()] = game.supply_centers(power);
    }
    counts
}
