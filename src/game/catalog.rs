use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, SelectionError};

use super::engine::DiplomacyGame;
use super::location::Location;

/// Fixed catalog of every order the policy can emit. An action is an index into it.
#[derive(Debug, Clone)]
pub struct OrderCatalog {
    orders: Vec<String>,
    index: HashMap<String, usize>,
}

impl OrderCatalog {
    /// Build a catalog from order strings. Duplicates keep their first index.
    pub fn new(orders: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(orders.len());
        for (i, order) in orders.iter().enumerate() {
            index.entry(order.clone()).or_insert(i);
        }
        OrderCatalog { orders, index }
    }

    /// Load a catalog from a JSON array of order strings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let orders: Vec<String> =
            serde_json::from_str(&content).map_err(|e| ConfigError::CatalogParse {
                path: path.to_path_buf(),
                source: e,
            })?;
        if orders.is_empty() {
            return Err(ConfigError::Validation(format!(
                "order catalog {} is empty",
                path.display()
            )));
        }
        Ok(Self::new(orders))
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Resolve an action index to its order string.
    pub fn order(&self, action: usize) -> Result<&str, SelectionError> {
        self.orders
            .get(action)
            .map(String::as_str)
            .ok_or(SelectionError::UnknownAction {
                action,
                catalog_size: self.orders.len(),
            })
    }

    pub fn index_of(&self, order: &str) -> Option<usize> {
        self.index.get(order).copied()
    }

    /// Catalog indices of the orders the engine allows at `location`.
    /// Legal orders missing from the catalog cannot be chosen and are skipped.
    pub fn legal_actions<G: DiplomacyGame + ?Sized>(
        &self,
        game: &G,
        location: Location,
    ) -> Vec<usize> {
        let mut actions: Vec<usize> = game
            .legal_orders(location)
            .iter()
            .filter_map(|order| self.index_of(order))
            .collect();
        actions.sort_unstable();
        actions.dedup();
        actions
    }
}
