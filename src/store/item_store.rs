use std::collections::HashMap;

use tracing::debug;

use super::location::{LocationKey, QueryKey};
use crate::models::Item;

/// The two client-side views of item collections
///
/// * the location store maps a resolved [`LocationKey`] to the active items
///   at that location and is the canonical view;
/// * the query cache maps the literal [`QueryKey`] of a list fetch to the
///   items it returned, so repeated lists skip the round-trip.
///
/// Every mutation result goes through [`ItemStore::apply`] or
/// [`ItemStore::remove`], which update both views together.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    locations: HashMap<LocationKey, Vec<Item>>,
    queries: HashMap<QueryKey, Vec<Item>>,
}

fn upsert(items: &mut Vec<Item>, item: &Item) {
    match items.iter_mut().find(|existing| existing.id == item.id) {
        Some(existing) => *existing = item.clone(),
        None => items.push(item.clone()),
    }
}

fn active(items: Vec<Item>) -> Vec<Item> {
    items.into_iter().filter(|item| !item.is_finished).collect()
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active items at a location, if the location has been loaded
    pub fn location(&self, key: &LocationKey) -> Option<&[Item]> {
        self.locations.get(key).map(Vec::as_slice)
    }

    /// Replaces the items at a location; finished items are dropped
    pub fn set_location(&mut self, key: LocationKey, items: Vec<Item>) {
        self.locations.insert(key, active(items));
    }

    /// Runs `f` on the list at a location, creating it if needed
    pub fn mutate_location<F>(&mut self, key: LocationKey, f: F)
    where
        F: FnOnce(&mut Vec<Item>),
    {
        let items = self.locations.entry(key).or_default();
        f(items);
        items.retain(|item| !item.is_finished);
    }

    /// Items last fetched for a query, if any
    pub fn query(&self, key: &QueryKey) -> Option<&[Item]> {
        self.queries.get(key).map(Vec::as_slice)
    }

    /// Records a fetch result
    ///
    /// The result is also the authoritative content of the location the
    /// query resolves to, so the location store is refreshed with it.
    pub fn set_query(&mut self, key: QueryKey, items: Vec<Item>) {
        let items = active(items);
        self.locations.insert(key.location(), items.clone());
        self.queries.insert(key, items);
    }

    /// Forgets a query result so the next read fetches again
    pub fn invalidate_query(&mut self, key: &QueryKey) -> bool {
        self.queries.remove(key).is_some()
    }

    /// Runs `f` on a cached query result; does nothing if it was never fetched
    pub fn mutate_query<F>(&mut self, key: &QueryKey, f: F)
    where
        F: FnOnce(&mut Vec<Item>),
    {
        if let Some(items) = self.queries.get_mut(key) {
            f(items);
            items.retain(|item| !item.is_finished);
        }
    }

    /// Finds an item anywhere in either view
    pub fn find(&self, item_id: &str) -> Option<&Item> {
        self.locations
            .values()
            .chain(self.queries.values())
            .flat_map(|items| items.iter())
            .find(|item| item.id == item_id)
    }

    /// Applies an authoritative item state to both views
    ///
    /// The item is removed from every list that is not its current location
    /// and inserted (or replaced in place) at its current location. Query
    /// entries are only updated when they already exist; the location list is
    /// created if needed. Finished items are removed everywhere.
    pub fn apply(&mut self, previous: Option<&Item>, current: &Item) {
        let new_location = current.location();
        let keep = !current.is_finished;

        debug!(
            "Applying item {}: {} -> {}{}",
            current.id,
            previous.map(|p| p.location().to_string()).unwrap_or_else(|| "new".to_string()),
            new_location,
            if keep { "" } else { " (finished)" }
        );

        for (key, items) in self.locations.iter_mut() {
            if !keep || *key != new_location {
                items.retain(|item| item.id != current.id);
            }
        }
        if keep {
            upsert(self.locations.entry(new_location.clone()).or_default(), current);
        }

        for (key, items) in self.queries.iter_mut() {
            if keep && key.location() == new_location {
                upsert(items, current);
            } else {
                items.retain(|item| item.id != current.id);
            }
        }
    }

    /// Removes an item from both views, returning the last known state
    pub fn remove(&mut self, item_id: &str) -> Option<Item> {
        let found = self.find(item_id).cloned();
        for items in self.locations.values_mut().chain(self.queries.values_mut()) {
            items.retain(|item| item.id != item_id);
        }
        found
    }

    /// Drops everything
    pub fn clear(&mut self) {
        self.locations.clear();
        self.queries.clear();
    }

    /// Number of entries holding `item_id` at a location (0 or 1 when consistent)
    pub fn count_at(&self, key: &LocationKey, item_id: &str) -> usize {
        self.locations
            .get(key)
            .map_or(0, |items| items.iter().filter(|item| item.id == item_id).count())
    }

    /// Number of entries holding `item_id` in a query result
    pub fn count_in_query(&self, key: &QueryKey, item_id: &str) -> usize {
        self.queries
            .get(key)
            .map_or(0, |items| items.iter().filter(|item| item.id == item_id).count())
    }
}


#[cfg(test)]
mod prop_tests;
