//! Order store operations.
//!
//! Responsibilities:
//! - Own the ordered collection of orders (insertion order preserved).
//! - Keep every operation total: lookups on missing ids return `None`,
//!   delete acknowledges even when nothing matched.
//!
//! Unit tests at the bottom validate the full create/read/update/delete
//! lifecycle.

use crate::orders::types::{next_order_id, CreateOrder, Deleted, Order, UpdateOrder};

/// Exclusive owner of the in-memory order collection.
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full collection, insertion order.
    pub fn list(&self) -> Vec<Order> {
        self.orders.clone()
    }

    /// The record whose id matches, or `None`.
    pub fn get(&self, id: &str) -> Option<Order> {
        self.orders.iter().find(|o| o.id == id).cloned()
    }

    /// Construct a record with a generated id, append it, return it.
    pub fn create(&mut self, payload: CreateOrder) -> Order {
        let order = Order {
            id: next_order_id(),
            name: payload.name,
        };
        self.orders.push(order.clone());
        order
    }

    /// Shallow-merge the supplied fields into the record with this id.
    /// Returns `None` without mutating anything when the id is unknown.
    pub fn update(&mut self, id: &str, payload: UpdateOrder) -> Option<Order> {
        let order = self.orders.iter_mut().find(|o| o.id == id)?;
        if let Some(name) = payload.name {
            order.name = name;
        }
        Some(order.clone())
    }

    /// Remove every record with this id (tolerant of duplicate-id
    /// corruption). Always acknowledges.
    pub fn delete(&mut self, id: &str) -> Deleted {
        self.orders.retain(|o| o.id != id);
        Deleted { deleted: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Ids derive from the wall clock in milliseconds; step it between
    // creates so the records get distinct ids.
    fn next_tick() {
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    #[test]
    fn crud_lifecycle_preserves_insertion_order() {
        let mut store = OrderStore::new();

        let a = store.create(CreateOrder { name: "A".into() });
        next_tick();
        let b = store.create(CreateOrder { name: "B".into() });
        assert_ne!(a.id, b.id);

        let listed = store.list();
        assert_eq!(listed, vec![a.clone(), b.clone()]);

        let updated = store
            .update(&a.id, UpdateOrder { name: Some("A2".into()) })
            .expect("existing id updates");
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.name, "A2");

        assert_eq!(store.delete(&b.id), Deleted { deleted: true });
        assert_eq!(
            store.list(),
            vec![Order { id: a.id, name: "A2".into() }]
        );
    }

    #[test]
    fn get_on_never_created_id_is_none() {
        let store = OrderStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn update_on_missing_id_leaves_collection_unchanged() {
        let mut store = OrderStore::new();
        let order = store.create(CreateOrder { name: "keep".into() });

        let result = store.update("missing", UpdateOrder { name: Some("X".into()) });
        assert_eq!(result, None);
        assert_eq!(store.list(), vec![order]);
    }

    #[test]
    fn update_without_name_retains_existing_fields() {
        let mut store = OrderStore::new();
        let order = store.create(CreateOrder { name: "keep".into() });

        let updated = store.update(&order.id, UpdateOrder { name: None }).unwrap();
        assert_eq!(updated, order);
    }

    #[test]
    fn delete_acknowledges_even_when_nothing_matched() {
        let mut store = OrderStore::new();
        assert_eq!(store.delete("missing"), Deleted { deleted: true });
        assert!(store.list().is_empty());
    }

    #[test]
    fn collection_length_tracks_creates_minus_deletes() {
        let mut store = OrderStore::new();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(store.create(CreateOrder { name: format!("o{}", i) }).id);
            next_tick();
        }
        assert_eq!(store.list().len(), 4);

        store.delete(&ids[1]);
        store.delete(&ids[3]);
        assert_eq!(store.list().len(), 2);
        assert!(store.list().iter().all(|o| o.id != ids[1] && o.id != ids[3]));
    }
}
