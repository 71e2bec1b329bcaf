//! In-memory order records and the service that owns them.
//!
//! The store is the exclusive owner of the collection; the gateway layer
//! never mutates it directly. All operations are total: a missing id yields
//! an absent result, never an error.

pub mod events;
pub mod service;
pub mod types;

pub use events::{OrderEvent, OrderEvents};
pub use service::OrderStore;
pub use types::{CreateOrder, Deleted, Order, UpdateOrder};
