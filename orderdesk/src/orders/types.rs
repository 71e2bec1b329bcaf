use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub name: String,
}

/// Payload for creating an order. `name` is the only required field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub name: String,
}

/// Payload for a partial update. Supplied fields overwrite, absent fields
/// are retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrder {
    #[serde(default)]
    pub name: Option<String>,
}

/// Acknowledgment returned by delete, regardless of whether anything was
/// actually removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Generate an order id from the current wall clock in milliseconds.
///
/// Two creates within the same clock tick collide. The filter semantics of
/// delete tolerate the resulting duplicate ids.
pub fn next_order_id() -> String {
    Utc::now().timestamp_millis().to_string()
}
