//! CRUD sequence against the order gateway over a real bound listener.

use std::sync::Arc;
use std::time::Duration;

use orderdesk::gateway::{self, AppState};
use orderdesk::orders::{Deleted, Order, OrderEvent};
use tokio::net::TcpListener;

async fn spawn_gateway() -> (String, Arc<AppState>) {
    let state = Arc::new(AppState::new());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let serve_state = state.clone();
    tokio::spawn(async move {
        let _ = gateway::serve(listener, serve_state).await;
    });

    (format!("http://{}", addr), state)
}

// Ids derive from the wall clock in milliseconds; give each create a
// fresh tick.
async fn next_tick() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

#[tokio::test]
async fn full_crud_sequence_over_http() {
    let (base, _state) = spawn_gateway().await;
    let client = reqwest::Client::new();

    // Empty to start.
    let listed: Vec<Order> = client
        .get(format!("{}/orders", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    // Create two orders.
    let a: Order = client
        .post(format!("{}/orders", base))
        .json(&serde_json::json!({"name": "A"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(a.name, "A");
    next_tick().await;

    let b: Order = client
        .post(format!("{}/orders", base))
        .json(&serde_json::json!({"name": "B"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(a.id, b.id);

    // List preserves insertion order.
    let listed: Vec<Order> = client
        .get(format!("{}/orders", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, vec![a.clone(), b.clone()]);

    // Get by id, then a miss serialized as null.
    let fetched: Option<Order> = client
        .get(format!("{}/orders/{}", base, a.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, Some(a.clone()));

    let response = client
        .get(format!("{}/orders/does-not-exist", base))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "null");

    // Patch overwrites name only.
    let updated: Option<Order> = client
        .patch(format!("{}/orders/{}", base, a.id))
        .json(&serde_json::json!({"name": "A2"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated, Some(Order { id: a.id.clone(), name: "A2".into() }));

    // Delete acknowledges unconditionally and removes the record.
    let ack: Deleted = client
        .delete(format!("{}/orders/{}", base, b.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack, Deleted { deleted: true });

    let ack: Deleted = client
        .delete(format!("{}/orders/never-existed", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack, Deleted { deleted: true });

    let listed: Vec<Order> = client
        .get(format!("{}/orders", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, vec![Order { id: a.id, name: "A2".into() }]);
}

#[tokio::test]
async fn creation_notifies_subscribers_without_blocking_the_response() {
    let (base, state) = spawn_gateway().await;
    let mut rx = state.events().subscribe();
    let client = reqwest::Client::new();

    let created: Order = client
        .post(format!("{}/orders", base))
        .json(&serde_json::json!({"name": "observed"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("event within a second")
        .expect("channel open");
    let OrderEvent::Created(order) = event;
    assert_eq!(order, created);
}
