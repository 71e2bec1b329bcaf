//! HTTP endpoint layer for the order service.
//!
//! Translates the five request shapes 1:1 onto [`OrderStore`] calls and
//! publishes a `Created` notification after a successful creation. Missing
//! ids serialize as `null` with status 200 rather than an error.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::info;

use crate::orders::{CreateOrder, Deleted, Order, OrderEvent, OrderEvents, OrderStore, UpdateOrder};

#[derive(Debug, Clone)]
pub struct OrderGatewayConfig {
    pub bind_addr: String,
}

impl Default for OrderGatewayConfig {
    fn default() -> Self {
        Self { bind_addr: "127.0.0.1:3000".to_string() }
    }
}

/// Shared gateway state. The store assumes one logical operation in flight
/// at a time; the mutex exists only because the runtime is multithreaded.
pub struct AppState {
    store: Mutex<OrderStore>,
    events: OrderEvents,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(OrderStore::new()),
            events: OrderEvents::default(),
        }
    }

    pub fn events(&self) -> &OrderEvents {
        &self.events
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the order router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .with_state(state)
}

/// Serve the order router on an already-bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

/// Bind and serve until the process terminates.
pub async fn start(config: OrderGatewayConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState::new());
    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    info!("order gateway listening on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, StatusCode> {
    let store = state
        .store
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(store.list()))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Order>>, StatusCode> {
    let store = state
        .store
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(store.get(&id)))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrder>,
) -> Result<Json<Order>, StatusCode> {
    let order = {
        let mut store = state
            .store
            .lock()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        store.create(payload)
    };
    // Notify async consumers; the response does not wait on them.
    state.events.publish(OrderEvent::Created(order.clone()));
    Ok(Json(order))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrder>,
) -> Result<Json<Option<Order>>, StatusCode> {
    let mut store = state
        .store
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(store.update(&id, payload)))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, StatusCode> {
    let mut store = state
        .store
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(store.delete(&id)))
}
