//! HTTP API server with observability for the order-fulfillment backend.
//!
//! Every mutation goes through the shared [`HookedStore`], so the status
//! and availability hooks run for API writes exactly as for any other
//! writer. Structured logging uses `tracing`, metrics are exported for
//! Prometheus.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};
use fulfillment::{Settings, register_hooks};
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::{HookedStore, RecordStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RecordStore> {
    pub store: HookedStore<S>,
}

/// Wraps `records` in a dispatcher with the fulfillment hooks registered.
pub fn create_state<S: RecordStore + 'static>(records: S, settings: Settings) -> Arc<AppState<S>> {
    let mut store = HookedStore::new(records);
    register_hooks(&mut store, settings);
    Arc::new(AppState { store })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RecordStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/orders", post(routes::orders::create::<S>))
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).patch(routes::orders::update_status::<S>),
        )
        .route(
            "/order-items/{id}",
            get(routes::order_items::get::<S>).patch(routes::order_items::update_status::<S>),
        )
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route("/products/{id}", patch(routes::products::update::<S>))
        .route(
            "/payment-options",
            get(routes::payments::list_options::<S>).post(routes::payments::create_option::<S>),
        )
        .route("/payments", post(routes::payments::create::<S>))
        .route("/events", get(routes::events::list::<S>))
        .route("/export-json", get(routes::export::download::<S>));

    Router::new()
        .route("/health", get(routes::health::check))
        .nest("/api", api)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
