//! HTTP API server for the storefront.
//!
//! Exposes the catalog, per-user carts and checkout as JSON endpoints,
//! with structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use accounts::{AccountService, AccountStore, InMemoryAccountStore, PostgresAccountStore};
use axum::Router;
use axum::routing::{get, patch, post, put};
use cart::{CartService, CartStore, InMemoryCartStore, PostgresCartStore};
use catalog::{Catalog, InMemoryCatalog, PostgresCatalog};
use checkout::CheckoutService;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Schema migrations applied at start-up when a database is configured.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub accounts: AccountService,
}

impl AppState {
    /// Wires the services over the given stores.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        cart_store: Arc<dyn CartStore>,
        account_store: Arc<dyn AccountStore>,
    ) -> Self {
        let carts = CartService::new(catalog.clone(), cart_store);
        let checkout = CheckoutService::new(catalog.clone(), carts.clone());
        Self {
            catalog,
            carts,
            checkout,
            accounts: AccountService::new(account_store),
        }
    }

    /// State backed by in-memory stores. Nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCatalog::new()),
            Arc::new(InMemoryCartStore::new()),
            Arc::new(InMemoryAccountStore::new()),
        )
    }

    /// State backed by PostgreSQL. The schema must already be migrated.
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PostgresCatalog::new(pool.clone())),
            Arc::new(PostgresCartStore::new(pool.clone())),
            Arc::new(PostgresAccountStore::new(pool)),
        )
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // Accounts
        .route("/users/signup", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/logout", post(routes::users::logout))
        // Storefront
        .route("/products", get(routes::products::list))
        .route("/products/{id}", get(routes::products::get))
        // Staff
        .route(
            "/admin/products",
            get(routes::admin::list).post(routes::admin::create),
        )
        .route(
            "/admin/products/{id}",
            put(routes::admin::update).delete(routes::admin::delete),
        )
        .route("/admin/products/{id}/stock", post(routes::admin::adjust_stock))
        // Cart
        .route("/cart", get(routes::cart::view).delete(routes::cart::clear))
        .route("/cart/status", get(routes::cart::status))
        .route("/cart/items", post(routes::cart::add_item))
        .route(
            "/cart/items/{item_id}",
            patch(routes::cart::set_quantity).delete(routes::cart::remove_item),
        )
        .route("/cart/checkout", post(routes::cart::checkout))
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
