//! Todo REST service.
//!
//! # Overview
//! - `store` defines the [`TodoStore`] persistence contract and its Redis,
//!   relational and in-memory backends.
//! - `handlers` maps the `/todos` routes onto store calls.
//! - `config` resolves which backend to run and where to listen.
//!
//! The router only ever sees an `Arc<dyn TodoStore>`; the backend is chosen
//! once at startup.

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use todo_core::IdCounter;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod store;

pub use config::Config;
pub use error::{ApiError, StoreError};
pub use store::TodoStore;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub ids: Arc<IdCounter>,
}

impl AppState {
    /// State with a fresh counter; the first generated id is 1.
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            ids: Arc::new(IdCounter::new()),
        }
    }

    /// Initialize `store` and seed the id counter from its highest id.
    ///
    /// Failures are logged, not returned: the server still starts and
    /// requests answer 503 until the backend comes up.
    pub async fn initialize(store: Arc<dyn TodoStore>) -> Self {
        let backend = store.backend_name();
        if let Err(error) = store.initialize().await {
            tracing::error!(%error, backend, "persistence service is not running");
        }

        let seed = match store.max_id().await {
            Ok(max) => max.unwrap_or(0),
            Err(error) => {
                tracing::warn!(%error, backend, "could not read highest id, counter starts at 0");
                0
            }
        };
        tracing::info!(backend, seed, "id counter seeded");

        Self {
            store,
            ids: Arc::new(IdCounter::starting_at(seed)),
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
        .allow_headers([
            HeaderName::from_static("x-requested-with"),
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(handlers::list_todos)
                .post(handlers::create_todo)
                .delete(handlers::delete_all),
        )
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
