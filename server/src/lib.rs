//! REST API for a single-table todo list backed by SQLite.
//!
//! # Overview
//! `store` owns the SQLite connection and schema, `repo` exposes CRUD over it
//! through the `TodoRepository` trait, and `api` maps those operations onto
//! HTTP. `app` wires a repository into a router with CORS and request tracing.

pub mod api;
pub mod config;
pub mod logging;
pub mod repo;
pub mod store;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use api::{ApiError, SharedRepository};
pub use repo::{RepoError, RepoResult, TodoRepository};
pub use store::{StoreError, TodoStore};

pub fn app(repo: SharedRepository) -> Router {
    api::router(repo)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn run(listener: TcpListener, repo: SharedRepository) -> Result<(), std::io::Error> {
    axum::serve(listener, app(repo)).await
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn run_until<F>(
    listener: TcpListener,
    repo: SharedRepository,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(repo))
        .with_graceful_shutdown(shutdown)
        .await
}
