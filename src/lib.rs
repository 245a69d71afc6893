pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod routes;

pub use config::Config;
pub use routes::AppState;

/// Create the app router for testing
///
/// Builds the Axum router with all routes configured, useful for
/// integration testing without starting the full server.
pub fn create_app(pool: sqlx::SqlitePool, config: Config) -> axum::Router {
    routes::router(AppState { config, pool })
}
