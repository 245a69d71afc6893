use axum::{
    Json, Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::middleware::{auth_middleware, optional_auth_middleware};

pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub pool: SqlitePool,
}

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"errors": "Not found"})))
}

pub fn router(state: AppState) -> Router {
    // Fully protected routes: a missing or invalid token is a 401
    let protected = Router::new()
        .route("/api/users/me", get(users::me))
        .route("/api/users/subscriptions", get(users::subscriptions))
        .route(
            "/api/users/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route(
            "/api/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/favorite",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Readable without a token, but personalized (is_favorited,
    // is_in_shopping_cart, is_subscribed) when one is sent; the write
    // methods on these paths reject anonymous callers themselves
    let viewer_aware = Router::new()
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/recipes/{id}",
            get(recipes::detail)
                .patch(recipes::update)
                .delete(recipes::delete),
        )
        .route("/api/users/{id}", get(users::detail))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let public = Router::new()
        .route("/api/users", post(users::register))
        .route("/api/auth/token/login", post(users::login))
        .route("/api/tags", get(tags::list))
        .route("/api/tags/{id}", get(tags::detail))
        .route("/api/ingredients", get(ingredients::list))
        .route("/api/ingredients/{id}", get(ingredients::detail));

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone())
        .merge(
            Router::new()
                .merge(public)
                .merge(viewer_aware)
                .merge(protected)
                .fallback(fallback)
                .with_state(state),
        )
}
