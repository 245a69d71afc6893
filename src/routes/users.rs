use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use plateful_recipe::{count_recipes_by_author, query_recipes_by_author};
use plateful_user::{RegisterInput, User, generate_jwt, get_user_by_id};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::{Auth, MaybeAuth};
use crate::routes::AppState;
use crate::routes::recipes::RecipeShortPayload;

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub email: String,
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserPayload {
    fn new(user: &User, is_subscribed: bool) -> Self {
        Self {
            email: user.email.clone(),
            id: user.id.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// Build the user payload as seen by an optional viewer.
pub(crate) async fn build_user_payload(
    pool: &sqlx::SqlitePool,
    viewer: Option<&str>,
    user: &User,
) -> Result<UserPayload, AppError> {
    let is_subscribed = match viewer {
        Some(viewer) => plateful_user::is_subscribed(pool, viewer, &user.id).await?,
        None => false,
    };

    Ok(UserPayload::new(user, is_subscribed))
}

#[derive(Debug, Serialize)]
pub struct SubscriptionPayload {
    pub email: String,
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortPayload>,
    pub recipes_count: i64,
}

async fn build_subscription_payload(
    pool: &sqlx::SqlitePool,
    author: &User,
    recipes_limit: Option<u64>,
) -> Result<SubscriptionPayload, AppError> {
    let recipes = query_recipes_by_author(pool, &author.id, recipes_limit).await?;
    let recipes_count = count_recipes_by_author(pool, &author.id).await?;

    Ok(SubscriptionPayload {
        email: author.email.clone(),
        id: author.id.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: true,
        recipes: recipes.iter().map(RecipeShortPayload::new).collect(),
        recipes_count,
    })
}

/// POST /api/users - Create an account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse, AppError> {
    let user = plateful_user::register(&state.pool, input).await?;

    Ok((StatusCode::CREATED, Json(UserPayload::new(&user, false))))
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/token/login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, AppError> {
    let user = plateful_user::login(&state.pool, &input.email, &input.password).await?;

    let token = generate_jwt(
        user.id,
        user.email,
        &state.config.jwt.secret,
        state.config.jwt.expiration_days,
    )?;

    Ok(Json(json!({ "auth_token": token })))
}

/// GET /api/users/me - Profile of the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> Result<impl IntoResponse, AppError> {
    let user = get_user_by_id(&state.pool, &auth.user_id).await?;

    Ok(Json(UserPayload::new(&user, false)))
}

/// GET /api/users/{id} - Public profile, is_subscribed relative to the viewer
pub async fn detail(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = get_user_by_id(&state.pool, &id).await?;
    let viewer = maybe_auth.0.as_ref().map(|a| a.user_id.as_str());

    Ok(Json(build_user_payload(&state.pool, viewer, &user).await?))
}

/// POST /api/users/{id}/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    plateful_user::subscribe(&state.pool, &auth.user_id, &id).await?;

    let author = get_user_by_id(&state.pool, &id).await?;
    let payload = build_subscription_payload(&state.pool, &author, None).await?;

    Ok((StatusCode::CREATED, Json(payload)))
}

/// DELETE /api/users/{id}/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    plateful_user::unsubscribe(&state.pool, &auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionsQuery {
    /// Cap on how many of each author's recipes are embedded
    pub recipes_limit: Option<u64>,
}

/// GET /api/users/subscriptions - Authors the user follows, with their recipes
pub async fn subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let authors = plateful_user::list_subscribed_authors(&state.pool, &auth.user_id).await?;

    let mut payloads = Vec::with_capacity(authors.len());
    for author in &authors {
        payloads.push(build_subscription_payload(&state.pool, author, query.recipes_limit).await?);
    }

    Ok(Json(payloads))
}
