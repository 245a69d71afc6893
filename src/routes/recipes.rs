use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::Query;
use plateful_recipe::{
    IngredientLine, Recipe, RecipeFilters, RecipeInput, Tag, create_recipe, delete_recipe,
    query_ingredient_lines, query_recipe_by_id, query_recipe_tags, query_recipes, update_recipe,
};
use plateful_shopping::{
    add_recipe_to_cart, compute_shopping_list, remove_recipe_from_cart, render,
};
use plateful_user::get_user_by_id;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::{Auth, MaybeAuth};
use crate::routes::AppState;
use crate::routes::users::{UserPayload, build_user_payload};

#[derive(Debug, Serialize)]
pub struct RecipePayload {
    pub id: String,
    pub tags: Vec<Tag>,
    pub author: UserPayload,
    pub ingredients: Vec<IngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i64,
}

/// Abbreviated recipe shape used by favorites, cart responses and the
/// subscription listing.
#[derive(Debug, Serialize)]
pub struct RecipeShortPayload {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i64,
}

impl RecipeShortPayload {
    pub(crate) fn new(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Assemble the full recipe representation as seen by an optional viewer.
async fn build_recipe_payload(
    pool: &sqlx::SqlitePool,
    viewer: Option<&str>,
    recipe: &Recipe,
) -> Result<RecipePayload, AppError> {
    let author = get_user_by_id(pool, &recipe.author_id).await?;
    let author = build_user_payload(pool, viewer, &author).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            plateful_recipe::is_favorited(pool, viewer, &recipe.id).await?,
            plateful_shopping::in_cart(pool, viewer, &recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipePayload {
        id: recipe.id.clone(),
        tags: query_recipe_tags(pool, &recipe.id).await?,
        author,
        ingredients: query_ingredient_lines(pool, &recipe.id).await?,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
    })
}

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    /// Tag slugs, repeatable: ?tags=breakfast&tags=dinner
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub is_in_shopping_cart: bool,
}

/// GET /api/recipes - Filtered listing, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Query(query): Query<RecipeListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = maybe_auth.0.as_ref().map(|a| a.user_id.as_str());

    let filters = RecipeFilters {
        tags: query.tags,
        author: query.author,
        is_favorited: query.is_favorited,
        is_in_shopping_cart: query.is_in_shopping_cart,
    };

    let recipes = query_recipes(&state.pool, filters, viewer).await?;

    let mut payloads = Vec::with_capacity(recipes.len());
    for recipe in &recipes {
        payloads.push(build_recipe_payload(&state.pool, viewer, recipe).await?);
    }

    Ok(Json(payloads))
}

/// GET /api/recipes/{id}
pub async fn detail(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let viewer = maybe_auth.0.as_ref().map(|a| a.user_id.as_str());
    let recipe = query_recipe_by_id(&state.pool, &id).await?;

    Ok(Json(build_recipe_payload(&state.pool, viewer, &recipe).await?))
}

/// POST /api/recipes
pub async fn create(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Json(input): Json<RecipeInput>,
) -> Result<impl IntoResponse, AppError> {
    let auth = maybe_auth.0.ok_or(AppError::Unauthorized)?;

    let recipe = create_recipe(&state.pool, &auth.user_id, input).await?;
    let payload = build_recipe_payload(&state.pool, Some(&auth.user_id), &recipe).await?;

    Ok((StatusCode::CREATED, Json(payload)))
}

/// PATCH /api/recipes/{id} - Author only
pub async fn update(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> Result<impl IntoResponse, AppError> {
    let auth = maybe_auth.0.ok_or(AppError::Unauthorized)?;

    let recipe = update_recipe(&state.pool, &auth.user_id, &id, input).await?;
    let payload = build_recipe_payload(&state.pool, Some(&auth.user_id), &recipe).await?;

    Ok(Json(payload))
}

/// DELETE /api/recipes/{id} - Author only
pub async fn delete(
    State(state): State<AppState>,
    Extension(maybe_auth): Extension<MaybeAuth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let auth = maybe_auth.0.ok_or(AppError::Unauthorized)?;

    delete_recipe(&state.pool, &auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite
pub async fn favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    plateful_recipe::add_favorite(&state.pool, &auth.user_id, &id).await?;

    let recipe = query_recipe_by_id(&state.pool, &id).await?;

    Ok((StatusCode::CREATED, Json(RecipeShortPayload::new(&recipe))))
}

/// DELETE /api/recipes/{id}/favorite
pub async fn unfavorite(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    plateful_recipe::remove_favorite(&state.pool, &auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/shopping_cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    add_recipe_to_cart(&state.pool, &auth.user_id, &id).await?;

    let recipe = query_recipe_by_id(&state.pool, &id).await?;

    Ok((StatusCode::CREATED, Json(RecipeShortPayload::new(&recipe))))
}

/// DELETE /api/recipes/{id}/shopping_cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    remove_recipe_from_cart(&state.pool, &auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/recipes/download_shopping_cart - Plain-text export
///
/// The body is the aggregated list, one `"{name} {unit} - {total}"` row per
/// distinct (name, unit) pair; an empty cart downloads an empty file.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<Auth>,
) -> Result<impl IntoResponse, AppError> {
    let lines = compute_shopping_list(&state.pool, &auth.user_id).await?;
    let body = render(&lines);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=shopping_list",
            ),
        ],
        body,
    ))
}
