use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use plateful_recipe::{query_ingredient_by_id, query_ingredients};
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct IngredientListQuery {
    /// Name prefix typed into the ingredient search box
    name: Option<String>,
}

/// GET /api/ingredients?name=prefix - Catalog listing with optional search
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IngredientListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let ingredients = query_ingredients(&state.pool, query.name.as_deref()).await?;

    Ok(Json(ingredients))
}

/// GET /api/ingredients/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ingredient = query_ingredient_by_id(&state.pool, &id).await?;

    Ok(Json(ingredient))
}
