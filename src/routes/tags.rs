use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use plateful_recipe::{query_tag_by_id, query_tags};

use crate::error::AppError;
use crate::routes::AppState;

/// GET /api/tags - Full tag list, name-ordered
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let tags = query_tags(&state.pool).await?;

    Ok(Json(tags))
}

/// GET /api/tags/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tag = query_tag_by_id(&state.pool, &id).await?;

    Ok(Json(tag))
}
