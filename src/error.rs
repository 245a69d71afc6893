use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plateful_recipe::RecipeError;
use plateful_shopping::ShoppingError;
use plateful_user::UserError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    UserError(#[from] UserError),

    #[error(transparent)]
    RecipeError(#[from] RecipeError),

    #[error(transparent)]
    ShoppingError(#[from] ShoppingError),

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("Internal server error")]
    InternalError(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

/// Errors render as `{"errors": "<message>"}` with a protocol-appropriate
/// status code; everything 5xx is logged here and masked for the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            AppError::UserError(ref err) => match err {
                UserError::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
                UserError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
                UserError::EmailTaken | UserError::UsernameTaken | UserError::AlreadySubscribed => {
                    (StatusCode::CONFLICT, self.to_string())
                }
                UserError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
                UserError::CannotSubscribeToSelf | UserError::NotSubscribed => {
                    (StatusCode::BAD_REQUEST, self.to_string())
                }
                UserError::HashingError(e) | UserError::TokenError(e) => {
                    tracing::error!("User subsystem error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected error occurred. Please try again later.".to_string(),
                    )
                }
                UserError::DatabaseError(e) => {
                    tracing::error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected error occurred. Please try again later.".to_string(),
                    )
                }
            },
            AppError::RecipeError(ref err) => match err {
                RecipeError::ValidationError(_)
                | RecipeError::TagNotFound
                | RecipeError::IngredientNotFound => {
                    (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
                }
                RecipeError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
                RecipeError::PermissionDenied => (StatusCode::FORBIDDEN, self.to_string()),
                RecipeError::AlreadyFavorited => (StatusCode::CONFLICT, self.to_string()),
                RecipeError::NotFavorited => (StatusCode::BAD_REQUEST, self.to_string()),
                RecipeError::DatabaseError(e) => {
                    tracing::error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected error occurred. Please try again later.".to_string(),
                    )
                }
            },
            AppError::ShoppingError(ref err) => match err {
                ShoppingError::UserNotFound | ShoppingError::RecipeNotFound => {
                    (StatusCode::NOT_FOUND, self.to_string())
                }
                ShoppingError::AlreadyInCart => (StatusCode::CONFLICT, self.to_string()),
                ShoppingError::NotInCart => (StatusCode::BAD_REQUEST, self.to_string()),
                ShoppingError::DatabaseError(e) => {
                    tracing::error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An unexpected error occurred. Please try again later.".to_string(),
                    )
                }
            },
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred. Please try again later.".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred. Please try again later.".to_string(),
                )
            }
        };

        (status_code, Json(json!({ "errors": message }))).into_response()
    }
}
