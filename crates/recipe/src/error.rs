use thiserror::Error;

pub type RecipeResult<T> = Result<T, RecipeError>;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Recipe not found")]
    NotFound,

    #[error("Tag not found")]
    TagNotFound,

    #[error("Ingredient not found")]
    IngredientNotFound,

    #[error("Permission denied - you are not the author of this recipe")]
    PermissionDenied,

    #[error("Recipe is already in favorites")]
    AlreadyFavorited,

    #[error("Recipe is not in favorites")]
    NotFavorited,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
