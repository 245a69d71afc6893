use thiserror::Error;

pub type ShoppingResult<T> = Result<T, ShoppingError>;

#[derive(Error, Debug)]
pub enum ShoppingError {
    #[error("User not found")]
    UserNotFound,

    #[error("Recipe not found")]
    RecipeNotFound,

    #[error("Recipe is already in the shopping cart")]
    AlreadyInCart,

    #[error("Recipe is not in the shopping cart")]
    NotInCart,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
