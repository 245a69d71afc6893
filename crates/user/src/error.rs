use thiserror::Error;

pub type UserResult<T> = Result<T, UserError>;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("User not found")]
    NotFound,

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error("A user with this username already exists")]
    UsernameTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("You cannot subscribe to yourself")]
    CannotSubscribeToSelf,

    #[error("You are already subscribed to this user")]
    AlreadySubscribed,

    #[error("You are not subscribed to this user")]
    NotSubscribed,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}
