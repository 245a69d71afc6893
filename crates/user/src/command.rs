use plateful_db::table::User as UserTable;
use sea_query::{Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use time::OffsetDateTime;
use ulid::Ulid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::password::{hash_password, verify_password};
use crate::query::{get_user_by_email, get_user_by_username};
use crate::types::User;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(
        email(message = "email must be a valid address"),
        length(max = 320, message = "email must be at most 320 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, max = 150, message = "username must be 1-150 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "first_name must be at most 150 characters"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "last_name must be at most 150 characters"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128, message = "password must be 8-128 characters"))]
    pub password: String,
}

/// Create a new account. Email and username are unique; the password is
/// stored as an Argon2id hash, never in clear.
pub async fn register(pool: &sqlx::SqlitePool, input: RegisterInput) -> UserResult<User> {
    input
        .validate()
        .map_err(|e| UserError::ValidationError(e.to_string()))?;

    if get_user_by_email(pool, &input.email).await?.is_some() {
        return Err(UserError::EmailTaken);
    }

    if get_user_by_username(pool, &input.username).await?.is_some() {
        return Err(UserError::UsernameTaken);
    }

    let user = User {
        id: Ulid::new().to_string(),
        email: input.email,
        username: input.username,
        first_name: input.first_name,
        last_name: input.last_name,
        password_hash: hash_password(&input.password)?,
        created_at: OffsetDateTime::now_utc().unix_timestamp(),
    };

    let statement = Query::insert()
        .into_table(UserTable::Table)
        .columns([
            UserTable::Id,
            UserTable::Email,
            UserTable::Username,
            UserTable::FirstName,
            UserTable::LastName,
            UserTable::PasswordHash,
            UserTable::CreatedAt,
        ])
        .values_panic([
            user.id.clone().into(),
            user.email.clone().into(),
            user.username.clone().into(),
            user.first_name.clone().into(),
            user.last_name.clone().into(),
            user.password_hash.clone().into(),
            user.created_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    tracing::info!(user_id = %user.id, "registered new user");

    Ok(user)
}

/// Check credentials and return the matching user.
///
/// A missing account and a wrong password are indistinguishable to the
/// caller so the response does not leak which emails are registered.
pub async fn login(pool: &sqlx::SqlitePool, email: &str, password: &str) -> UserResult<User> {
    let Some(user) = get_user_by_email(pool, email).await? else {
        return Err(UserError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(UserError::InvalidCredentials);
    }

    Ok(user)
}
