use sqlx::prelude::FromRow;

/// A registered account row. `password_hash` never leaves this crate's
/// login/registration paths; response payloads are built field by field at the
/// HTTP boundary.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: i64,
}
