use plateful_db::table::User as UserTable;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::error::{UserError, UserResult};
use crate::types::User;

pub(crate) const USER_COLUMNS: [UserTable; 7] = [
    UserTable::Id,
    UserTable::Email,
    UserTable::Username,
    UserTable::FirstName,
    UserTable::LastName,
    UserTable::PasswordHash,
    UserTable::CreatedAt,
];

pub async fn get_user_by_id(pool: &sqlx::SqlitePool, id: &str) -> UserResult<User> {
    let statement = Query::select()
        .columns(USER_COLUMNS)
        .from(UserTable::Table)
        .and_where(Expr::col(UserTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    sqlx::query_as_with::<_, User, _>(&sql, values)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)
}

pub async fn get_user_by_email(pool: &sqlx::SqlitePool, email: &str) -> UserResult<Option<User>> {
    let statement = Query::select()
        .columns(USER_COLUMNS)
        .from(UserTable::Table)
        .and_where(Expr::col(UserTable::Email).eq(email))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, User, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub async fn get_user_by_username(
    pool: &sqlx::SqlitePool,
    username: &str,
) -> UserResult<Option<User>> {
    let statement = Query::select()
        .columns(USER_COLUMNS)
        .from(UserTable::Table)
        .and_where(Expr::col(UserTable::Username).eq(username))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, User, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub async fn user_exists(pool: &sqlx::SqlitePool, id: &str) -> UserResult<bool> {
    let statement = Query::select()
        .column(UserTable::Id)
        .from(UserTable::Table)
        .and_where(Expr::col(UserTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}
