use plateful_db::table::{Subscription, User as UserTable};
use sea_query::{Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;
use ulid::Ulid;

use crate::error::{UserError, UserResult};
use crate::query::user_exists;
use crate::types::User;

/// Subscribe `user_id` to the recipes of `author_id`.
pub async fn subscribe(pool: &sqlx::SqlitePool, user_id: &str, author_id: &str) -> UserResult<()> {
    if user_id == author_id {
        return Err(UserError::CannotSubscribeToSelf);
    }

    if !user_exists(pool, author_id).await? {
        return Err(UserError::NotFound);
    }

    if is_subscribed(pool, user_id, author_id).await? {
        return Err(UserError::AlreadySubscribed);
    }

    let statement = Query::insert()
        .into_table(Subscription::Table)
        .columns([
            Subscription::Id,
            Subscription::UserId,
            Subscription::AuthorId,
            Subscription::CreatedAt,
        ])
        .values_panic([
            Ulid::new().to_string().into(),
            user_id.into(),
            author_id.into(),
            OffsetDateTime::now_utc().unix_timestamp().into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub async fn unsubscribe(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    author_id: &str,
) -> UserResult<()> {
    let statement = Query::delete()
        .from_table(Subscription::Table)
        .and_where(Expr::col(Subscription::UserId).eq(user_id))
        .and_where(Expr::col(Subscription::AuthorId).eq(author_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotSubscribed);
    }

    Ok(())
}

pub async fn is_subscribed(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    author_id: &str,
) -> UserResult<bool> {
    let statement = Query::select()
        .column(Subscription::Id)
        .from(Subscription::Table)
        .and_where(Expr::col(Subscription::UserId).eq(user_id))
        .and_where(Expr::col(Subscription::AuthorId).eq(author_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}

/// Authors the user is subscribed to, oldest subscription first.
pub async fn list_subscribed_authors(
    pool: &sqlx::SqlitePool,
    user_id: &str,
) -> UserResult<Vec<User>> {
    let statement = Query::select()
        .columns(crate::query::USER_COLUMNS.map(|col| (UserTable::Table, col)))
        .from(Subscription::Table)
        .inner_join(
            UserTable::Table,
            Expr::col((UserTable::Table, UserTable::Id))
                .equals((Subscription::Table, Subscription::AuthorId)),
        )
        .and_where(Expr::col((Subscription::Table, Subscription::UserId)).eq(user_id))
        .order_by((Subscription::Table, Subscription::CreatedAt), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, User, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}
