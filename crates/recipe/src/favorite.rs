use plateful_db::table::Favorite;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;
use ulid::Ulid;

use crate::error::{RecipeError, RecipeResult};
use crate::query::query_recipe_by_id;

pub async fn add_favorite(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> RecipeResult<()> {
    // Surfaces NotFound before the duplicate check
    query_recipe_by_id(pool, recipe_id).await?;

    if is_favorited(pool, user_id, recipe_id).await? {
        return Err(RecipeError::AlreadyFavorited);
    }

    let statement = Query::insert()
        .into_table(Favorite::Table)
        .columns([
            Favorite::Id,
            Favorite::UserId,
            Favorite::RecipeId,
            Favorite::CreatedAt,
        ])
        .values_panic([
            Ulid::new().to_string().into(),
            user_id.into(),
            recipe_id.into(),
            OffsetDateTime::now_utc().unix_timestamp().into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub async fn remove_favorite(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> RecipeResult<()> {
    let statement = Query::delete()
        .from_table(Favorite::Table)
        .and_where(Expr::col(Favorite::UserId).eq(user_id))
        .and_where(Expr::col(Favorite::RecipeId).eq(recipe_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(RecipeError::NotFavorited);
    }

    Ok(())
}

pub async fn is_favorited(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> RecipeResult<bool> {
    let statement = Query::select()
        .column(Favorite::Id)
        .from(Favorite::Table)
        .and_where(Expr::col(Favorite::UserId).eq(user_id))
        .and_where(Expr::col(Favorite::RecipeId).eq(recipe_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}
