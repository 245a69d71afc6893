use plateful_db::table::{CartEntry, Recipe as RecipeTable};
use sea_query::{Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;
use ulid::Ulid;

use crate::error::{ShoppingError, ShoppingResult};

/// Put a recipe into the user's shopping cart. Each recipe can be in a cart
/// at most once.
pub async fn add_recipe_to_cart(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> ShoppingResult<()> {
    if !recipe_exists(pool, recipe_id).await? {
        return Err(ShoppingError::RecipeNotFound);
    }

    if in_cart(pool, user_id, recipe_id).await? {
        return Err(ShoppingError::AlreadyInCart);
    }

    let statement = Query::insert()
        .into_table(CartEntry::Table)
        .columns([
            CartEntry::Id,
            CartEntry::UserId,
            CartEntry::RecipeId,
            CartEntry::CreatedAt,
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

pub async fn remove_recipe_from_cart(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> ShoppingResult<()> {
    let statement = Query::delete()
        .from_table(CartEntry::Table)
        .and_where(Expr::col(CartEntry::UserId).eq(user_id))
        .and_where(Expr::col(CartEntry::RecipeId).eq(recipe_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(ShoppingError::NotInCart);
    }

    Ok(())
}

pub async fn in_cart(
    pool: &sqlx::SqlitePool,
    user_id: &str,
    recipe_id: &str,
) -> ShoppingResult<bool> {
    let statement = Query::select()
        .column(CartEntry::Id)
        .from(CartEntry::Table)
        .and_where(Expr::col(CartEntry::UserId).eq(user_id))
        .and_where(Expr::col(CartEntry::RecipeId).eq(recipe_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}

pub async fn list_cart_recipe_ids(
    pool: &sqlx::SqlitePool,
    user_id: &str,
) -> ShoppingResult<Vec<String>> {
    let statement = Query::select()
        .column(CartEntry::RecipeId)
        .from(CartEntry::Table)
        .and_where(Expr::col(CartEntry::UserId).eq(user_id))
        .order_by(CartEntry::CreatedAt, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_scalar_with::<_, String, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

async fn recipe_exists(pool: &sqlx::SqlitePool, recipe_id: &str) -> ShoppingResult<bool> {
    let statement = Query::select()
        .column(RecipeTable::Id)
        .from(RecipeTable::Table)
        .and_where(Expr::col(RecipeTable::Id).eq(recipe_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}
