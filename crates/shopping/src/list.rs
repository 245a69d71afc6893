use plateful_db::table::{CartEntry, Ingredient, RecipeIngredient, User};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::aggregation::{AggregatedLine, CartLine, aggregate};
use crate::error::{ShoppingError, ShoppingResult};

/// Every (name, unit, amount) triple attached to the recipes in the user's
/// cart, one row per ingredient line, unmerged. A single join query; the
/// grouping happens in [`aggregate`] so the output order never depends on
/// how the store iterates.
async fn fetch_cart_lines(pool: &sqlx::SqlitePool, user_id: &str) -> ShoppingResult<Vec<CartLine>> {
    let statement = Query::select()
        .columns([
            (Ingredient::Table, Ingredient::Name),
            (Ingredient::Table, Ingredient::MeasurementUnit),
        ])
        .column((RecipeIngredient::Table, RecipeIngredient::Amount))
        .from(RecipeIngredient::Table)
        .inner_join(
            Ingredient::Table,
            Expr::col((Ingredient::Table, Ingredient::Id))
                .equals((RecipeIngredient::Table, RecipeIngredient::IngredientId)),
        )
        .inner_join(
            CartEntry::Table,
            Expr::col((CartEntry::Table, CartEntry::RecipeId))
                .equals((RecipeIngredient::Table, RecipeIngredient::RecipeId)),
        )
        .and_where(Expr::col((CartEntry::Table, CartEntry::UserId)).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, CartLine, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

/// Compute the user's aggregated shopping list.
///
/// Read-only and recomputed from scratch on every call; an empty cart is a
/// successful empty result, not an error. Store failures propagate
/// unretried - the caller decides how to surface them.
pub async fn compute_shopping_list(
    pool: &sqlx::SqlitePool,
    user_id: &str,
) -> ShoppingResult<Vec<AggregatedLine>> {
    if !user_exists(pool, user_id).await? {
        return Err(ShoppingError::UserNotFound);
    }

    let lines = fetch_cart_lines(pool, user_id).await?;

    Ok(aggregate(lines))
}

async fn user_exists(pool: &sqlx::SqlitePool, user_id: &str) -> ShoppingResult<bool> {
    let statement = Query::select()
        .column(User::Id)
        .from(User::Table)
        .and_where(Expr::col(User::Id).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}
