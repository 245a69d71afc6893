use plateful_db::table::{
    CartEntry, Favorite, Ingredient as IngredientTable, Recipe as RecipeTable, RecipeIngredient,
    RecipeTag, Tag as TagTable,
};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::error::{RecipeError, RecipeResult};
use crate::types::{Ingredient, IngredientLine, Recipe, Tag};

const RECIPE_COLUMNS: [RecipeTable; 7] = [
    RecipeTable::Id,
    RecipeTable::AuthorId,
    RecipeTable::Name,
    RecipeTable::Text,
    RecipeTable::Image,
    RecipeTable::CookingTime,
    RecipeTable::CreatedAt,
];

/// Optional filters for the recipe listing, combinable.
///
/// `is_favorited` and `is_in_shopping_cart` are genuine booleans: `false`
/// means "do not filter", and both are ignored when no viewer is given.
#[derive(Debug, Default)]
pub struct RecipeFilters {
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// List recipes, newest first. `viewer` scopes the per-user filters.
pub async fn query_recipes(
    pool: &sqlx::SqlitePool,
    filters: RecipeFilters,
    viewer: Option<&str>,
) -> RecipeResult<Vec<Recipe>> {
    let mut statement = Query::select()
        .columns(RECIPE_COLUMNS)
        .from(RecipeTable::Table)
        .order_by(RecipeTable::CreatedAt, Order::Desc)
        .to_owned();

    if !filters.tags.is_empty() {
        let tagged = Query::select()
            .column((RecipeTag::Table, RecipeTag::RecipeId))
            .from(RecipeTag::Table)
            .inner_join(
                TagTable::Table,
                Expr::col((TagTable::Table, TagTable::Id))
                    .equals((RecipeTag::Table, RecipeTag::TagId)),
            )
            .and_where(Expr::col((TagTable::Table, TagTable::Slug)).is_in(filters.tags))
            .to_owned();

        statement.and_where(Expr::col(RecipeTable::Id).in_subquery(tagged));
    }

    if let Some(author) = filters.author {
        statement.and_where(Expr::col(RecipeTable::AuthorId).eq(author));
    }

    if let Some(viewer) = viewer {
        if filters.is_favorited {
            let favorited = Query::select()
                .column(Favorite::RecipeId)
                .from(Favorite::Table)
                .and_where(Expr::col(Favorite::UserId).eq(viewer))
                .to_owned();

            statement.and_where(Expr::col(RecipeTable::Id).in_subquery(favorited));
        }

        if filters.is_in_shopping_cart {
            let in_cart = Query::select()
                .column(CartEntry::RecipeId)
                .from(CartEntry::Table)
                .and_where(Expr::col(CartEntry::UserId).eq(viewer))
                .to_owned();

            statement.and_where(Expr::col(RecipeTable::Id).in_subquery(in_cart));
        }
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, Recipe, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn query_recipe_by_id(pool: &sqlx::SqlitePool, id: &str) -> RecipeResult<Recipe> {
    let statement = Query::select()
        .columns(RECIPE_COLUMNS)
        .from(RecipeTable::Table)
        .and_where(Expr::col(RecipeTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    sqlx::query_as_with::<_, Recipe, _>(&sql, values)
        .fetch_optional(pool)
        .await?
        .ok_or(RecipeError::NotFound)
}

pub async fn query_recipes_by_author(
    pool: &sqlx::SqlitePool,
    author_id: &str,
    limit: Option<u64>,
) -> RecipeResult<Vec<Recipe>> {
    let mut statement = Query::select()
        .columns(RECIPE_COLUMNS)
        .from(RecipeTable::Table)
        .and_where(Expr::col(RecipeTable::AuthorId).eq(author_id))
        .order_by(RecipeTable::CreatedAt, Order::Desc)
        .to_owned();

    if let Some(limit) = limit {
        statement.limit(limit);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, Recipe, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn count_recipes_by_author(pool: &sqlx::SqlitePool, author_id: &str) -> RecipeResult<i64> {
    let statement = Query::select()
        .expr(Func::count(Expr::col(RecipeTable::Id)))
        .from(RecipeTable::Table)
        .and_where(Expr::col(RecipeTable::AuthorId).eq(author_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_scalar_with::<_, i64, _>(&sql, values)
        .fetch_one(pool)
        .await?)
}

/// Ingredient lines of a recipe in insertion order.
pub async fn query_ingredient_lines(
    pool: &sqlx::SqlitePool,
    recipe_id: &str,
) -> RecipeResult<Vec<IngredientLine>> {
    let statement = Query::select()
        .columns([
            (IngredientTable::Table, IngredientTable::Id),
            (IngredientTable::Table, IngredientTable::Name),
            (IngredientTable::Table, IngredientTable::MeasurementUnit),
        ])
        .column((RecipeIngredient::Table, RecipeIngredient::Amount))
        .from(RecipeIngredient::Table)
        .inner_join(
            IngredientTable::Table,
            Expr::col((IngredientTable::Table, IngredientTable::Id))
                .equals((RecipeIngredient::Table, RecipeIngredient::IngredientId)),
        )
        .and_where(Expr::col((RecipeIngredient::Table, RecipeIngredient::RecipeId)).eq(recipe_id))
        .order_by_expr(Expr::cust("\"recipe_ingredient\".\"rowid\""), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, IngredientLine, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn query_recipe_tags(pool: &sqlx::SqlitePool, recipe_id: &str) -> RecipeResult<Vec<Tag>> {
    let statement = Query::select()
        .columns([
            (TagTable::Table, TagTable::Id),
            (TagTable::Table, TagTable::Name),
            (TagTable::Table, TagTable::Color),
            (TagTable::Table, TagTable::Slug),
        ])
        .from(RecipeTag::Table)
        .inner_join(
            TagTable::Table,
            Expr::col((TagTable::Table, TagTable::Id)).equals((RecipeTag::Table, RecipeTag::TagId)),
        )
        .and_where(Expr::col((RecipeTag::Table, RecipeTag::RecipeId)).eq(recipe_id))
        .order_by((TagTable::Table, TagTable::Name), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, Tag, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn query_tags(pool: &sqlx::SqlitePool) -> RecipeResult<Vec<Tag>> {
    let statement = Query::select()
        .columns([TagTable::Id, TagTable::Name, TagTable::Color, TagTable::Slug])
        .from(TagTable::Table)
        .order_by(TagTable::Name, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, Tag, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn query_tag_by_id(pool: &sqlx::SqlitePool, id: &str) -> RecipeResult<Tag> {
    let statement = Query::select()
        .columns([TagTable::Id, TagTable::Name, TagTable::Color, TagTable::Slug])
        .from(TagTable::Table)
        .and_where(Expr::col(TagTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    sqlx::query_as_with::<_, Tag, _>(&sql, values)
        .fetch_optional(pool)
        .await?
        .ok_or(RecipeError::TagNotFound)
}

/// Ingredient catalog, optionally narrowed to a name prefix (the search box
/// on the recipe form). SQLite LIKE, so the prefix match is ASCII
/// case-insensitive.
pub async fn query_ingredients(
    pool: &sqlx::SqlitePool,
    name_prefix: Option<&str>,
) -> RecipeResult<Vec<Ingredient>> {
    let mut statement = Query::select()
        .columns([
            IngredientTable::Id,
            IngredientTable::Name,
            IngredientTable::MeasurementUnit,
        ])
        .from(IngredientTable::Table)
        .order_by(IngredientTable::Name, Order::Asc)
        .to_owned();

    if let Some(prefix) = name_prefix {
        statement.and_where(Expr::col(IngredientTable::Name).like(format!("{prefix}%")));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, Ingredient, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub async fn query_ingredient_by_id(pool: &sqlx::SqlitePool, id: &str) -> RecipeResult<Ingredient> {
    let statement = Query::select()
        .columns([
            IngredientTable::Id,
            IngredientTable::Name,
            IngredientTable::MeasurementUnit,
        ])
        .from(IngredientTable::Table)
        .and_where(Expr::col(IngredientTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    sqlx::query_as_with::<_, Ingredient, _>(&sql, values)
        .fetch_optional(pool)
        .await?
        .ok_or(RecipeError::IngredientNotFound)
}

pub(crate) async fn ingredient_exists(pool: &sqlx::SqlitePool, id: &str) -> RecipeResult<bool> {
    let statement = Query::select()
        .column(IngredientTable::Id)
        .from(IngredientTable::Table)
        .and_where(Expr::col(IngredientTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}

pub(crate) async fn tag_exists(pool: &sqlx::SqlitePool, id: &str) -> RecipeResult<bool> {
    let statement = Query::select()
        .column(TagTable::Id)
        .from(TagTable::Table)
        .and_where(Expr::col(TagTable::Id).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_with(&sql, values)
        .fetch_optional(pool)
        .await?
        .is_some())
}
