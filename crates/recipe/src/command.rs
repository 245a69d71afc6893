use std::collections::HashSet;

use plateful_db::table::{
    CartEntry, Favorite, Recipe as RecipeTable, RecipeIngredient, RecipeTag,
};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;
use ulid::Ulid;
use validator::Validate;

use crate::error::{RecipeError, RecipeResult};
use crate::query::{ingredient_exists, query_recipe_by_id, tag_exists};
use crate::types::{Recipe, RecipeInput};

async fn validate_input(pool: &sqlx::SqlitePool, input: &RecipeInput) -> RecipeResult<()> {
    input
        .validate()
        .map_err(|e| RecipeError::ValidationError(e.to_string()))?;

    if input.ingredients.is_empty() {
        return Err(RecipeError::ValidationError(
            "add at least one ingredient".to_string(),
        ));
    }

    let ingredient_ids: HashSet<&str> = input.ingredients.iter().map(|i| i.id.as_str()).collect();
    if ingredient_ids.len() != input.ingredients.len() {
        return Err(RecipeError::ValidationError(
            "ingredients must not repeat".to_string(),
        ));
    }

    if input.tags.is_empty() {
        return Err(RecipeError::ValidationError(
            "add at least one tag".to_string(),
        ));
    }

    let tag_ids: HashSet<&str> = input.tags.iter().map(|t| t.as_str()).collect();
    if tag_ids.len() != input.tags.len() {
        return Err(RecipeError::ValidationError(
            "tags must not repeat".to_string(),
        ));
    }

    for id in ingredient_ids {
        if !ingredient_exists(pool, id).await? {
            return Err(RecipeError::IngredientNotFound);
        }
    }

    for id in tag_ids {
        if !tag_exists(pool, id).await? {
            return Err(RecipeError::TagNotFound);
        }
    }

    Ok(())
}

async fn insert_associations(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: &str,
    input: &RecipeInput,
) -> RecipeResult<()> {
    for line in &input.ingredients {
        let statement = Query::insert()
            .into_table(RecipeIngredient::Table)
            .columns([
                RecipeIngredient::Id,
                RecipeIngredient::RecipeId,
                RecipeIngredient::IngredientId,
                RecipeIngredient::Amount,
            ])
            .values_panic([
                Ulid::new().to_string().into(),
                recipe_id.into(),
                line.id.clone().into(),
                line.amount.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut **tx).await?;
    }

    for tag_id in &input.tags {
        let statement = Query::insert()
            .into_table(RecipeTag::Table)
            .columns([RecipeTag::Id, RecipeTag::RecipeId, RecipeTag::TagId])
            .values_panic([
                Ulid::new().to_string().into(),
                recipe_id.into(),
                tag_id.clone().into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut **tx).await?;
    }

    Ok(())
}

async fn delete_associations(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: &str,
) -> RecipeResult<()> {
    for statement in [
        Query::delete()
            .from_table(RecipeIngredient::Table)
            .and_where(Expr::col(RecipeIngredient::RecipeId).eq(recipe_id))
            .to_owned(),
        Query::delete()
            .from_table(RecipeTag::Table)
            .and_where(Expr::col(RecipeTag::RecipeId).eq(recipe_id))
            .to_owned(),
    ] {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut **tx).await?;
    }

    Ok(())
}

/// Create a recipe with its ingredient lines and tags in one transaction.
pub async fn create_recipe(
    pool: &sqlx::SqlitePool,
    author_id: &str,
    input: RecipeInput,
) -> RecipeResult<Recipe> {
    validate_input(pool, &input).await?;

    let recipe = Recipe {
        id: Ulid::new().to_string(),
        author_id: author_id.to_string(),
        name: input.name.clone(),
        text: input.text.clone(),
        image: input.image.clone(),
        cooking_time: input.cooking_time,
        created_at: OffsetDateTime::now_utc().unix_timestamp(),
    };

    let mut tx = pool.begin().await?;

    let statement = Query::insert()
        .into_table(RecipeTable::Table)
        .columns([
            RecipeTable::Id,
            RecipeTable::AuthorId,
            RecipeTable::Name,
            RecipeTable::Text,
            RecipeTable::Image,
            RecipeTable::CookingTime,
            RecipeTable::CreatedAt,
        ])
        .values_panic([
            recipe.id.clone().into(),
            recipe.author_id.clone().into(),
            recipe.name.clone().into(),
            recipe.text.clone().into(),
            recipe.image.clone().into(),
            recipe.cooking_time.into(),
            recipe.created_at.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *tx).await?;

    insert_associations(&mut tx, &recipe.id, &input).await?;

    tx.commit().await?;

    tracing::info!(recipe_id = %recipe.id, author_id = %recipe.author_id, "created recipe");

    Ok(recipe)
}

/// Replace a recipe's fields, ingredient lines and tags. Author only.
pub async fn update_recipe(
    pool: &sqlx::SqlitePool,
    author_id: &str,
    recipe_id: &str,
    input: RecipeInput,
) -> RecipeResult<Recipe> {
    let existing = query_recipe_by_id(pool, recipe_id).await?;
    if existing.author_id != author_id {
        return Err(RecipeError::PermissionDenied);
    }

    validate_input(pool, &input).await?;

    let mut tx = pool.begin().await?;

    let statement = Query::update()
        .table(RecipeTable::Table)
        .values([
            (RecipeTable::Name, input.name.clone().into()),
            (RecipeTable::Text, input.text.clone().into()),
            (RecipeTable::Image, input.image.clone().into()),
            (RecipeTable::CookingTime, input.cooking_time.into()),
        ])
        .and_where(Expr::col(RecipeTable::Id).eq(recipe_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *tx).await?;

    delete_associations(&mut tx, recipe_id).await?;
    insert_associations(&mut tx, recipe_id, &input).await?;

    tx.commit().await?;

    Ok(Recipe {
        name: input.name,
        text: input.text,
        image: input.image,
        cooking_time: input.cooking_time,
        ..existing
    })
}

/// Delete a recipe together with its lines, tags, favorites and cart
/// entries. Author only.
pub async fn delete_recipe(
    pool: &sqlx::SqlitePool,
    author_id: &str,
    recipe_id: &str,
) -> RecipeResult<()> {
    let existing = query_recipe_by_id(pool, recipe_id).await?;
    if existing.author_id != author_id {
        return Err(RecipeError::PermissionDenied);
    }

    let mut tx = pool.begin().await?;

    delete_associations(&mut tx, recipe_id).await?;

    for statement in [
        Query::delete()
            .from_table(Favorite::Table)
            .and_where(Expr::col(Favorite::RecipeId).eq(recipe_id))
            .to_owned(),
        Query::delete()
            .from_table(CartEntry::Table)
            .and_where(Expr::col(CartEntry::RecipeId).eq(recipe_id))
            .to_owned(),
        Query::delete()
            .from_table(RecipeTable::Table)
            .and_where(Expr::col(RecipeTable::Id).eq(recipe_id))
            .to_owned(),
    ] {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(recipe_id = %recipe_id, "deleted recipe");

    Ok(())
}
