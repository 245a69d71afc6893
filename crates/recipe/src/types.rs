use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i64,
    pub created_at: i64,
}

/// One ingredient line of a recipe, joined with the catalog entry it
/// references. `id` is the ingredient id, not the join row id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientLine {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct IngredientAmountInput {
    pub id: String,

    #[validate(range(min = 1, max = 32767, message = "amount must be between 1 and 32767"))]
    pub amount: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(nested)]
    pub ingredients: Vec<IngredientAmountInput>,

    pub tags: Vec<String>,

    pub image: Option<String>,

    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,

    #[validate(range(
        min = 1,
        max = 32767,
        message = "cooking_time must be between 1 and 32767"
    ))]
    pub cooking_time: i64,
}
