pub mod command;
pub mod error;
pub mod favorite;
pub mod query;
pub mod types;

// Re-export commonly used items
pub use command::{create_recipe, delete_recipe, update_recipe};
pub use error::{RecipeError, RecipeResult};
pub use favorite::{add_favorite, is_favorited, remove_favorite};
pub use query::{
    RecipeFilters, count_recipes_by_author, query_ingredient_by_id, query_ingredient_lines,
    query_ingredients, query_recipe_by_id, query_recipe_tags, query_recipes,
    query_recipes_by_author, query_tag_by_id, query_tags,
};
pub use types::{Ingredient, IngredientAmountInput, IngredientLine, Recipe, RecipeInput, Tag};
