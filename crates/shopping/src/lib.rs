pub mod aggregation;
pub mod cart;
pub mod error;
pub mod list;

// Re-export commonly used items
pub use aggregation::{AggregatedLine, CartLine, aggregate, render};
pub use cart::{add_recipe_to_cart, in_cart, list_cart_recipe_ids, remove_recipe_from_cart};
pub use error::{ShoppingError, ShoppingResult};
pub use list::compute_shopping_list;
