pub mod command;
pub mod error;
pub mod jwt;
pub mod password;
pub mod query;
pub mod subscription;
pub mod types;

// Re-export commonly used items
pub use command::{RegisterInput, login, register};
pub use error::{UserError, UserResult};
pub use jwt::{Claims, generate_jwt, validate_jwt};
pub use password::{hash_password, verify_password};
pub use query::{get_user_by_email, get_user_by_id, get_user_by_username, user_exists};
pub use subscription::{is_subscribed, list_subscribed_authors, subscribe, unsubscribe};
pub use types::User;
