pub mod api_key;
pub mod password;
pub mod token;

pub use password::PasswordHasher;
pub use token::{Claims, TokenService};
