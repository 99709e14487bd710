// Models module

pub mod user;

// Re-export commonly used types
pub use user::{CreateUserRequest, User};
