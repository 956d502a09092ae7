//! Credentials and the token lifecycle.

pub mod credentials;
pub mod token_manager;

pub use credentials::Credentials;
pub use token_manager::TokenManager;
