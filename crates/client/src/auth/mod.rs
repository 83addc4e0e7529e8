//! Session state and the token lifecycle around it

pub mod session;
pub mod token_manager;

pub use session::{Session, TokenAction, TokenStatus};
pub use token_manager::TokenManager;
