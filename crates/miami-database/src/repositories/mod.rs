//! Repository implementations for accounts and refresh tokens.

pub mod token;
pub mod user;

pub use token::RefreshTokenRepository;
pub use user::UserRepository;
