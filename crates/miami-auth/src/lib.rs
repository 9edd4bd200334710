//! # miami-auth
//!
//! Token lifecycle management for MiamiMusic: minting and verifying
//! access/refresh JWTs, persisting the single active refresh token per
//! account, and the register/login/refresh/logout flows built on them.
//!
//! ## Modules
//!
//! - `jwt`: token claims, minting, and verification for both token kinds
//! - `password`: Argon2id password hashing
//! - `store`: account and refresh-token store traits with Postgres and in-memory backends
//! - `mail`: activation mail delivery
//! - `session`: the session manager driving every auth flow

pub mod jwt;
pub mod mail;
pub mod password;
pub mod session;
pub mod store;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair, TokenType};
pub use mail::{ActivationMailer, LogMailer};
pub use password::PasswordHasher;
pub use session::{AuthResult, SessionManager};
pub use store::{AccountStore, MemoryAccountStore, MemoryRefreshStore, RefreshStore};
