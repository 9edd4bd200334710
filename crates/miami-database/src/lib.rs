//! # miami-database
//!
//! PostgreSQL pool with embedded migrations, plus the concrete repositories
//! for accounts and refresh tokens.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
