//! # miami-entity
//!
//! Domain entity models for the auth service. Every struct in this crate
//! represents a database row or a domain value object. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod token;
pub mod user;
