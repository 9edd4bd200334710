//! User account entities.

pub mod identity;
pub mod model;

pub use identity::UserIdentity;
pub use model::{CreateUser, User};
