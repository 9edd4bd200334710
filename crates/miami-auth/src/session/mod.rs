//! Session lifecycle: register, activate, login, refresh, logout.

pub mod manager;

pub use manager::{AuthResult, SessionManager};
