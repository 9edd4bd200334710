//! Persistence seams for the session manager.
//!
//! Both stores are traits so the manager can be assembled over Postgres in
//! production and over the in-memory backends in tests or local runs.

pub mod account;
pub mod memory;
pub mod refresh;

pub use account::AccountStore;
pub use memory::{MemoryAccountStore, MemoryRefreshStore};
pub use refresh::RefreshStore;
