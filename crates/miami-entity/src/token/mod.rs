//! Persisted refresh-token state.

pub mod model;

pub use model::RefreshTokenRecord;
