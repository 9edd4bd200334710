//! Activation mail delivery.

pub mod sender;

pub use sender::{ActivationMailer, LogMailer};
