//! Aggregates module
pub mod order;
pub mod user;

pub use order::{compute_total, Order};
pub use user::User;
