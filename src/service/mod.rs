//! Application services orchestrating the domain over the ports.
pub mod accounts;
pub mod orders;

pub use accounts::{AccountService, Credentials, Registration, Session};
pub use orders::{OrderFilter, OrderLifecycle};
