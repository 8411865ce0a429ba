//! Orderflow Order Service
//!
//! Small order backend: user accounts, JWT-protected order management and an
//! outbox table feeding downstream consumers.
//!
//! ## Features
//! - Registration and login with Argon2 password hashes
//! - Order creation with exact decimal totals
//! - Four-state order lifecycle (`created -> in_progress -> done`, cancellable)
//! - Ownership and admin-view authorization
//! - Outbox events for every order mutation

use thiserror::Error;

pub mod auth;
pub mod config;
pub mod domain;
pub mod http;
pub mod service;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use domain::aggregates::{compute_total, Order, User};
pub use domain::events::{OrderEvent, OutboxEvent};
pub use domain::value_objects::{validate_transition, OrderItem, OrderStatus, Requester, SortOrder};
pub use service::{AccountService, OrderLifecycle};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("invalid order item: {0}")]
    InvalidItem(String),

    #[error("cannot transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order not found")]
    NotFound,

    #[error("not allowed")]
    Forbidden,

    #[error("order id already exists")]
    Conflict,

    #[error("storage error: {0}")]
    Persistence(String),
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("token error: {0}")]
    Token(#[from] auth::TokenError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, OrderError>;
