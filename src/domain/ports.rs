//! Persistence and event ports consumed by the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::aggregates::{Order, User};
use crate::domain::events::OutboxEvent;
use crate::domain::value_objects::{OrderStatus, SortOrder};
use crate::{AccountError, OrderError};

/// Listing parameters. `limit` and `offset` arrive already clamped.
#[derive(Clone, Debug, PartialEq)]
pub struct ListOrdersParams {
    pub requester_id: Uuid,
    pub admin_view: bool,
    pub status: Option<OrderStatus>,
    pub sort: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListUsersParams {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub sort: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: &Order) -> Result<(), OrderError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Order, OrderError>;

    /// Non-admin requesters only ever see their own rows.
    async fn list(&self, params: &ListOrdersParams) -> Result<Vec<Order>, OrderError>;

    /// Unconditional write; legality is checked by the caller. Returns the new `updated_at`.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<DateTime<Utc>, OrderError>;
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event_type: &str, payload: serde_json::Value) -> Result<(), OrderError>;
}

#[async_trait]
pub trait OutboxFeed: Send + Sync {
    /// Newest first.
    async fn recent(&self, limit: i64) -> Result<Vec<OutboxEvent>, OrderError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), AccountError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AccountError>;

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AccountError>;

    async fn list(&self, params: &ListUsersParams) -> Result<Vec<User>, AccountError>;
}
