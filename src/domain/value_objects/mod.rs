//! Value Objects for Orders

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod status;

pub use status::{can_transition, validate_transition, OrderStatus, UnknownStatus};

pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

/// One line of an order. Immutable once the order exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: i32, price: Decimal) -> Self {
        Self { name: name.into(), quantity, price }
    }

    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.quantity) }
}

/// The authenticated principal issuing a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl Requester {
    pub fn new(user_id: Uuid, roles: Vec<String>) -> Self { Self { user_id, roles } }

    pub fn has_role(&self, role: &str) -> bool { self.roles.iter().any(|r| r == role) }

    pub fn is_admin(&self) -> bool { self.has_role(ADMIN_ROLE) }

    /// Owners and admins may read or mutate a specific order.
    pub fn can_access(&self, owner_id: Uuid) -> bool { owner_id == self.user_id || self.is_admin() }
}

/// Listing order by creation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    CreatedAsc,
    #[default]
    CreatedDesc,
}

impl SortOrder {
    /// Unrecognized keys fall back to the default instead of failing.
    pub fn parse_or_default(key: &str) -> Self {
        match key.trim() {
            "created_asc" => Self::CreatedAsc,
            _ => Self::CreatedDesc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "created_at ASC, id ASC",
            Self::CreatedDesc => "created_at DESC, id DESC",
        }
    }
}
