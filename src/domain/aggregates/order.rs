//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::OrderEvent;
use crate::domain::value_objects::{OrderItem, OrderStatus};
use crate::OrderError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Exact sum of `quantity * price` over a non-empty item list.
pub fn compute_total(items: &[OrderItem]) -> Result<Decimal, OrderError> {
    if items.is_empty() {
        return Err(OrderError::InvalidItem("order must contain at least one item".into()));
    }
    items.iter().enumerate().try_fold(Decimal::ZERO, |acc, (idx, item)| {
        if item.quantity <= 0 {
            return Err(OrderError::InvalidItem(format!("item {idx}: quantity must be positive, got {}", item.quantity)));
        }
        if item.price < Decimal::ZERO {
            return Err(OrderError::InvalidItem(format!("item {idx}: price must not be negative, got {}", item.price)));
        }
        item.price
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| OrderError::InvalidItem(format!("item {idx}: total overflows")))
    })
}

impl Order {
    /// Builds a new order in `created`. Nothing is allocated if the items are invalid.
    pub fn create(user_id: Uuid, items: Vec<OrderItem>) -> Result<Self, OrderError> {
        let total_amount = compute_total(&items)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            items,
            status: OrderStatus::Created,
            total_amount,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn created_event(&self) -> OrderEvent {
        OrderEvent::Created { order_id: self.id, user_id: self.user_id, status: self.status, total: self.total_amount }
    }

    pub fn status_event(&self) -> OrderEvent {
        OrderEvent::StatusUpdated { order_id: self.id, status: self.status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i32, price: Decimal) -> OrderItem { OrderItem::new("widget", quantity, price) }

    #[test]
    fn test_compute_total_exact() {
        let items = vec![item(2, Decimal::new(10, 0)), item(1, Decimal::new(55, 1))];
        assert_eq!(compute_total(&items).unwrap(), Decimal::new(255, 1));
    }

    #[test]
    fn test_compute_total_keeps_cents() {
        let items = vec![item(3, Decimal::new(10, 2)), item(7, Decimal::new(1999, 2))];
        assert_eq!(compute_total(&items).unwrap(), Decimal::new(14023, 2));
    }

    #[test]
    fn test_free_items_are_allowed() {
        assert_eq!(compute_total(&[item(4, Decimal::ZERO)]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_rejects_bad_items() {
        let cases = [
            vec![],
            vec![item(0, Decimal::new(10, 0))],
            vec![item(-1, Decimal::new(10, 0))],
            vec![item(1, Decimal::new(-1, 2))],
            vec![item(1, Decimal::ONE), item(0, Decimal::ONE)],
        ];
        for items in cases {
            assert!(matches!(compute_total(&items), Err(OrderError::InvalidItem(_))), "{items:?}");
        }
    }

    #[test]
    fn test_compute_total_overflow_is_rejected() {
        let items = vec![item(i32::MAX, Decimal::MAX)];
        assert!(matches!(compute_total(&items), Err(OrderError::InvalidItem(_))));
    }

    #[test]
    fn test_order_create() {
        let owner = Uuid::new_v4();
        let order = Order::create(owner, vec![item(2, Decimal::new(10, 0))]).unwrap();
        assert_eq!(order.user_id, owner);
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.total_amount, Decimal::new(20, 0));
        assert_eq!(order.created_at, order.updated_at);
    }

    #[test]
    fn test_order_create_propagates_item_error() {
        let err = Order::create(Uuid::new_v4(), vec![item(1, Decimal::new(-5, 0))]).unwrap_err();
        assert!(matches!(err, OrderError::InvalidItem(_)));
    }
}
