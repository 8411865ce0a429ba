//! Order lifecycle coordinator.
//!
//! Every call runs its steps strictly in sequence: ownership is checked before
//! transition legality, and persistence happens before the outbox emission.
//! A persistence failure aborts the call before anything is emitted; an
//! emission failure after a committed write is logged and swallowed.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregates::Order;
use crate::domain::events::OrderEvent;
use crate::domain::ports::{EventSink, ListOrdersParams, OrderStore};
use crate::domain::value_objects::{validate_transition, OrderItem, OrderStatus, Requester, SortOrder};
use crate::{OrderError, Result};

/// Caller-supplied listing filters. Bounds are clamped by the boundary layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub sort: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: Arc<dyn OrderStore>,
    events: Arc<dyn EventSink>,
}

impl OrderLifecycle {
    pub fn new(orders: Arc<dyn OrderStore>, events: Arc<dyn EventSink>) -> Self {
        Self { orders, events }
    }

    pub async fn create_order(&self, owner_id: Uuid, items: Vec<OrderItem>) -> Result<Order> {
        let order = Order::create(owner_id, items)?;
        self.orders.create(&order).await?;
        tracing::info!(order_id = %order.id, user_id = %owner_id, total = %order.total_amount, "order created");
        self.publish(order.created_event()).await;
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid, requester: &Requester) -> Result<Order> {
        self.load_authorized(id, requester).await
    }

    pub async fn list_orders(&self, requester: &Requester, filter: OrderFilter) -> Result<Vec<Order>> {
        let params = ListOrdersParams {
            requester_id: requester.user_id,
            admin_view: requester.is_admin(),
            status: filter.status,
            sort: filter.sort,
            limit: filter.limit,
            offset: filter.offset,
        };
        self.orders.list(&params).await
    }

    pub async fn change_order_status(&self, id: Uuid, requester: &Requester, target: OrderStatus) -> Result<Order> {
        let mut order = self.load_authorized(id, requester).await?;
        validate_transition(order.status, target)?;
        let updated_at = self.orders.update_status(id, target).await?;
        tracing::info!(order_id = %id, from = %order.status, to = %target, requester = %requester.user_id, "order status changed");
        order.status = target;
        order.updated_at = updated_at;
        self.publish(order.status_event()).await;
        Ok(order)
    }

    pub async fn cancel_order(&self, id: Uuid, requester: &Requester) -> Result<Order> {
        self.change_order_status(id, requester, OrderStatus::Cancelled).await
    }

    async fn load_authorized(&self, id: Uuid, requester: &Requester) -> Result<Order> {
        let order = self.orders.get_by_id(id).await?;
        if !requester.can_access(order.user_id) {
            tracing::debug!(order_id = %id, requester = %requester.user_id, "order access denied");
            return Err(OrderError::Forbidden);
        }
        Ok(order)
    }

    // TODO: hand failed emissions to a retry queue instead of dropping them.
    async fn publish(&self, event: OrderEvent) {
        if let Err(e) = self.events.emit(event.event_type(), event.payload()).await {
            tracing::warn!(error = %e, event_type = event.event_type(), order_id = %event.order_id(), "outbox emission failed");
        }
    }
}
