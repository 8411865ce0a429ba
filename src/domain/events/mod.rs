//! Domain events and their outbox records
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::value_objects::OrderStatus;

pub const ORDER_CREATED: &str = "order_created";
pub const ORDER_STATUS_UPDATE: &str = "order_status_update";

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    Created { order_id: Uuid, user_id: Uuid, status: OrderStatus, total: Decimal },
    StatusUpdated { order_id: Uuid, status: OrderStatus },
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created { .. } => ORDER_CREATED,
            Self::StatusUpdated { .. } => ORDER_STATUS_UPDATE,
        }
    }

    pub fn order_id(&self) -> Uuid {
        match self {
            Self::Created { order_id, .. } | Self::StatusUpdated { order_id, .. } => *order_id,
        }
    }

    /// Payload stored in the outbox row.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Self::Created { order_id, user_id, status, total } => json!({
                "id": order_id,
                "user_id": user_id,
                "status": status,
                "total": total,
            }),
            Self::StatusUpdated { order_id, status } => json!({ "id": order_id, "status": status }),
        }
    }
}

/// Append-only outbox row. Never updated or deleted by this service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl OutboxEvent {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { id: Uuid::now_v7(), event_type: event_type.into(), payload, created_at: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_payload() {
        let (order_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());
        let event = OrderEvent::Created { order_id, user_id, status: OrderStatus::Created, total: Decimal::new(255, 1) };
        assert_eq!(event.event_type(), "order_created");
        assert_eq!(event.order_id(), order_id);
        let payload = event.payload();
        assert_eq!(payload["id"], json!(order_id));
        assert_eq!(payload["user_id"], json!(user_id));
        assert_eq!(payload["status"], "created");
        assert_eq!(payload["total"], "25.5");
    }

    #[test]
    fn test_status_payload() {
        let order_id = Uuid::new_v4();
        let event = OrderEvent::StatusUpdated { order_id, status: OrderStatus::InProgress };
        assert_eq!(event.event_type(), "order_status_update");
        assert_eq!(event.payload(), json!({ "id": order_id, "status": "in_progress" }));
    }

    #[test]
    fn test_outbox_event_serializes_type_field() {
        let event = OutboxEvent::new(ORDER_CREATED, json!({ "id": 1 }));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "order_created");
        assert_eq!(value["payload"]["id"], 1);
    }
}
