//! In-memory port implementations for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::aggregates::{Order, User};
use crate::domain::events::OutboxEvent;
use crate::domain::ports::{EventSink, ListOrdersParams, ListUsersParams, OrderStore, OutboxFeed, UserStore};
use crate::domain::value_objects::{OrderStatus, SortOrder};
use crate::{AccountError, OrderError};

fn page<T>(mut rows: Vec<T>, sort: SortOrder, created: impl Fn(&T) -> (DateTime<Utc>, Uuid), limit: i64, offset: i64) -> Vec<T> {
    rows.sort_by_key(|r| created(r));
    if sort == SortOrder::CreatedDesc {
        rows.reverse();
    }
    rows.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect()
}

#[derive(Default)]
pub struct MemoryOrders {
    rows: Mutex<Vec<Order>>,
    fail_writes: AtomicBool,
    last_list: Mutex<Option<ListOrdersParams>>,
}

impl MemoryOrders {
    pub fn get(&self, id: Uuid) -> Option<Order> { self.rows.lock().unwrap().iter().find(|o| o.id == id).cloned() }

    pub fn is_empty(&self) -> bool { self.rows.lock().unwrap().is_empty() }

    pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst) }

    pub fn last_list_params(&self) -> Option<ListOrdersParams> { self.last_list.lock().unwrap().clone() }

    fn check_writable(&self) -> Result<(), OrderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(OrderError::Persistence("disk full".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryOrders {
    async fn create(&self, order: &Order) -> Result<(), OrderError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|o| o.id == order.id) {
            return Err(OrderError::Conflict);
        }
        rows.push(order.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Order, OrderError> { self.get(id).ok_or(OrderError::NotFound) }

    async fn list(&self, params: &ListOrdersParams) -> Result<Vec<Order>, OrderError> {
        *self.last_list.lock().unwrap() = Some(params.clone());
        let rows: Vec<Order> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|o| params.admin_view || o.user_id == params.requester_id)
            .filter(|o| params.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        Ok(page(rows, params.sort, |o| (o.created_at, o.id), params.limit, params.offset))
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<DateTime<Utc>, OrderError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let order = rows.iter_mut().find(|o| o.id == id).ok_or(OrderError::NotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.updated_at)
    }
}

#[derive(Default)]
pub struct MemoryOutbox {
    rows: Mutex<Vec<OutboxEvent>>,
}

impl MemoryOutbox {
    pub fn events(&self) -> Vec<OutboxEvent> { self.rows.lock().unwrap().clone() }
}

#[async_trait]
impl EventSink for MemoryOutbox {
    async fn emit(&self, event_type: &str, payload: serde_json::Value) -> Result<(), OrderError> {
        self.rows.lock().unwrap().push(OutboxEvent::new(event_type, payload));
        Ok(())
    }
}

#[async_trait]
impl OutboxFeed for MemoryOutbox {
    async fn recent(&self, limit: i64) -> Result<Vec<OutboxEvent>, OrderError> {
        Ok(page(self.events(), SortOrder::CreatedDesc, |e| (e.created_at, e.id), limit, 0))
    }
}

pub struct FailingSink;

#[async_trait]
impl EventSink for FailingSink {
    async fn emit(&self, _event_type: &str, _payload: serde_json::Value) -> Result<(), OrderError> {
        Err(OrderError::Persistence("outbox unavailable".into()))
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn grant(&self, id: Uuid, role: &str) {
        if let Some(user) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.roles.push(role.to_string());
        }
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, user: &User) -> Result<(), AccountError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(AccountError::EmailTaken);
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AccountError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AccountError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|u| u.id == id).map(|u| {
            u.name = name.to_string();
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn list(&self, params: &ListUsersParams) -> Result<Vec<User>, AccountError> {
        let contains = |field: &str, needle: &Option<String>| {
            needle.as_deref().map_or(true, |n| field.to_lowercase().contains(&n.to_lowercase()))
        };
        let rows: Vec<User> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| contains(&u.email, &params.email) && contains(&u.name, &params.name))
            .filter(|u| params.role.as_deref().map_or(true, |r| u.roles.iter().any(|have| have == r)))
            .cloned()
            .collect();
        Ok(page(rows, params.sort, |u| (u.created_at, u.id), params.limit, params.offset))
    }
}
