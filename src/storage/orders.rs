use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::aggregates::Order;
use crate::domain::ports::{ListOrdersParams, OrderStore};
use crate::domain::value_objects::{OrderItem, OrderStatus};
use crate::OrderError;

const ORDER_COLUMNS: &str = "id, user_id, items, status, total_amount, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    items: Json<Vec<OrderItem>>,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = OrderError;

    // Stored status is free text; anything outside the enum is a corrupt row.
    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| OrderError::Persistence(format!("order {}: {e}", row.id)))?;
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            status,
            total_amount: row.total_amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Builds the authorized listing query. Non-admins are pinned to their own rows.
pub(crate) fn list_query(params: &ListOrdersParams) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE 1=1"));
    if !params.admin_view {
        qb.push(" AND user_id = ").push_bind(params.requester_id);
    }
    if let Some(status) = params.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY ").push(params.sort.as_sql());
    qb.push(" LIMIT ").push_bind(params.limit);
    qb.push(" OFFSET ").push_bind(params.offset);
    qb
}

#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: &Order) -> Result<(), OrderError> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, items, status, total_amount, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Order, OrderError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(OrderError::NotFound)?.try_into()
    }

    async fn list(&self, params: &ListOrdersParams) -> Result<Vec<Order>, OrderError> {
        let rows: Vec<OrderRow> = list_query(params).build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<DateTime<Utc>, OrderError> {
        let now = Utc::now();
        let updated: Option<DateTime<Utc>> = sqlx::query_scalar("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING updated_at")
            .bind(status.as_str())
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        updated.ok_or(OrderError::NotFound)
    }
}
