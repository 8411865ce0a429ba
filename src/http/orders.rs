//! Order endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{ok, ApiError, AppState, Envelope, Listing, Page};
use crate::domain::aggregates::Order;
use crate::domain::value_objects::{OrderItem, OrderStatus, Requester, SortOrder};
use crate::service::OrderFilter;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

type OrderResponse = Result<Json<Envelope<Order>>, ApiError>;

pub async fn create(
    State(state): State<AppState>,
    requester: Requester,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Order>>), ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(|_| ApiError::invalid_input("invalid items"))?;
    let order = state.orders.create_order(requester.user_id, request.items).await?;
    Ok((StatusCode::CREATED, ok(order)))
}

pub async fn list(
    State(state): State<AppState>,
    requester: Requester,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Envelope<Listing<Order>>>, ApiError> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<OrderStatus>().map_err(|_| ApiError::invalid_input("unsupported status"))?),
        None => None,
    };
    let page = Page::parse(query.page.as_deref(), query.limit.as_deref());
    let filter = OrderFilter {
        status,
        sort: SortOrder::parse_or_default(query.sort.as_deref().unwrap_or_default()),
        limit: page.limit,
        offset: page.offset(),
    };
    let items = state.orders.list_orders(&requester, filter).await?;
    Ok(ok(Listing { items, page: page.page, limit: page.limit }))
}

pub async fn get_one(State(state): State<AppState>, requester: Requester, id: Result<Path<Uuid>, PathRejection>) -> OrderResponse {
    let Path(id) = id?;
    Ok(ok(state.orders.get_order(id, &requester).await?))
}

/// Only forward moves are accepted here; cancellation has its own route.
pub async fn update_status(
    State(state): State<AppState>,
    requester: Requester,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> OrderResponse {
    let Path(id) = id?;
    let Json(request) = payload?;
    let target = match request.status.trim().parse::<OrderStatus>() {
        Ok(status @ (OrderStatus::InProgress | OrderStatus::Done)) => status,
        _ => return Err(ApiError::invalid_input("unsupported status")),
    };
    Ok(ok(state.orders.change_order_status(id, &requester, target).await?))
}

pub async fn cancel(State(state): State<AppState>, requester: Requester, id: Result<Path<Uuid>, PathRejection>) -> OrderResponse {
    let Path(id) = id?;
    Ok(ok(state.orders.cancel_order(id, &requester).await?))
}
