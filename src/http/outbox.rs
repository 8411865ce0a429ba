//! Admin view over recently emitted outbox events.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::auth::Admin;
use super::{ok, parse_bounded, ApiError, AppState, Envelope};
use crate::domain::events::OutboxEvent;

#[derive(Debug, Default, Deserialize)]
pub struct OutboxQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OutboxListing {
    pub items: Vec<OutboxEvent>,
    pub limit: i64,
}

pub async fn admin_list(
    State(state): State<AppState>,
    Admin(_): Admin,
    Query(query): Query<OutboxQuery>,
) -> Result<Json<Envelope<OutboxListing>>, ApiError> {
    let limit = parse_bounded(query.limit.as_deref(), 50, 1, 500);
    let items = state.outbox.recent(limit).await?;
    Ok(ok(OutboxListing { items, limit }))
}
