//! Account endpoints: registration, login, profile and the admin user listing.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::auth::Admin;
use super::{ok, ApiError, AppState, Envelope, Listing, Page};
use crate::domain::aggregates::User;
use crate::domain::ports::ListUsersParams;
use crate::domain::value_objects::{Requester, SortOrder};
use crate::service::{Credentials, Registration, Session};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<User>>), ApiError> {
    let Json(registration) = payload?;
    let user = state.accounts.register(registration).await?;
    Ok((StatusCode::CREATED, ok(user)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Envelope<Session>>, ApiError> {
    let Json(credentials) = payload?;
    Ok(ok(state.accounts.login(credentials).await?))
}

pub async fn me(State(state): State<AppState>, requester: Requester) -> Result<Json<Envelope<User>>, ApiError> {
    Ok(ok(state.accounts.me(requester.user_id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    requester: Requester,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let Json(request) = payload?;
    Ok(ok(state.accounts.update_name(requester.user_id, &request.name).await?))
}

pub async fn admin_list(
    State(state): State<AppState>,
    Admin(_): Admin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Envelope<Listing<User>>>, ApiError> {
    let non_empty = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let page = Page::parse(query.page.as_deref(), query.limit.as_deref());
    let params = ListUsersParams {
        sort: SortOrder::parse_or_default(query.sort.as_deref().unwrap_or_default()),
        email: non_empty(query.email),
        name: non_empty(query.name),
        role: non_empty(query.role),
        limit: page.limit,
        offset: page.offset(),
    };
    let items = state.accounts.list_users(&params).await?;
    Ok(ok(Listing { items, page: page.page, limit: page.limit }))
}
