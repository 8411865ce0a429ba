//! Bearer-token middleware and the caller extractors.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use super::{ApiError, AppState};
use crate::domain::value_objects::Requester;

/// Verifies the `Authorization: Bearer` token and stores the caller in the request extensions.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

    let claims = state.accounts.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        ApiError::unauthorized("invalid token")
    })?;

    request.extensions_mut().insert(Requester::from(claims));
    Ok(next.run(request).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Requester>().cloned().ok_or_else(|| ApiError::unauthorized("missing bearer token"))
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone)]
pub struct Admin(pub Requester);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let requester = Requester::from_request_parts(parts, state).await?;
        if !requester.is_admin() {
            return Err(ApiError::forbidden("admin role required"));
        }
        Ok(Admin(requester))
    }
}
