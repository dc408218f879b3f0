//! Caller identity forwarded by the upstream auth gateway.
//!
//! Authentication itself happens before requests reach this server. The
//! gateway puts the authenticated user in `X-User-Id` (and optionally the
//! role in `X-User-Role`); handlers that need a waiter take [`Identity`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Option<String>,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("missing X-User-Id header"))?;

        Ok(Identity {
            user_id,
            role: header(USER_ROLE_HEADER),
        })
    }
}
