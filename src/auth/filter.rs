use std::sync::Arc;

use uuid::Uuid;
use warp::{Filter, Rejection};

use super::{AuthError, Claims, JwtKeys};
use crate::api_error::ApiError;

/// The caller of an authenticated route
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub claims: Claims,
    /// The raw bearer token, for session bookkeeping
    pub token: String,
}

/// Resolve an `Authorization` header value to the calling user
///
/// A missing header is `MissingToken`; anything that isn't
/// `Bearer <valid token>` is `InvalidToken` or `Expired`.
pub fn authenticate(keys: &JwtKeys, header: Option<&str>) -> Result<AuthUser, AuthError> {
    let header = header.ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidToken)?;

    let claims = keys.verify(token)?;
    let user_id = claims.user_id()?;

    Ok(AuthUser {
        user_id,
        claims,
        token: token.to_string(),
    })
}

/// Filter that extracts the authenticated caller or rejects with 401/403
pub fn with_auth(
    keys: Arc<JwtKeys>,
) -> impl Filter<Extract = (AuthUser,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let keys = keys.clone();
        async move {
            authenticate(&keys, header.as_deref())
                .map_err(|e| warp::reject::custom(ApiError::from(e)))
        }
    })
}
