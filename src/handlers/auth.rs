// POST /api/auth/signup, POST /api/auth/login, GET /api/auth/verify

use tracing::{info, warn};
use warp::http::StatusCode;

use super::non_blank;
use crate::api_error::ApiError;
use crate::auth::{hash_password, verify_password, AuthUser, Claims, MIN_PASSWORD_LEN};
use crate::models::{AuthResponse, LoginRequest, SignupRequest, UserResponse, VerifyResponse};
use crate::state::AppState;
use crate::store;

const DUPLICATE_EMAIL: &str = "User with this email already exists";
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Issue a token and record it as a session
///
/// Session bookkeeping is best-effort: the token is valid on its own.
async fn issue_token(state: &AppState, user: &store::User) -> Result<(String, Claims), warp::Rejection> {
    let (token, claims) = state
        .keys
        .issue(user.id, &user.email)
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    if let Err(e) = state
        .store
        .create_session(user.id, &token, claims.expires_at())
        .await
    {
        warn!(user_id = %user.id, error = %e, "failed to record session");
    }

    Ok((token, claims))
}

pub async fn signup_handler(
    state: AppState,
    request: SignupRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let name = non_blank(request.name);
    let email = non_blank(request.email).map(|e| e.to_lowercase());
    let password = request.password.filter(|p| !p.is_empty());

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(ApiError::bad_request("Name, email, and password are required"));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let exists = state
        .store
        .email_exists(&email)
        .await
        .map_err(|e| ApiError::internal("Failed to create user", e))?;
    if exists {
        return Err(ApiError::bad_request(DUPLICATE_EMAIL));
    }

    let password_hash = hash_password(&password, state.bcrypt_cost)
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;

    let user = match state.store.create_user(&name, &email, &password_hash).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same email
        Err(store::Error::DuplicateError(_)) => return Err(ApiError::bad_request(DUPLICATE_EMAIL)),
        Err(e) => return Err(ApiError::internal("Failed to create user", e)),
    };

    info!(user_id = %user.id, email = %user.email, "user created");

    let (token, _) = issue_token(&state, &user).await?;

    let response = AuthResponse {
        success: true,
        user: UserResponse::from(&user),
        token,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

pub async fn login_handler(
    state: AppState,
    request: LoginRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let email = non_blank(request.email).map(|e| e.to_lowercase());
    let password = request.password.filter(|p| !p.is_empty());

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = state
        .store
        .find_active_user_by_email(&email)
        .await
        .map_err(|e| ApiError::internal("Login failed", e))?
        .ok_or_else(|| warp::reject::custom(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())))?;

    let matches = verify_password(&password, &user.password_hash)
        .await
        .map_err(|e| warp::reject::custom(ApiError::from(e)))?;
    if !matches {
        info!(email = %email, "login rejected: wrong password");
        return Err(warp::reject::custom(ApiError::Unauthorized(
            INVALID_CREDENTIALS.to_string(),
        )));
    }

    state
        .store
        .record_login(user.id)
        .await
        .map_err(|e| ApiError::internal("Login failed", e))?;

    let (token, _) = issue_token(&state, &user).await?;

    let response = AuthResponse {
        success: true,
        user: UserResponse::from(&user),
        token,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}

pub async fn verify_handler(
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Err(e) = state.store.touch_session(&user.token).await {
        warn!(user_id = %user.user_id, error = %e, "failed to touch session");
    }

    let response = VerifyResponse {
        success: true,
        user: user.claims,
    };

    Ok(warp::reply::json(&response))
}
