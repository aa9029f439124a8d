//! JSON error responses for the HTTP API
//!
//! Handlers reject with [`ApiError`]; [`handle_rejection`] is installed once
//! with `recover` and turns every rejection, ours or warp's, into a status
//! code plus an `{"error": ...}` body.

use serde_json::json;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::auth::AuthError;
use crate::store;

/// A failed API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 - the request body is incomplete or invalid
    #[error("{0}")]
    BadRequest(String),

    /// 401 - no credentials, or credentials that don't match an account
    #[error("{0}")]
    Unauthorized(String),

    /// 403 - credentials were presented but are invalid or expired
    #[error("{0}")]
    Forbidden(String),

    /// 404 - the resource doesn't exist or isn't owned by the caller
    #[error("{0}")]
    NotFound(String),

    /// 500 - `context` is shown to the client, `detail` only in development
    #[error("{context}")]
    Internal { context: String, detail: String },
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Rejection {
        warp::reject::custom(ApiError::BadRequest(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Rejection {
        warp::reject::custom(ApiError::NotFound(message.into()))
    }

    pub fn internal(context: impl Into<String>, detail: impl std::fmt::Display) -> Rejection {
        warp::reject::custom(ApiError::Internal {
            context: context.into(),
            detail: detail.to_string(),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a store failure, naming the operation for 500 responses
    ///
    /// Validation errors become 400s and missing rows become 404s on
    /// `not_found`; everything else is an internal error.
    pub fn from_store(context: &str, not_found: &str, err: store::Error) -> Rejection {
        let api_error = match err {
            store::Error::ValidationError(msg) => ApiError::BadRequest(msg),
            store::Error::NotFoundError(_) => ApiError::NotFound(not_found.to_string()),
            other => ApiError::Internal {
                context: context.to_string(),
                detail: other.to_string(),
            },
        };
        warp::reject::custom(api_error)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidToken | AuthError::Expired => ApiError::Forbidden(err.to_string()),
            AuthError::Encoding(_) | AuthError::Hashing(_) => ApiError::Internal {
                context: "Authentication failed".to_string(),
                detail: err.to_string(),
            },
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "error": message })), status)
}

/// Render any rejection as a JSON error
///
/// With `expose_detail` set (development), internal errors also carry the
/// underlying cause in a `message` field.
pub async fn handle_rejection(err: Rejection, expose_detail: bool) -> Result<impl Reply, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        if let ApiError::Internal { context, detail } = api_error {
            error!(%context, %detail, "request failed");
            let body = if expose_detail {
                json!({ "error": context, "message": detail })
            } else {
                json!({ "error": context })
            };
            return Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        return Ok(json_error(api_error.status(), &api_error.to_string()));
    }

    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(json_error(
            StatusCode::BAD_REQUEST,
            &format!("Invalid JSON body: {}", e),
        ));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(json_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large"));
    }

    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(json_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Content-Type must be application/json",
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() && !err.is_not_found() {
        return Ok(json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }

    if err.is_not_found() {
        return Ok(json_error(StatusCode::NOT_FOUND, "Endpoint not found"));
    }

    warn!(?err, "unhandled rejection");
    let body = if expose_detail {
        json!({ "error": "Internal server error", "message": format!("{:?}", err) })
    } else {
        json!({ "error": "Internal server error", "message": "Something went wrong" })
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&body),
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
