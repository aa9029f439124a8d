// GET /api/health handler

use std::convert::Infallible;
use tracing::warn;
use warp::http::StatusCode;

use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(state: AppState) -> Result<impl warp::Reply, Infallible> {
    let (response, status) = match state.store.now().await {
        Ok(now) => (
            HealthResponse {
                status: "ok".to_string(),
                database: Some("connected".to_string()),
                timestamp: Some(now),
                message: None,
            },
            StatusCode::OK,
        ),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                HealthResponse {
                    status: "error".to_string(),
                    database: None,
                    timestamp: None,
                    message: Some(e.to_string()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    };

    Ok(warp::reply::with_status(warp::reply::json(&response), status))
}
