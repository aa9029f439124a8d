// Route definitions

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use uuid::Uuid;
use warp::{Filter, Rejection};

use crate::api_error::{handle_rejection, ApiError};
use crate::auth::{with_auth, AuthUser};
use crate::handlers;
use crate::state::AppState;

/// Largest accepted request body
const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// Like [`json_body`], but an empty body yields `T::default()`
fn optional_json_body<T: DeserializeOwned + Default + Send + 'static>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    // No content_length_limit here: it rejects requests without a Content-Length
    warp::body::bytes()
        .and_then(|body: bytes::Bytes| async move {
            if body.len() as u64 > MAX_BODY_BYTES {
                return Err(ApiError::bad_request("Request body too large"));
            }
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(T::default());
            }
            serde_json::from_slice(&body)
                .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
        })
}

fn authed(state: &AppState) -> impl Filter<Extract = (AppState, AuthUser), Error = Rejection> + Clone {
    with_state(state.clone()).and(with_auth(state.keys.clone()))
}

fn auth_routes(
    state: &AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let auth = warp::path("api").and(warp::path("auth"));

    // POST /api/auth/signup
    let signup = auth
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers::signup_handler);

    // POST /api/auth/login
    let login = auth
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body())
        .and_then(handlers::login_handler);

    // GET /api/auth/verify
    let verify = auth
        .and(warp::path("verify"))
        .and(warp::path::end())
        .and(warp::get())
        .and(authed(state))
        .and_then(handlers::verify_handler);

    signup.or(login).or(verify)
}

fn conversation_routes(
    state: &AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let conversations = warp::path("api").and(warp::path("conversations"));
    let conversation = conversations.and(warp::path::param::<Uuid>());

    // GET /api/conversations
    let list = conversations
        .and(warp::path::end())
        .and(warp::get())
        .and(authed(state))
        .and_then(handlers::list_conversations_handler);

    // POST /api/conversations
    let create = conversations
        .and(warp::path::end())
        .and(warp::post())
        .and(authed(state))
        .and(optional_json_body())
        .and_then(handlers::create_conversation_handler);

    // GET /api/conversations/{id}
    let get = conversation
        .and(warp::path::end())
        .and(warp::get())
        .and(authed(state))
        .and_then(handlers::get_conversation_handler);

    // PUT /api/conversations/{id}
    let update = conversation
        .and(warp::path::end())
        .and(warp::put())
        .and(authed(state))
        .and(json_body())
        .and_then(handlers::update_conversation_handler);

    // DELETE /api/conversations/{id}
    let delete = conversation
        .and(warp::path::end())
        .and(warp::delete())
        .and(authed(state))
        .and_then(handlers::delete_conversation_handler);

    list.or(create).or(get).or(update).or(delete)
}

fn message_routes(
    state: &AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let messages = warp::path("api")
        .and(warp::path("conversations"))
        .and(warp::path::param::<Uuid>())
        .and(warp::path("messages"));

    // GET /api/conversations/{id}/messages
    let list = messages
        .and(warp::path::end())
        .and(warp::get())
        .and(authed(state))
        .and_then(handlers::list_messages_handler);

    // POST /api/conversations/{id}/messages
    let add = messages
        .and(warp::path::end())
        .and(warp::post())
        .and(authed(state))
        .and(json_body())
        .and_then(handlers::add_message_handler);

    // POST /api/conversations/{id}/messages/bulk
    let bulk = messages
        .and(warp::path("bulk"))
        .and(warp::path::end())
        .and(warp::post())
        .and(authed(state))
        .and(json_body())
        .and_then(handlers::bulk_add_messages_handler);

    list.or(add).or(bulk)
}

fn settings_routes(
    state: &AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let settings = warp::path("api").and(warp::path("settings")).and(warp::path::end());

    // GET /api/settings
    let get = settings
        .and(warp::get())
        .and(authed(state))
        .and_then(handlers::get_settings_handler);

    // PUT /api/settings
    let update = settings
        .and(warp::put())
        .and(authed(state))
        .and(json_body())
        .and_then(handlers::update_settings_handler);

    get.or(update)
}

/// Every API route, without error recovery
pub fn api_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    // GET /api/health
    let health = warp::path("api")
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::health_handler);

    health
        .or(auth_routes(&state))
        .or(conversation_routes(&state))
        .or(message_routes(&state))
        .or(settings_routes(&state))
}

/// The full application: routes, JSON error rendering, CORS and request tracing
pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = Rejection> + Clone {
    let expose_detail = state.development;

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["authorization", "content-type"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]);

    api_routes(state)
        .recover(move |err: Rejection| handle_rejection(err, expose_detail))
        .with(cors)
        .with(warp::trace::request())
}
