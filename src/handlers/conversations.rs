// /api/conversations and /api/conversations/{id}

use uuid::Uuid;
use warp::http::StatusCode;

use super::non_blank;
use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::models::{
    ConversationResponse, ConversationSummaryResponse, CreateConversationRequest,
    SuccessResponse, UpdateConversationRequest,
};
use crate::state::AppState;
use crate::store::{ConversationPatch, DEFAULT_TITLE};

pub(crate) const CONVERSATION_NOT_FOUND: &str = "Conversation not found";

pub async fn list_conversations_handler(
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversations = state
        .store
        .list_conversations(user.user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch conversations", e))?;

    let response: Vec<ConversationSummaryResponse> =
        conversations.into_iter().map(Into::into).collect();

    Ok(warp::reply::json(&response))
}

pub async fn create_conversation_handler(
    state: AppState,
    user: AuthUser,
    request: CreateConversationRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let title = non_blank(request.title).unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let conversation = state
        .store
        .create_conversation(user.user_id, &title)
        .await
        .map_err(|e| ApiError::internal("Failed to create conversation", e))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ConversationResponse::new(conversation, None)),
        StatusCode::CREATED,
    ))
}

pub async fn get_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    let conversation = state
        .store
        .get_conversation(user.user_id, conversation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch conversation", e))?
        .ok_or_else(|| ApiError::not_found(CONVERSATION_NOT_FOUND))?;

    let messages = state
        .store
        .list_messages(user.user_id, conversation_id)
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch conversation", CONVERSATION_NOT_FOUND, e))?;

    Ok(warp::reply::json(&ConversationResponse::new(
        conversation,
        Some(messages),
    )))
}

pub async fn update_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
    request: UpdateConversationRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let patch = ConversationPatch {
        title: non_blank(request.title),
        is_archived: request.is_archived,
    };

    if patch.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let conversation = state
        .store
        .update_conversation(user.user_id, conversation_id, patch)
        .await
        .map_err(|e| {
            ApiError::from_store("Failed to update conversation", CONVERSATION_NOT_FOUND, e)
        })?;

    Ok(warp::reply::json(&ConversationResponse::new(
        conversation,
        None,
    )))
}

pub async fn delete_conversation_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    let deleted = state
        .store
        .delete_conversation(user.user_id, conversation_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete conversation", e))?;

    if !deleted {
        return Err(ApiError::not_found(CONVERSATION_NOT_FOUND));
    }

    Ok(warp::reply::json(&SuccessResponse { success: true }))
}
