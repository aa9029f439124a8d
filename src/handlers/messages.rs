// /api/conversations/{id}/messages and /api/conversations/{id}/messages/bulk

use uuid::Uuid;
use warp::http::StatusCode;

use super::conversations::CONVERSATION_NOT_FOUND;
use crate::api_error::ApiError;
use crate::auth::AuthUser;
use crate::models::{AddMessageRequest, BulkMessagesRequest, BulkMessagesResponse, MessageResponse};
use crate::state::AppState;
use crate::store::{NewMessage, Role};

/// Validate a client message; any `messageOrder` it carried was never read
fn parse_new_message(request: AddMessageRequest) -> Result<NewMessage, warp::Rejection> {
    let role = request.role.filter(|r| !r.is_empty());
    let content = request.content.filter(|c| !c.trim().is_empty());

    let (Some(role), Some(content)) = (role, content) else {
        return Err(ApiError::bad_request("Role and content are required"));
    };

    let role: Role = role
        .parse()
        .map_err(|_| ApiError::bad_request("Role must be user, ai, or system"))?;

    Ok(NewMessage::new(role, content))
}

pub async fn list_messages_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
) -> Result<impl warp::Reply, warp::Rejection> {
    let messages = state
        .store
        .list_messages(user.user_id, conversation_id)
        .await
        .map_err(|e| ApiError::from_store("Failed to fetch messages", CONVERSATION_NOT_FOUND, e))?;

    let response: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
    Ok(warp::reply::json(&response))
}

pub async fn add_message_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
    request: AddMessageRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let message = parse_new_message(request)?;

    let stored = state
        .store
        .add_message(user.user_id, conversation_id, message)
        .await
        .map_err(|e| ApiError::from_store("Failed to add message", CONVERSATION_NOT_FOUND, e))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&MessageResponse::from(stored)),
        StatusCode::CREATED,
    ))
}

pub async fn bulk_add_messages_handler(
    conversation_id: Uuid,
    state: AppState,
    user: AuthUser,
    request: BulkMessagesRequest,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = request.messages.unwrap_or_default();
    if requests.is_empty() {
        return Err(ApiError::bad_request("Messages array is required"));
    }

    let messages = requests
        .into_iter()
        .map(parse_new_message)
        .collect::<Result<Vec<_>, _>>()?;

    let stored = state
        .store
        .add_messages(user.user_id, conversation_id, messages)
        .await
        .map_err(|e| ApiError::from_store("Failed to add messages", CONVERSATION_NOT_FOUND, e))?;

    let response = BulkMessagesResponse {
        success: true,
        messages: stored.into_iter().map(Into::into).collect(),
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_message() {
        let message = parse_new_message(AddMessageRequest::new(Role::Ai, "hello")).unwrap();
        assert_eq!(message, NewMessage::ai("hello"));
    }

    #[test]
    fn test_parse_new_message_rejects_missing_and_unknown() {
        let missing = parse_new_message(AddMessageRequest {
            role: Some("user".to_string()),
            content: Some("   ".to_string()),
        })
        .unwrap_err();
        assert!(matches!(
            missing.find::<ApiError>(),
            Some(ApiError::BadRequest(m)) if m == "Role and content are required"
        ));

        let unknown = parse_new_message(AddMessageRequest {
            role: Some("assistant".to_string()),
            content: Some("hi".to_string()),
        })
        .unwrap_err();
        assert!(matches!(
            unknown.find::<ApiError>(),
            Some(ApiError::BadRequest(m)) if m == "Role must be user, ai, or system"
        ));
    }
}
