//! HTTP client for the chat REST API

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    AddMessageRequest, AuthResponse, BulkMessagesRequest, BulkMessagesResponse,
    ConversationResponse, ConversationSummaryResponse, CreateConversationRequest, HealthResponse,
    LoginRequest, MessageResponse, SignupRequest, SuccessResponse, UpdateConversationRequest,
    UpdateSettingsRequest, VerifyResponse,
};
use crate::store::{Role, UserSettings};

use super::error::ClientError;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for every endpoint under `/api`
///
/// Cloning shares the bearer token, so a sign-in through any clone is seen
/// by all of them.
#[derive(Clone)]
pub struct ChatApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ChatApiClient {
    /// Create a client for a server such as `http://localhost:3000`
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Network` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Start from a previously saved token (builder pattern)
    pub fn with_token(self, token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
            ..self
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Forget the token; the server keeps no logout state
    pub async fn logout(&self) {
        *self.token.write().await = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            debug!(status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_authed<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let token = self.token().await.ok_or(ClientError::NotSignedIn)?;
        self.send(builder.bearer_auth(token)).await
    }

    async fn remember(&self, response: AuthResponse) -> AuthResponse {
        *self.token.write().await = Some(response.token.clone());
        response
    }

    // Auth

    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let body = SignupRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let response = self
            .send(self.http.post(self.url("/auth/signup")).json(&body))
            .await?;
        Ok(self.remember(response).await)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let response = self
            .send(self.http.post(self.url("/auth/login")).json(&body))
            .await?;
        Ok(self.remember(response).await)
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        self.send_authed(self.http.get(self.url("/auth/verify"))).await
    }

    // Conversations

    pub async fn list_conversations(
        &self,
    ) -> Result<Vec<ConversationSummaryResponse>, ClientError> {
        self.send_authed(self.http.get(self.url("/conversations"))).await
    }

    pub async fn create_conversation(
        &self,
        title: Option<&str>,
    ) -> Result<ConversationResponse, ClientError> {
        let body = CreateConversationRequest {
            title: title.map(str::to_string),
        };
        self.send_authed(self.http.post(self.url("/conversations")).json(&body))
            .await
    }

    /// Fetch a conversation together with its messages
    pub async fn get_conversation(&self, id: Uuid) -> Result<ConversationResponse, ClientError> {
        self.send_authed(self.http.get(self.url(&format!("/conversations/{}", id))))
            .await
    }

    pub async fn update_conversation(
        &self,
        id: Uuid,
        patch: &UpdateConversationRequest,
    ) -> Result<ConversationResponse, ClientError> {
        self.send_authed(
            self.http
                .put(self.url(&format!("/conversations/{}", id)))
                .json(patch),
        )
        .await
    }

    pub async fn delete_conversation(&self, id: Uuid) -> Result<SuccessResponse, ClientError> {
        self.send_authed(self.http.delete(self.url(&format!("/conversations/{}", id))))
            .await
    }

    // Messages

    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<MessageResponse>, ClientError> {
        self.send_authed(
            self.http
                .get(self.url(&format!("/conversations/{}/messages", conversation_id))),
        )
        .await
    }

    pub async fn add_message(
        &self,
        conversation_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<MessageResponse, ClientError> {
        self.send_authed(
            self.http
                .post(self.url(&format!("/conversations/{}/messages", conversation_id)))
                .json(&AddMessageRequest::new(role, content)),
        )
        .await
    }

    /// Insert several messages in one transaction, in the given order
    pub async fn add_messages(
        &self,
        conversation_id: Uuid,
        messages: Vec<AddMessageRequest>,
    ) -> Result<BulkMessagesResponse, ClientError> {
        let body = BulkMessagesRequest {
            messages: Some(messages),
        };
        self.send_authed(
            self.http
                .post(self.url(&format!("/conversations/{}/messages/bulk", conversation_id)))
                .json(&body),
        )
        .await
    }

    // Settings

    pub async fn get_settings(&self) -> Result<UserSettings, ClientError> {
        self.send_authed(self.http.get(self.url("/settings"))).await
    }

    pub async fn update_settings(
        &self,
        request: &UpdateSettingsRequest,
    ) -> Result<UserSettings, ClientError> {
        self.send_authed(self.http.put(self.url("/settings")).json(request))
            .await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(self.http.get(self.url("/health"))).await
    }
}
