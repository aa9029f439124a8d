//! Errors returned by [`ChatApiClient`](super::ChatApiClient)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status and an `{error}` body
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The response body wasn't the expected JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// A token-protected call was made before signing in
    #[error("Not signed in")]
    NotSignedIn,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server could not be reached at all
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// Text to show the user, chosen by status
    ///
    /// Validation messages (400) come from the server verbatim.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { status: 400, message } => message.clone(),
            ClientError::Api { status: 401, .. } | ClientError::NotSignedIn => {
                "Please log in to continue.".to_string()
            }
            ClientError::Api { status: 403, .. } => {
                "Your session has expired. Please log in again.".to_string()
            }
            ClientError::Api { status: 404, .. } => {
                "That conversation could not be found.".to_string()
            }
            ClientError::Api { status, .. } if *status >= 500 => {
                "Server error. Please try again later.".to_string()
            }
            ClientError::Network(_) => {
                "Cannot connect to the server. Your messages are saved on this device.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
