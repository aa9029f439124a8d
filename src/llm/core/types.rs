//! Provider-neutral request and result types

use crate::store::Role;

use super::config::GenerationConfig;

/// One message of conversation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A request to generate the next AI reply
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Conversation so far, oldest first
    pub turns: Vec<ChatTurn>,
    /// Persona or instructions sent ahead of the conversation
    pub system: Option<String>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(turns: Vec<ChatTurn>) -> Self {
        Self {
            turns,
            system: None,
            config: GenerationConfig::default(),
        }
    }

    /// Set the system instruction (builder pattern)
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the generation config (builder pattern)
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }
}

/// A successful reply and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub api_version: String,
    /// Position of the key that succeeded in the key ring
    pub key_index: usize,
    pub finish_reason: Option<String>,
}
