//! Generation configuration parameters

use serde::{Deserialize, Serialize};

/// Parameters for controlling text generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum number of tokens to generate
    pub max_output_tokens: u32,
    /// Randomness (0.0-2.0, higher = more random)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl GenerationConfig {
    pub fn new(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            temperature: None,
            top_p: None,
            top_k: None,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the top_p value
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set the top_k value
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

impl Default for GenerationConfig {
    /// Conversational defaults: fairly warm sampling, short replies
    fn default() -> Self {
        Self {
            max_output_tokens: 1024,
            temperature: Some(0.9),
            top_p: Some(0.95),
            top_k: Some(40),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_has_no_sampling_overrides() {
        let config = GenerationConfig::new(2048);
        assert_eq!(config.max_output_tokens, 2048);
        assert!(config.temperature.is_none());
        assert!(config.top_p.is_none());
        assert!(config.top_k.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = GenerationConfig::new(256)
            .with_temperature(0.2)
            .with_top_p(0.5)
            .with_top_k(8);

        assert_eq!(config.temperature, Some(0.2));
        assert_eq!(config.top_p, Some(0.5));
        assert_eq!(config.top_k, Some(8));
    }
}
