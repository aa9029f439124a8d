//! Mapping between conversation turns and Gemini types

use crate::llm::core::{
    config::GenerationConfig,
    error::LlmError,
    types::{ChatTurn, GenerateRequest},
};
use crate::store::Role;

use super::types::{
    Content, GeminiGenerationConfig, GenerateContentRequest, GenerateContentResponse, Part,
    SystemInstruction,
};

/// Convert a generation request to Gemini's request format
///
/// `system` turns are folded into the system instruction, after any
/// explicit one, because Gemini's `contents` only accept `user` and `model`.
pub fn to_gemini_request(request: &GenerateRequest) -> GenerateContentRequest {
    let mut system_parts: Vec<Part> = request.system.iter().map(|s| Part::text(s.clone())).collect();
    let mut contents: Vec<Content> = Vec::with_capacity(request.turns.len());

    for turn in &request.turns {
        match turn.role {
            Role::System => system_parts.push(Part::text(turn.content.clone())),
            Role::User | Role::Ai => push_turn(&mut contents, turn),
        }
    }

    GenerateContentRequest {
        contents,
        system_instruction: if system_parts.is_empty() {
            None
        } else {
            Some(SystemInstruction {
                parts: system_parts,
            })
        },
        generation_config: Some(to_gemini_generation_config(&request.config)),
    }
}

/// Append a turn, merging consecutive turns from the same side
///
/// Batched user messages arrive as several turns in a row; Gemini expects
/// roles to alternate.
fn push_turn(contents: &mut Vec<Content>, turn: &ChatTurn) {
    let role = match turn.role {
        Role::Ai => "model",
        _ => "user",
    };

    match contents.last_mut() {
        Some(last) if last.role == role => last.parts.push(Part::text(turn.content.clone())),
        _ => contents.push(Content {
            role: role.to_string(),
            parts: vec![Part::text(turn.content.clone())],
        }),
    }
}

fn to_gemini_generation_config(config: &GenerationConfig) -> GeminiGenerationConfig {
    GeminiGenerationConfig {
        max_output_tokens: Some(config.max_output_tokens),
        temperature: config.temperature,
        top_p: config.top_p,
        top_k: config.top_k,
    }
}

/// Pull the reply text and finish reason out of a response
///
/// # Errors
///
/// * `LlmError::Blocked` - If the prompt or the only candidate was filtered
/// * `LlmError::EmptyResponse` - If no candidate carries any text
pub fn from_gemini_response(
    response: GenerateContentResponse,
) -> Result<(String, Option<String>), LlmError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return Err(LlmError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_default();
        if matches!(reason.as_str(), "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT") {
            return Err(LlmError::Blocked(reason));
        }
        return Err(LlmError::EmptyResponse);
    }

    Ok((text, candidate.finish_reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::gemini::types::{Candidate, PromptFeedback};

    #[test]
    fn test_roles_map_to_gemini() {
        let request = GenerateRequest::new(vec![
            ChatTurn::new(Role::User, "hi"),
            ChatTurn::new(Role::Ai, "hello"),
            ChatTurn::new(Role::User, "how are you?"),
        ]);
        let gemini = to_gemini_request(&request);

        let roles: Vec<&str> = gemini.contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert!(gemini.system_instruction.is_none());
    }

    #[test]
    fn test_system_turns_become_instruction() {
        let request = GenerateRequest::new(vec![
            ChatTurn::new(Role::System, "Be kind."),
            ChatTurn::new(Role::User, "hi"),
        ])
        .with_system("You are a supportive companion.");
        let gemini = to_gemini_request(&request);

        let parts = gemini.system_instruction.unwrap().parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("You are a supportive companion."));
        assert_eq!(parts[1].text.as_deref(), Some("Be kind."));
        assert_eq!(gemini.contents.len(), 1);
    }

    #[test]
    fn test_consecutive_user_turns_merge() {
        let request = GenerateRequest::new(vec![
            ChatTurn::new(Role::User, "first"),
            ChatTurn::new(Role::User, "second"),
        ]);
        let gemini = to_gemini_request(&request);

        assert_eq!(gemini.contents.len(), 1);
        assert_eq!(gemini.contents[0].parts.len(), 2);
    }

    fn response_with(text: Option<&str>, finish: Option<&str>) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![Candidate {
                content: text.map(|t| Content {
                    role: "model".to_string(),
                    parts: vec![Part::text(t)],
                }),
                finish_reason: finish.map(str::to_string),
            }],
            prompt_feedback: None,
            usage_metadata: None,
        }
    }

    #[test]
    fn test_extracts_text() {
        let (text, finish) = from_gemini_response(response_with(Some("Hi!"), Some("STOP"))).unwrap();
        assert_eq!(text, "Hi!");
        assert_eq!(finish.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_blocked_and_empty() {
        let blocked = GenerateContentResponse {
            prompt_feedback: Some(PromptFeedback {
                block_reason: Some("SAFETY".to_string()),
            }),
            ..Default::default()
        };
        assert!(matches!(from_gemini_response(blocked), Err(LlmError::Blocked(_))));

        assert!(matches!(
            from_gemini_response(response_with(None, Some("SAFETY"))),
            Err(LlmError::Blocked(_))
        ));
        assert!(matches!(
            from_gemini_response(GenerateContentResponse::default()),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            from_gemini_response(response_with(Some("  "), Some("MAX_TOKENS"))),
            Err(LlmError::EmptyResponse)
        ));
    }
}
