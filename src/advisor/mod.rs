//! Chat Client: single-shot and streaming conversations with the
//! nutritionist persona. Prior turns are replayed to the collaborator in both
//! modes so multi-turn answers stay coherent.

use crate::client::{Content, ContentStream, DynGenAiClient, GenAiError, GenerateContentRequest};
use crate::config::ModelSettings;

mod prompt;
mod types;

pub use types::{ChatMessage, ChatRole};

use prompt::NUTRITIONIST_SYSTEM_PROMPT;


/// Prior turns plus the new user message, as upstream conversation contents.
///
/// Leading assistant turns (the fixed greeting) are skipped so the replayed
/// conversation always opens with a user turn.
fn conversation_contents(history: &[ChatMessage], message: &str) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .skip_while(|turn| turn.role == ChatRole::Assistant)
        .map(|turn| match turn.role {
            ChatRole::User => Content::user_text(&turn.content),
            ChatRole::Assistant => Content::model_text(&turn.content),
        })
        .collect();
    contents.push(Content::user_text(message));
    contents
}

fn conversation_request(
    models: &ModelSettings,
    history: &[ChatMessage],
    message: &str,
) -> GenerateContentRequest {
    GenerateContentRequest {
        model: models.chat.clone(),
        contents: conversation_contents(history, message),
        system_instruction: Some(Content::system_text(NUTRITIONIST_SYSTEM_PROMPT)),
        generation_config: None,
    }
}

/// Single-shot exchange: returns the full reply text.
pub async fn send_message(
    client: &DynGenAiClient,
    models: &ModelSettings,
    history: &[ChatMessage],
    message: &str,
) -> Result<String, GenAiError> {
    let response = client
        .generate_content(conversation_request(models, history, message))
        .await?;

    response
        .first_text()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| GenAiError::InvalidResponse("chat reply contained no text".to_string()))
}

/// Streaming exchange: yields reply fragments as the collaborator emits them.
pub async fn open_stream(
    client: &DynGenAiClient,
    models: &ModelSettings,
    history: &[ChatMessage],
    message: &str,
) -> Result<ContentStream, GenAiError> {
    client
        .stream_content(conversation_request(models, history, message))
        .await
}
