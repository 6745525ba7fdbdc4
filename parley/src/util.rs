//! Small convenience constructors for common types.

use crate::{BackendId, ChatTurnRequest, ConversationId, Message, Role};

pub fn system_message(conversation_id: impl Into<ConversationId>, content: impl Into<String>) -> Message {
    Message::new(conversation_id, Role::System, content)
}

pub fn user_message(conversation_id: impl Into<ConversationId>, content: impl Into<String>) -> Message {
    Message::new(conversation_id, Role::User, content)
}

pub fn assistant_message(
    conversation_id: impl Into<ConversationId>,
    content: impl Into<String>,
) -> Message {
    Message::new(conversation_id, Role::Assistant, content)
}

pub fn turn(conversation_id: impl Into<ConversationId>, content: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::new(conversation_id, content)
}

pub fn ephemeral_turn(content: impl Into<String>) -> ChatTurnRequest {
    ChatTurnRequest::ephemeral(content)
}

pub fn parse_backend_id(value: &str) -> Option<BackendId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "openai" | "open-ai" | "gpt" => Some(BackendId::OpenAi),
        "palm" | "vertex" | "google" => Some(BackendId::Palm),
        "ollama" | "local" | "llama" => Some(BackendId::Ollama),
        _ => None,
    }
}
