use std::fmt::{Display, Formatter};

use pcommon::{BoxFuture, ConversationId};

use crate::{BackendError, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendId {
    OpenAi,
    Palm,
    Ollama,
}

impl Display for BackendId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::OpenAi => "openai",
            Self::Palm => "palm",
            Self::Ollama => "ollama",
        };

        f.write_str(id)
    }
}

/// A language-model service that continues a conversation.
///
/// `send` returns the input sequence unchanged and in order, followed by at least one
/// assistant message.
pub trait ChatBackend: Send + Sync {
    fn id(&self) -> BackendId;

    fn send<'a>(
        &'a self,
        messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>>;
}

/// Conversation replies are attributed to, taken from the first input message.
pub fn reply_conversation(messages: &[Message]) -> Result<ConversationId, BackendError> {
    messages
        .first()
        .map(|message| message.conversation_id.clone())
        .ok_or_else(|| {
            BackendError::invalid_request("backend request requires at least one message")
        })
}
