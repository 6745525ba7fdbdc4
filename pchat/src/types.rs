//! Client configuration and turn request/result types.

use pcommon::{ConversationId, MessageId};

pub const DEFAULT_HISTORY_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Process-wide context prepended to every turn that includes system context.
    pub default_context: String,
    /// Number of prior messages loaded into each turn.
    pub history_depth: usize,
    pub include_system_context: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_context: String::new(),
            history_depth: DEFAULT_HISTORY_DEPTH,
            include_system_context: true,
        }
    }
}

impl ChatConfig {
    pub fn with_default_context(mut self, default_context: impl Into<String>) -> Self {
        self.default_context = default_context.into();
        self
    }

    pub fn with_history_depth(mut self, history_depth: usize) -> Self {
        self.history_depth = history_depth;
        self
    }

    pub fn with_system_context(mut self, include_system_context: bool) -> Self {
        self.include_system_context = include_system_context;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnRequest {
    /// Caller-supplied id; blank input or the ephemeral sentinel disables history.
    pub conversation_id: ConversationId,
    pub content: String,
    pub history_depth: Option<usize>,
    pub include_system_context: Option<bool>,
}

impl ChatTurnRequest {
    pub fn new(conversation_id: impl Into<ConversationId>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            history_depth: None,
            include_system_context: None,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::new(ConversationId::ephemeral(), content)
    }

    pub fn with_history_depth(mut self, history_depth: usize) -> Self {
        self.history_depth = Some(history_depth);
        self
    }

    pub fn with_system_context(mut self, include_system_context: bool) -> Self {
        self.include_system_context = Some(include_system_context);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub conversation_id: ConversationId,
    pub reply: String,
    pub user_message_id: MessageId,
    pub reply_message_id: MessageId,
    /// Number of messages sent to the backend, context layers included.
    pub dispatched: usize,
}

#[cfg(test)]
mod tests {
    use super::{ChatConfig, ChatTurnRequest};

    #[test]
    fn config_defaults_match_documented_values() {
        let config = ChatConfig::default();
        assert_eq!(config.default_context, "");
        assert_eq!(config.history_depth, 5);
        assert!(config.include_system_context);
    }

    #[test]
    fn turn_request_overrides_are_optional() {
        let request = ChatTurnRequest::new("demo", "Hi");
        assert_eq!(request.history_depth, None);
        assert_eq!(request.include_system_context, None);

        let request = ChatTurnRequest::ephemeral("Hi")
            .with_history_depth(0)
            .with_system_context(false);
        assert!(request.conversation_id.is_ephemeral());
        assert_eq!(request.history_depth, Some(0));
        assert_eq!(request.include_system_context, Some(false));
    }
}
