//! Tracing-based hooks for conversation turns.
//!
//! ```rust
//! use pchat::ChatHooks;
//! use pobserve::TracingChatHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatHooks) {}
//!
//! let hooks = TracingChatHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::{ChatError, ChatHooks};
use pcommon::ConversationId;
use pprovider::{BackendId, Message, Role};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChatHooks;

impl ChatHooks for TracingChatHooks {
    fn on_turn_start(&self, conversation_id: &ConversationId, history_depth: usize) {
        tracing::info!(
            phase = "turn",
            event = "start",
            conversation_id = %conversation_id,
            ephemeral = conversation_id.is_ephemeral(),
            history_depth
        );
    }

    fn on_context_assembled(
        &self,
        conversation_id: &ConversationId,
        backend: BackendId,
        messages: &[Message],
    ) {
        let system_messages = messages
            .iter()
            .filter(|message| message.role == Role::System)
            .count();
        tracing::debug!(
            phase = "turn",
            event = "context_assembled",
            conversation_id = %conversation_id,
            backend = %backend,
            messages = messages.len(),
            system_messages
        );
    }

    fn on_turn_success(&self, conversation_id: &ConversationId, elapsed: Duration) {
        tracing::info!(
            phase = "turn",
            event = "success",
            conversation_id = %conversation_id,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "turn",
            event = "failure",
            conversation_id = %conversation_id,
            error_kind = ?error.kind,
            backend_error_kind = ?error.backend_kind,
            retryable = error.is_retryable(),
            elapsed_ms = elapsed.as_millis() as u64,
            error = %error
        );
    }
}
