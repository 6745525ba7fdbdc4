//! Hook contracts for observing conversation turns.
//!
//! ```rust
//! use pchat::{ChatHooks, NoopChatHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ChatHooks) {}
//!
//! let hooks = NoopChatHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use pcommon::ConversationId;
use pprovider::{BackendId, Message};

use crate::ChatError;

pub trait ChatHooks: Send + Sync {
    fn on_turn_start(&self, _conversation_id: &ConversationId, _history_depth: usize) {}

    /// Called with the full sequence about to be dispatched to the backend.
    fn on_context_assembled(
        &self,
        _conversation_id: &ConversationId,
        _backend: BackendId,
        _messages: &[Message],
    ) {
    }

    fn on_turn_success(&self, _conversation_id: &ConversationId, _elapsed: Duration) {}

    fn on_turn_failure(
        &self,
        _conversation_id: &ConversationId,
        _error: &ChatError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatHooks;

impl ChatHooks for NoopChatHooks {}
