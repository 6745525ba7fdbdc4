use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pchat::{ChatError, ChatHooks};
use pcommon::ConversationId;
use pprovider::{BackendId, Message};

/// Wraps hooks so a panicking callback never aborts the turn it observes.
pub struct SafeChatHooks<H> {
    inner: H,
}

impl<H> SafeChatHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> ChatHooks for SafeChatHooks<H>
where
    H: ChatHooks,
{
    fn on_turn_start(&self, conversation_id: &ConversationId, history_depth: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(conversation_id, history_depth)
        }));
    }

    fn on_context_assembled(
        &self,
        conversation_id: &ConversationId,
        backend: BackendId,
        messages: &[Message],
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_context_assembled(conversation_id, backend, messages)
        }));
    }

    fn on_turn_success(&self, conversation_id: &ConversationId, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_success(conversation_id, elapsed)
        }));
    }

    fn on_turn_failure(&self, conversation_id: &ConversationId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_failure(conversation_id, error, elapsed)
        }));
    }
}
