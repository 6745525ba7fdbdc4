//! Metrics-based hooks for conversation turns.
//!
//! Emits `parley_chat_turn_start_total`, `parley_chat_turn_success_total`,
//! `parley_chat_turn_failure_total`, `parley_chat_turn_duration_seconds` and
//! `parley_chat_context_messages` through whichever `metrics` recorder is installed.

use std::time::Duration;

use pchat::{ChatError, ChatHooks};
use pcommon::ConversationId;
use pprovider::{BackendId, Message};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsChatHooks;

impl ChatHooks for MetricsChatHooks {
    fn on_turn_start(&self, conversation_id: &ConversationId, _history_depth: usize) {
        metrics::counter!(
            "parley_chat_turn_start_total",
            "ephemeral" => conversation_id.is_ephemeral().to_string()
        )
        .increment(1);
    }

    fn on_context_assembled(
        &self,
        _conversation_id: &ConversationId,
        backend: BackendId,
        messages: &[Message],
    ) {
        metrics::histogram!(
            "parley_chat_context_messages",
            "backend" => backend.to_string()
        )
        .record(messages.len() as f64);
    }

    fn on_turn_success(&self, _conversation_id: &ConversationId, elapsed: Duration) {
        metrics::counter!("parley_chat_turn_success_total").increment(1);
        metrics::histogram!(
            "parley_chat_turn_duration_seconds",
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_turn_failure(
        &self,
        _conversation_id: &ConversationId,
        error: &ChatError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_chat_turn_failure_total",
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "parley_chat_turn_duration_seconds",
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
