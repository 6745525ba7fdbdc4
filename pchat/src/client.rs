//! Conversation turn orchestration.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use pcommon::{ConversationId, MessageId};
use pprovider::{BackendId, ChatBackend, Message, Role};

use crate::{
    ChatConfig, ChatError, ChatHooks, ChatTurnRequest, ChatTurnResult, ContextAssembler,
    MessageStore, NoopChatHooks,
};

pub struct ChatClientBuilder {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn MessageStore>,
    config: ChatConfig,
    hooks: Arc<dyn ChatHooks>,
}

impl ChatClientBuilder {
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<dyn MessageStore>) -> Self {
        Self {
            backend,
            store,
            config: ChatConfig::default(),
            hooks: Arc::new(NoopChatHooks),
        }
    }

    pub fn config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ChatHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> ChatClient {
        ChatClient {
            backend: self.backend,
            store: self.store,
            assembler: ContextAssembler::new(self.config.default_context.clone()),
            config: self.config,
            hooks: self.hooks,
        }
    }
}

/// Sends user messages through a backend while keeping per-conversation history.
#[derive(Clone)]
pub struct ChatClient {
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn MessageStore>,
    assembler: ContextAssembler,
    config: ChatConfig,
    hooks: Arc<dyn ChatHooks>,
}

impl ChatClient {
    pub fn new(backend: Arc<dyn ChatBackend>, store: Arc<dyn MessageStore>) -> Self {
        ChatClientBuilder::new(backend, store).build()
    }

    pub fn builder(
        backend: Arc<dyn ChatBackend>,
        store: Arc<dyn MessageStore>,
    ) -> ChatClientBuilder {
        ChatClientBuilder::new(backend, store)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn backend_id(&self) -> BackendId {
        self.backend.id()
    }

    pub fn store(&self) -> &Arc<dyn MessageStore> {
        &self.store
    }

    /// Sends `content` in `conversation_id` and returns the assistant reply text.
    pub async fn send_message(
        &self,
        content: impl Into<String>,
        conversation_id: &str,
        history_depth: usize,
        include_system_context: bool,
    ) -> Result<String, ChatError> {
        let request = ChatTurnRequest::new(conversation_id, content)
            .with_history_depth(history_depth)
            .with_system_context(include_system_context);

        Ok(self.run_turn(request).await?.reply)
    }

    /// Like [`ChatClient::send_message`] with the configured depth and context switch.
    pub async fn send(
        &self,
        content: impl Into<String>,
        conversation_id: &str,
    ) -> Result<String, ChatError> {
        Ok(self
            .run_turn(ChatTurnRequest::new(conversation_id, content))
            .await?
            .reply)
    }

    /// Sends without reading any conversation history.
    pub async fn send_ephemeral(&self, content: impl Into<String>) -> Result<String, ChatError> {
        Ok(self.run_turn(ChatTurnRequest::ephemeral(content)).await?.reply)
    }

    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let conversation_id = ConversationId::resolve(request.conversation_id.as_str());
        let history_depth = request.history_depth.unwrap_or(self.config.history_depth);
        let include_system_context = request
            .include_system_context
            .unwrap_or(self.config.include_system_context);

        let started_at = Instant::now();
        self.hooks.on_turn_start(&conversation_id, history_depth);

        let result = self
            .execute_turn(
                conversation_id.clone(),
                request.content,
                history_depth,
                include_system_context,
            )
            .await;

        match &result {
            Ok(_) => self
                .hooks
                .on_turn_success(&conversation_id, started_at.elapsed()),
            Err(error) => {
                self.hooks
                    .on_turn_failure(&conversation_id, error, started_at.elapsed())
            }
        }

        result
    }

    async fn execute_turn(
        &self,
        conversation_id: ConversationId,
        content: String,
        history_depth: usize,
        include_system_context: bool,
    ) -> Result<ChatTurnResult, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::invalid_request("message content must not be empty"));
        }

        self.store.ensure_context(&conversation_id).await?;

        let history = if conversation_id.is_ephemeral() || history_depth == 0 {
            Vec::new()
        } else {
            self.store
                .recent_messages(&conversation_id, history_depth)
                .await?
        };

        let mut messages = self
            .assembler
            .assemble(
                self.store.as_ref(),
                history,
                &conversation_id,
                include_system_context,
            )
            .await?;

        // Persisted before dispatch and kept even if the backend fails.
        let mut user_message = Message::new(conversation_id.clone(), Role::User, content);
        let user_message_id = self.store.store_message(user_message.clone()).await?;
        user_message.id = user_message_id.clone();
        let user_timestamp = user_message.timestamp;
        messages.push(user_message);

        let dispatched = messages.len();
        self.hooks
            .on_context_assembled(&conversation_id, self.backend.id(), &messages);

        let mut returned = self.backend.send(messages).await?;
        if returned.len() <= dispatched {
            return Err(ChatError::contract_violation(format!(
                "backend '{}' returned {} messages for {dispatched} dispatched, expected a reply appended",
                self.backend.id(),
                returned.len()
            )));
        }

        let mut reply = returned.pop().ok_or_else(|| {
            ChatError::contract_violation(format!(
                "backend '{}' returned no messages",
                self.backend.id()
            ))
        })?;
        if reply.role != Role::Assistant {
            return Err(ChatError::contract_violation(format!(
                "backend '{}' appended a '{}' message instead of an assistant reply",
                self.backend.id(),
                reply.role
            )));
        }

        reply.conversation_id = conversation_id.clone();
        reply.timestamp = reply.timestamp.max(user_timestamp);
        let reply_message_id = self.store.store_message(reply.clone()).await?;

        Ok(ChatTurnResult {
            conversation_id,
            reply: reply.content,
            user_message_id,
            reply_message_id,
            dispatched,
        })
    }

    /// Replaces the context text of one conversation, creating it if needed.
    pub async fn set_conversation_context(
        &self,
        conversation_id: &str,
        context: &str,
    ) -> Result<(), ChatError> {
        self.store
            .update_context(&ConversationId::from(conversation_id), context)
            .await
    }

    /// Replaces the account-wide context merged into every turn.
    pub async fn set_user_default_context(&self, context: &str) -> Result<(), ChatError> {
        self.store
            .update_context(&ConversationId::user_default(), context)
            .await
    }

    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<Message>, ChatError> {
        self.store
            .all_messages(&ConversationId::from(conversation_id))
            .await
    }

    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ChatError> {
        self.store
            .delete_conversation(&ConversationId::from(conversation_id))
            .await
    }

    pub async fn delete_message(&self, message_id: &MessageId) -> Result<bool, ChatError> {
        self.store.delete_message(message_id).await
    }

    pub async fn conversation_ids(&self) -> Result<BTreeSet<ConversationId>, ChatError> {
        self.store.conversation_ids().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pcommon::{BoxFuture, ConversationId};
    use pprovider::{BackendError, BackendId, ChatBackend, Message};

    use crate::{ChatError, ChatErrorKind, ChatHooks, InMemoryMessageStore, MessageStore};

    use super::ChatClient;

    #[derive(Debug)]
    struct SilentBackend;

    impl ChatBackend for SilentBackend {
        fn id(&self) -> BackendId {
            BackendId::OpenAi
        }

        fn send<'a>(
            &'a self,
            _messages: Vec<Message>,
        ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ChatHooks for RecordingHooks {
        fn on_turn_start(&self, conversation_id: &ConversationId, history_depth: usize) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{conversation_id}:{history_depth}"));
        }

        fn on_context_assembled(
            &self,
            _conversation_id: &ConversationId,
            backend: BackendId,
            messages: &[Message],
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("assembled:{backend}:{}", messages.len()));
        }

        fn on_turn_failure(
            &self,
            _conversation_id: &ConversationId,
            error: &ChatError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{:?}", error.kind));
        }
    }

    #[tokio::test]
    async fn blank_content_is_rejected_without_touching_the_store() {
        let store = Arc::new(InMemoryMessageStore::new());
        let client = ChatClient::new(Arc::new(SilentBackend), store.clone());

        let error = client.send("   ", "demo").await.expect_err("blank content");
        assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
        assert!(store.conversation_ids().await.expect("ids").is_empty());
    }

    #[tokio::test]
    async fn hooks_observe_contract_violation() {
        let hooks = Arc::new(RecordingHooks::default());
        let client = ChatClient::builder(
            Arc::new(SilentBackend),
            Arc::new(InMemoryMessageStore::new()),
        )
        .hooks(hooks.clone())
        .build();

        let error = client
            .send_message("Hi", "demo", 3, true)
            .await
            .expect_err("empty backend output");
        assert_eq!(error.kind, ChatErrorKind::ContractViolation);

        let events = hooks.events.lock().expect("events lock").clone();
        assert_eq!(
            events,
            vec![
                "start:demo:3".to_string(),
                "assembled:openai:1".to_string(),
                "failure:ContractViolation".to_string(),
            ]
        );
    }
}
