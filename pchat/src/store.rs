//! Message storage contract and a basic in-memory implementation.
//!
//! A conversation exists once it has a context row. Writing a message creates that row on
//! demand, and deleting a conversation removes the row together with all of its messages.
//! History reads are returned oldest first.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use pcommon::{BoxFuture, ConversationId, MessageId};
use pprovider::{Message, Role};

use crate::ChatError;

pub trait MessageStore: Send + Sync {
    fn context_exists<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<bool, ChatError>>;

    /// Fails if the conversation already has a context row.
    fn create_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>>;

    /// Creates the context row if it is missing, otherwise replaces its text.
    fn update_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>>;

    /// Returns the context text as a system message. Fails if no row exists.
    fn context_message<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Message, ChatError>>;

    /// Creates an empty context row unless one exists.
    ///
    /// The provided version tolerates a row created between its check and its insert.
    /// Stores with an atomic insert-if-missing should override it.
    fn ensure_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            if self.context_exists(conversation_id).await? {
                return Ok(());
            }

            if let Err(error) = self.create_context(conversation_id, "").await
                && !self.context_exists(conversation_id).await?
            {
                return Err(error);
            }
            Ok(())
        })
    }

    /// Persists a message, assigning an id when it has none.
    fn store_message<'a>(
        &'a self,
        message: Message,
    ) -> BoxFuture<'a, Result<MessageId, ChatError>>;

    /// The `limit` most recent messages, returned oldest first.
    fn recent_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>>;

    fn all_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>>;

    fn message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<Option<Message>, ChatError>>;

    /// Returns whether a message was removed.
    fn delete_message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<bool, ChatError>>;

    fn delete_conversation<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>>;

    fn conversation_ids<'a>(&'a self) -> BoxFuture<'a, Result<BTreeSet<ConversationId>, ChatError>>;
}

#[derive(Debug, Default)]
struct ConversationState {
    context: String,
    messages: Vec<Message>,
}

#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    conversations: Mutex<HashMap<ConversationId, ConversationState>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn conversations(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ConversationId, ConversationState>>, ChatError> {
        self.conversations
            .lock()
            .map_err(|_| ChatError::store("message store lock poisoned"))
    }
}

impl MessageStore for InMemoryMessageStore {
    fn context_exists<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move { Ok(self.conversations()?.contains_key(conversation_id)) })
    }

    fn create_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut conversations = self.conversations()?;
            if conversations.contains_key(conversation_id) {
                return Err(ChatError::store(format!(
                    "context for conversation '{conversation_id}' already exists"
                )));
            }

            conversations.insert(
                conversation_id.clone(),
                ConversationState {
                    context: context.to_string(),
                    messages: Vec::new(),
                },
            );
            Ok(())
        })
    }

    fn update_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.conversations()?
                .entry(conversation_id.clone())
                .or_default()
                .context = context.to_string();
            Ok(())
        })
    }

    fn context_message<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Message, ChatError>> {
        Box::pin(async move {
            let conversations = self.conversations()?;
            let state = conversations.get(conversation_id).ok_or_else(|| {
                ChatError::store(format!("no context for conversation '{conversation_id}'"))
            })?;

            Ok(Message::new(
                conversation_id.clone(),
                Role::System,
                state.context.clone(),
            ))
        })
    }

    fn ensure_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.conversations()?
                .entry(conversation_id.clone())
                .or_default();
            Ok(())
        })
    }

    fn store_message<'a>(
        &'a self,
        mut message: Message,
    ) -> BoxFuture<'a, Result<MessageId, ChatError>> {
        Box::pin(async move {
            let id = message.ensure_id().clone();
            let mut conversations = self.conversations()?;
            let duplicate = conversations
                .values()
                .flat_map(|state| state.messages.iter())
                .any(|stored| stored.id == id);
            if duplicate {
                return Err(ChatError::store(format!("message '{id}' is already stored")));
            }

            let messages = &mut conversations
                .entry(message.conversation_id.clone())
                .or_default()
                .messages;
            let position = messages.partition_point(|stored| stored.timestamp <= message.timestamp);
            messages.insert(position, message);
            Ok(id)
        })
    }

    fn recent_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let conversations = self.conversations()?;
            let Some(state) = conversations.get(conversation_id) else {
                return Ok(Vec::new());
            };

            let skip = state.messages.len().saturating_sub(limit);
            Ok(state.messages[skip..].to_vec())
        })
    }

    fn all_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .conversations()?
                .get(conversation_id)
                .map(|state| state.messages.clone())
                .unwrap_or_default())
        })
    }

    fn message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<Option<Message>, ChatError>> {
        Box::pin(async move {
            Ok(self
                .conversations()?
                .values()
                .flat_map(|state| state.messages.iter())
                .find(|message| &message.id == message_id)
                .cloned())
        })
    }

    fn delete_message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move {
            let mut conversations = self.conversations()?;
            for state in conversations.values_mut() {
                if let Some(index) = state
                    .messages
                    .iter()
                    .position(|message| &message.id == message_id)
                {
                    state.messages.remove(index);
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    fn delete_conversation<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            self.conversations()?.remove(conversation_id);
            Ok(())
        })
    }

    fn conversation_ids<'a>(&'a self) -> BoxFuture<'a, Result<BTreeSet<ConversationId>, ChatError>> {
        Box::pin(async move { Ok(self.conversations()?.keys().cloned().collect()) })
    }
}
