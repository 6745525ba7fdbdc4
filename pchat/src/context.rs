//! Layered system-context assembly.
//!
//! Layers run from general to specific: the process-wide default context, the account-wide
//! default stored under [`ConversationId::USER_DEFAULT`], then the conversation's own
//! context. Each present, non-empty layer becomes one system message ahead of the history.
//!
//! ```rust
//! use pchat::ContextLayers;
//! use pcommon::ConversationId;
//! use pprovider::{Message, Role};
//!
//! let conversation = ConversationId::from("demo");
//! let layers = ContextLayers {
//!     process_default: Some("You are terse.".to_string()),
//!     user_default: None,
//!     conversation: Some("".to_string()),
//! };
//!
//! let messages = layers.apply(&conversation, vec![Message::new("demo", Role::User, "Hi")]);
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[0].role, Role::System);
//! assert_eq!(messages[0].content, "You are terse.");
//! ```

use pcommon::ConversationId;
use pprovider::{Message, Role};

use crate::{ChatError, MessageStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextLayers {
    pub process_default: Option<String>,
    pub user_default: Option<String>,
    pub conversation: Option<String>,
}

impl ContextLayers {
    /// Prepends one system message per non-empty layer to `history`.
    pub fn apply(self, conversation_id: &ConversationId, history: Vec<Message>) -> Vec<Message> {
        let layers = [self.process_default, self.user_default, self.conversation];
        let mut messages = Vec::with_capacity(layers.len() + history.len());

        messages.extend(
            layers
                .into_iter()
                .flatten()
                .filter(|text| !text.is_empty())
                .map(|text| Message::new(conversation_id.clone(), Role::System, text)),
        );
        messages.extend(history);
        messages
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    default_context: String,
}

impl ContextAssembler {
    pub fn new(default_context: impl Into<String>) -> Self {
        Self {
            default_context: default_context.into(),
        }
    }

    pub fn default_context(&self) -> &str {
        &self.default_context
    }

    /// Resolves which layers apply to a turn.
    ///
    /// `include_system_context` gates the process and account defaults only. The
    /// conversation's own context always applies, except for the account-default
    /// conversation whose text is already the second layer.
    pub async fn layers(
        &self,
        store: &dyn MessageStore,
        conversation_id: &ConversationId,
        include_system_context: bool,
    ) -> Result<ContextLayers, ChatError> {
        let mut layers = ContextLayers::default();

        if include_system_context {
            layers.process_default = Some(self.default_context.clone());
            layers.user_default = stored_context(store, &ConversationId::user_default()).await?;
        }

        if !(include_system_context && conversation_id.is_user_default()) {
            layers.conversation = stored_context(store, conversation_id).await?;
        }

        Ok(layers)
    }

    pub async fn assemble(
        &self,
        store: &dyn MessageStore,
        history: Vec<Message>,
        conversation_id: &ConversationId,
        include_system_context: bool,
    ) -> Result<Vec<Message>, ChatError> {
        let layers = self
            .layers(store, conversation_id, include_system_context)
            .await?;
        Ok(layers.apply(conversation_id, history))
    }
}

async fn stored_context(
    store: &dyn MessageStore,
    conversation_id: &ConversationId,
) -> Result<Option<String>, ChatError> {
    if !store.context_exists(conversation_id).await? {
        return Ok(None);
    }

    let message = store.context_message(conversation_id).await?;
    Ok(Some(message.content))
}

#[cfg(test)]
mod tests {
    use pcommon::ConversationId;
    use pprovider::{Message, Role};

    use crate::{InMemoryMessageStore, MessageStore};

    use super::{ContextAssembler, ContextLayers};

    fn layer(present: bool, text: &str) -> Option<String> {
        present.then(|| text.to_string())
    }

    #[test]
    fn every_layer_combination_keeps_general_to_specific_order() {
        let conversation = ConversationId::from("c");
        let history = vec![
            Message::new("c", Role::User, "h1"),
            Message::new("c", Role::Assistant, "h2"),
        ];

        for mask in 0..8_u8 {
            let (process, user, own) = (mask & 1 != 0, mask & 2 != 0, mask & 4 != 0);
            let layers = ContextLayers {
                process_default: layer(process, "process"),
                user_default: layer(user, "user"),
                conversation: layer(own, "own"),
            };

            let messages = layers.apply(&conversation, history.clone());

            let mut expected = Vec::new();
            for (present, text) in [(process, "process"), (user, "user"), (own, "own")] {
                if present {
                    expected.push((Role::System, text));
                }
            }
            expected.push((Role::User, "h1"));
            expected.push((Role::Assistant, "h2"));

            let actual = messages
                .iter()
                .map(|message| (message.role, message.content.as_str()))
                .collect::<Vec<_>>();
            assert_eq!(actual, expected, "layer mask {mask:03b}");
            assert!(
                messages
                    .iter()
                    .all(|message| message.conversation_id == conversation)
            );
        }
    }

    #[test]
    fn absent_and_empty_layers_leave_history_unchanged() {
        let conversation = ConversationId::from("c");
        let history = vec![Message::new("c", Role::User, "h1")];

        assert_eq!(
            ContextLayers::default().apply(&conversation, history.clone()),
            history
        );

        let empty = ContextLayers {
            process_default: Some(String::new()),
            user_default: Some(String::new()),
            conversation: Some(String::new()),
        };
        assert_eq!(empty.apply(&conversation, history.clone()), history);
    }

    #[tokio::test]
    async fn assembler_reads_account_and_conversation_layers_from_store() {
        let store = InMemoryMessageStore::new();
        let conversation = ConversationId::from("c");
        store
            .update_context(&ConversationId::user_default(), "account")
            .await
            .expect("update");
        store.update_context(&conversation, "own").await.expect("update");

        let assembler = ContextAssembler::new("process");
        let layers = assembler
            .layers(&store, &conversation, true)
            .await
            .expect("layers");
        assert_eq!(
            layers,
            ContextLayers {
                process_default: Some("process".to_string()),
                user_default: Some("account".to_string()),
                conversation: Some("own".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn disabling_system_context_keeps_only_conversation_layer() {
        let store = InMemoryMessageStore::new();
        let conversation = ConversationId::from("c");
        store
            .update_context(&ConversationId::user_default(), "account")
            .await
            .expect("update");
        store.update_context(&conversation, "own").await.expect("update");

        let messages = ContextAssembler::new("process")
            .assemble(&store, Vec::new(), &conversation, false)
            .await
            .expect("assemble");
        let contents = messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["own"]);
    }

    #[tokio::test]
    async fn account_default_conversation_is_not_injected_twice() {
        let store = InMemoryMessageStore::new();
        let account = ConversationId::user_default();
        store.update_context(&account, "account").await.expect("update");

        let messages = ContextAssembler::new("")
            .assemble(&store, Vec::new(), &account, true)
            .await
            .expect("assemble");
        let contents = messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["account"]);
    }

    #[tokio::test]
    async fn missing_rows_contribute_nothing() {
        let store = InMemoryMessageStore::new();
        let layers = ContextAssembler::default()
            .layers(&store, &ConversationId::from("unknown"), true)
            .await
            .expect("layers");

        assert_eq!(layers.user_default, None);
        assert_eq!(layers.conversation, None);
        assert_eq!(layers.process_default.as_deref(), Some(""));
    }
}
