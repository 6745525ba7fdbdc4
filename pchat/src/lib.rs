//! Conversation orchestration over chat backends and message stores.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pchat::{ChatClient, ChatConfig, InMemoryMessageStore};
//! use pprovider::{BackendError, BackendId, BoxFuture, ChatBackend, Message, Role};
//!
//! struct Terse;
//!
//! impl ChatBackend for Terse {
//!     fn id(&self) -> BackendId {
//!         BackendId::Ollama
//!     }
//!
//!     fn send<'a>(
//!         &'a self,
//!         mut messages: Vec<Message>,
//!     ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
//!         Box::pin(async move {
//!             let conversation_id = messages[0].conversation_id.clone();
//!             messages.push(Message::new(conversation_id, Role::Assistant, "Hello."));
//!             Ok(messages)
//!         })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pchat::ChatError> {
//! let store = Arc::new(InMemoryMessageStore::new());
//! let client = ChatClient::builder(Arc::new(Terse), store)
//!     .config(ChatConfig::default().with_default_context("You are terse."))
//!     .build();
//!
//! let reply = client.send("Hi", "demo").await?;
//! assert_eq!(reply, "Hello.");
//! assert_eq!(client.conversation_history("demo").await?.len(), 2);
//! # Ok(())
//! # }
//! ```

mod client;
mod context;
mod error;
mod hooks;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatClient, ChatClientBuilder, ChatConfig, ChatError, ChatErrorKind, ChatHooks,
        ChatTurnRequest, ChatTurnResult, ContextAssembler, ContextLayers, InMemoryMessageStore,
        MessageStore, NoopChatHooks,
    };
    pub use pcommon::{ConversationId, MessageId};
}

pub use client::{ChatClient, ChatClientBuilder};
pub use context::{ContextAssembler, ContextLayers};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ChatHooks, NoopChatHooks};
pub use store::{InMemoryMessageStore, MessageStore};
pub use types::{ChatConfig, ChatTurnRequest, ChatTurnResult};
pub use pcommon::{BoxFuture, ConversationId, MessageId};
