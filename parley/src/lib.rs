//! Unified facade over the parley workspace crates.
//!
//! This crate is meant to be the single dependency for most applications. It re-exports
//! the workspace crates and adds helpers for building a backend from configuration and
//! wiring it to a message store.
//!
//! ```rust,no_run
//! use parley::{BackendBuildConfig, BackendId, ChatConfig, build_backend, chat_client, sqlite_store};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = build_backend(
//!     BackendBuildConfig::new(BackendId::OpenAi).with_credential("sk-..."),
//! )?;
//! let client = chat_client(
//!     backend,
//!     sqlite_store("messages.sqlite3")?,
//!     ChatConfig::default().with_default_context("You are terse."),
//! );
//!
//! let reply = client.send_message("Hi", "demo", 5, true).await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod backends;
pub mod prelude;
pub mod runtime;
pub mod util;

pub use pchat;
pub use pcommon;
pub use pmemory;
pub use pobserve;
pub use pprovider;

pub use pchat::{
    ChatClient, ChatClientBuilder, ChatConfig, ChatError, ChatErrorKind, ChatHooks,
    ChatTurnRequest, ChatTurnResult, ContextAssembler, ContextLayers, InMemoryMessageStore,
    MessageStore, NoopChatHooks,
};
pub use pcommon::{BoxFuture, ConversationId, GenerationOptions, MessageId};
pub use pmemory::{
    MemoryError, MemoryErrorKind, MessageStoreConfig, SqliteMessageStore, create_message_store,
    default_sqlite_path,
};
pub use pobserve::{MetricsChatHooks, SafeChatHooks, TracingChatHooks};
pub use pprovider::{
    BackendError, BackendErrorKind, BackendId, ChatBackend, Message, Role, SecretString,
    reply_conversation,
};

pub use backends::{
    BackendBuildConfig, DEFAULT_BACKEND_TIMEOUT, build_backend, read_credential_file,
};
pub use runtime::{
    chat_client, close_sqlite_store, default_chat_client, in_memory_store, sqlite_store,
};
pub use util::{
    assistant_message, ephemeral_turn, parse_backend_id, system_message, turn, user_message,
};

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn parley_msg_macro_creates_expected_message() {
        let message = crate::parley_msg!("c", user => "hello");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "hello");
        assert_eq!(message.conversation_id.as_str(), "c");
    }

    #[test]
    fn parley_messages_macro_builds_message_vector() {
        let messages = crate::parley_messages!["c";
            system => "You are concise.",
            user => "Summarize the repo",
        ];

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert!(crate::parley_messages!("c").is_empty());
    }
}
