//! Common imports for most parley applications.

pub use crate::{
    BackendBuildConfig, build_backend, chat_client, close_sqlite_store, default_chat_client,
    in_memory_store, parse_backend_id, read_credential_file, sqlite_store,
};
pub use crate::{
    BackendError, BackendErrorKind, BackendId, BoxFuture, ChatBackend, ChatClient, ChatConfig,
    ChatError, ChatErrorKind, ChatHooks, ChatTurnRequest, ChatTurnResult, ConversationId,
    InMemoryMessageStore, MemoryError, Message, MessageId, MessageStore, Role,
    SqliteMessageStore,
};
pub use crate::{parley_messages, parley_msg};
