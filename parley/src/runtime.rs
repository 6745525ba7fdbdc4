//! Runtime wiring helpers for chat usage.

use std::path::Path;
use std::sync::Arc;

use pmemory::{MemoryError, SqliteMessageStore, default_sqlite_path};
use pobserve::{SafeChatHooks, TracingChatHooks};

use crate::{ChatBackend, ChatClient, ChatConfig, InMemoryMessageStore, MessageStore};

pub fn in_memory_store() -> Arc<dyn MessageStore> {
    Arc::new(InMemoryMessageStore::new())
}

/// Opens a SQLite store. Hand it to [`close_sqlite_store`] once every client using it is gone.
pub fn sqlite_store(path: impl AsRef<Path>) -> Result<Arc<SqliteMessageStore>, MemoryError> {
    Ok(Arc::new(SqliteMessageStore::open(path)?))
}

/// Closes the underlying connection, reporting any error SQLite raises on shutdown.
///
/// Fails without closing while other handles to the store are alive.
pub fn close_sqlite_store(store: Arc<SqliteMessageStore>) -> Result<(), MemoryError> {
    let store = Arc::try_unwrap(store).map_err(|store| {
        MemoryError::invalid_request(format!(
            "sqlite store still has {} other handles",
            Arc::strong_count(&store) - 1
        ))
    })?;
    store.close()
}

/// Builds a client that logs every turn through `tracing`.
pub fn chat_client(
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn MessageStore>,
    config: ChatConfig,
) -> ChatClient {
    ChatClient::builder(backend, store)
        .config(config)
        .hooks(Arc::new(SafeChatHooks::new(TracingChatHooks)))
        .build()
}

/// [`chat_client`] over the SQLite file at [`default_sqlite_path`].
///
/// The store handle is returned alongside the client for [`close_sqlite_store`].
pub fn default_chat_client(
    backend: Arc<dyn ChatBackend>,
) -> Result<(ChatClient, Arc<SqliteMessageStore>), MemoryError> {
    let store = sqlite_store(default_sqlite_path())?;
    let client = chat_client(backend, store.clone(), ChatConfig::default());
    Ok((client, store))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        BackendError, BackendId, BoxFuture, ChatBackend, ChatConfig, MemoryErrorKind, Message,
        Role,
    };

    use super::{chat_client, close_sqlite_store, in_memory_store, sqlite_store};

    #[derive(Debug)]
    struct FakeBackend;

    impl ChatBackend for FakeBackend {
        fn id(&self) -> BackendId {
            BackendId::OpenAi
        }

        fn send<'a>(
            &'a self,
            mut messages: Vec<Message>,
        ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
            Box::pin(async move {
                let conversation_id = crate::reply_conversation(&messages)?;
                messages.push(Message::new(conversation_id, Role::Assistant, "done"));
                Ok(messages)
            })
        }
    }

    #[tokio::test]
    async fn chat_client_wires_backend_store_and_config() {
        let client = chat_client(
            Arc::new(FakeBackend),
            in_memory_store(),
            ChatConfig::default().with_default_context("Be brief."),
        );

        let reply = client.send("hello", "session-1").await.expect("turn");
        assert_eq!(reply, "done");
        assert_eq!(client.config().default_context, "Be brief.");

        let history = client
            .conversation_history("session-1")
            .await
            .expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
    }

    fn temp_dir(label: &str) -> std::path::PathBuf {
        let unique = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("parley-runtime-{label}-{unique}"))
    }

    #[tokio::test]
    async fn sqlite_store_helper_opens_a_file_store() {
        let dir = temp_dir("open");

        let store = sqlite_store(dir.join("messages.sqlite3")).expect("store should open");
        let client = chat_client(Arc::new(FakeBackend), store, ChatConfig::default());
        client.send("hello", "c").await.expect("turn");
        drop(client);

        std::fs::remove_dir_all(&dir).expect("temporary directory should be removable");
    }

    #[tokio::test]
    async fn sqlite_store_closes_once_the_client_is_gone() {
        let dir = temp_dir("close");
        let path = dir.join("messages.sqlite3");

        let store = sqlite_store(&path).expect("store should open");
        let client = chat_client(Arc::new(FakeBackend), store.clone(), ChatConfig::default());
        client.send("hello", "c").await.expect("turn");

        let error = close_sqlite_store(store.clone()).expect_err("client still holds the store");
        assert_eq!(error.kind, MemoryErrorKind::InvalidRequest);

        drop(client);
        close_sqlite_store(store).expect("last handle closes");

        let reopened = sqlite_store(&path).expect("store should reopen");
        let client = chat_client(Arc::new(FakeBackend), reopened.clone(), ChatConfig::default());
        let history = client.conversation_history("c").await.expect("history");
        assert_eq!(history.len(), 2);
        drop(client);
        close_sqlite_store(reopened).expect("reopened store closes");

        std::fs::remove_dir_all(&dir).expect("temporary directory should be removable");
    }
}
