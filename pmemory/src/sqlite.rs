use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pchat::{ChatError, MessageStore};
use pcommon::{BoxFuture, ConversationId, MessageId};
use pprovider::{Message, Role};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::MemoryError;

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, created_at_secs, created_at_nanos, role, content";

/// [`MessageStore`] backed by a single SQLite connection.
///
/// Messages reference their conversation's context row, so deleting a conversation
/// cascades to its history. Reads are ordered by timestamp with insertion order as the
/// tiebreak.
#[derive(Debug)]
pub struct SqliteMessageStore {
    connection: Mutex<Connection>,
}

impl SqliteMessageStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|error| {
                MemoryError::storage(format!(
                    "failed to create sqlite parent directory: {error}"
                ))
            })?;
        }

        let connection = Connection::open(path).map_err(|error| {
            MemoryError::storage(format!("failed to open sqlite database: {error}"))
        })?;
        let store = Self::from_connection(connection)?;
        tracing::debug!(path = %path.display(), "opened sqlite message store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, MemoryError> {
        let connection = Connection::open_in_memory().map_err(|error| {
            MemoryError::storage(format!("failed to open in-memory sqlite database: {error}"))
        })?;
        Self::from_connection(connection)
    }

    /// Flushes and closes the underlying connection.
    pub fn close(self) -> Result<(), MemoryError> {
        let connection = self
            .connection
            .into_inner()
            .map_err(|_| MemoryError::storage("sqlite store lock poisoned"))?;
        connection.close().map_err(|(_, error)| {
            MemoryError::storage(format!("failed to close sqlite database: {error}"))
        })
    }

    fn from_connection(connection: Connection) -> Result<Self, MemoryError> {
        connection
            .busy_timeout(Duration::from_secs(5))
            .map_err(|error| {
                MemoryError::storage(format!("failed to configure sqlite busy timeout: {error}"))
            })?;
        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, MemoryError> {
        self.connection
            .lock()
            .map_err(|_| MemoryError::storage("sqlite store lock poisoned"))
    }

    fn initialize_schema(&self) -> Result<(), MemoryError> {
        let conn = self.connection()?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS conversation_contexts (
                conversation_id TEXT PRIMARY KEY,
                context TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                conversation_id TEXT NOT NULL
                    REFERENCES conversation_contexts(conversation_id) ON DELETE CASCADE,
                created_at_secs INTEGER NOT NULL,
                created_at_nanos INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_conversation_time
            ON messages(conversation_id, created_at_secs, created_at_nanos, seq);
            ",
        )
        .map_err(|error| {
            MemoryError::storage(format!("failed to initialize sqlite schema: {error}"))
        })?;

        Ok(())
    }

    fn query_messages(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Message>, MemoryError> {
        let mut stmt = conn.prepare(sql).map_err(|error| {
            MemoryError::storage(format!("failed to prepare message query: {error}"))
        })?;
        let rows = stmt.query_map(params, read_message_row).map_err(|error| {
            MemoryError::storage(format!("failed to query message rows: {error}"))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let row = row.map_err(|error| {
                MemoryError::storage(format!("failed to read message row: {error}"))
            })?;
            messages.push(row.into_message()?);
        }
        Ok(messages)
    }
}

impl MessageStore for SqliteMessageStore {
    fn context_exists<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let exists = conn
                .query_row(
                    "SELECT 1 FROM conversation_contexts WHERE conversation_id = ?1",
                    params![conversation_id.as_str()],
                    |_| Ok(()),
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to look up conversation context: {error}"))
                })?;
            Ok(exists.is_some())
        })
    }

    fn create_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let inserted = conn
                .execute(
                    "
                    INSERT OR IGNORE INTO conversation_contexts (conversation_id, context)
                    VALUES (?1, ?2)
                    ",
                    params![conversation_id.as_str(), context],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to create conversation context: {error}"))
                })?;
            if inserted == 0 {
                return Err(MemoryError::invalid_request(format!(
                    "context for conversation '{conversation_id}' already exists"
                ))
                .into());
            }
            Ok(())
        })
    }

    fn update_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        context: &'a str,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            conn.execute(
                "
                INSERT INTO conversation_contexts (conversation_id, context)
                VALUES (?1, ?2)
                ON CONFLICT(conversation_id) DO UPDATE SET context = excluded.context
                ",
                params![conversation_id.as_str(), context],
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to upsert conversation context: {error}"))
            })?;
            Ok(())
        })
    }

    fn context_message<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Message, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let context = conn
                .query_row(
                    "SELECT context FROM conversation_contexts WHERE conversation_id = ?1",
                    params![conversation_id.as_str()],
                    |row| row.get::<_, String>(0),
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to load conversation context: {error}"))
                })?
                .ok_or_else(|| {
                    MemoryError::not_found(format!(
                        "no context for conversation '{conversation_id}'"
                    ))
                })?;

            Ok(Message::new(
                conversation_id.clone(),
                Role::System,
                context,
            ))
        })
    }

    fn ensure_context<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            ensure_context_row(&conn, conversation_id)?;
            Ok(())
        })
    }

    fn store_message<'a>(
        &'a self,
        mut message: Message,
    ) -> BoxFuture<'a, Result<MessageId, ChatError>> {
        Box::pin(async move {
            let id = message.ensure_id().clone();
            let (secs, nanos) = encode_system_time(message.timestamp)?;

            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                MemoryError::storage(format!("failed to begin message transaction: {error}"))
            })?;
            ensure_context_row(&tx, &message.conversation_id)?;
            tx.execute(
                "
                INSERT INTO messages (
                    id,
                    conversation_id,
                    created_at_secs,
                    created_at_nanos,
                    role,
                    content
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    id.as_str(),
                    message.conversation_id.as_str(),
                    secs,
                    nanos,
                    message.role.as_str(),
                    &message.content,
                ],
            )
            .map_err(|error| MemoryError::storage(format!("failed to insert message '{id}': {error}")))?;
            tx.commit().map_err(|error| {
                MemoryError::storage(format!("failed to commit message transaction: {error}"))
            })?;

            Ok(id)
        })
    }

    fn recent_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
        limit: usize,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let conn = self.connection()?;
            let mut messages = Self::query_messages(
                &conn,
                &format!(
                    "
                    SELECT {MESSAGE_COLUMNS}
                    FROM messages
                    WHERE conversation_id = ?1
                    ORDER BY created_at_secs DESC, created_at_nanos DESC, seq DESC
                    LIMIT ?2
                    "
                ),
                params![conversation_id.as_str(), limit],
            )?;
            messages.reverse();
            Ok(messages)
        })
    }

    fn all_messages<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<Vec<Message>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            Ok(Self::query_messages(
                &conn,
                &format!(
                    "
                    SELECT {MESSAGE_COLUMNS}
                    FROM messages
                    WHERE conversation_id = ?1
                    ORDER BY created_at_secs ASC, created_at_nanos ASC, seq ASC
                    "
                ),
                params![conversation_id.as_str()],
            )?)
        })
    }

    fn message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<Option<Message>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let row = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![message_id.as_str()],
                    read_message_row,
                )
                .optional()
                .map_err(|error| {
                    MemoryError::storage(format!("failed to load message '{message_id}': {error}"))
                })?;

            Ok(row.map(MessageRow::into_message).transpose()?)
        })
    }

    fn delete_message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> BoxFuture<'a, Result<bool, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let removed = conn
                .execute(
                    "DELETE FROM messages WHERE id = ?1",
                    params![message_id.as_str()],
                )
                .map_err(|error| {
                    MemoryError::storage(format!(
                        "failed to delete message '{message_id}': {error}"
                    ))
                })?;
            Ok(removed > 0)
        })
    }

    fn delete_conversation<'a>(
        &'a self,
        conversation_id: &'a ConversationId,
    ) -> BoxFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut conn = self.connection()?;
            let tx = conn.transaction().map_err(|error| {
                MemoryError::storage(format!("failed to begin delete transaction: {error}"))
            })?;
            let removed_messages = tx
                .execute(
                    "DELETE FROM messages WHERE conversation_id = ?1",
                    params![conversation_id.as_str()],
                )
                .map_err(|error| {
                    MemoryError::storage(format!("failed to delete conversation messages: {error}"))
                })?;
            tx.execute(
                "DELETE FROM conversation_contexts WHERE conversation_id = ?1",
                params![conversation_id.as_str()],
            )
            .map_err(|error| {
                MemoryError::storage(format!("failed to delete conversation context: {error}"))
            })?;
            tx.commit().map_err(|error| {
                MemoryError::storage(format!("failed to commit delete transaction: {error}"))
            })?;

            tracing::debug!(
                conversation_id = %conversation_id,
                removed_messages,
                "deleted conversation"
            );
            Ok(())
        })
    }

    fn conversation_ids<'a>(&'a self) -> BoxFuture<'a, Result<BTreeSet<ConversationId>, ChatError>> {
        Box::pin(async move {
            let conn = self.connection()?;
            let mut stmt = conn
                .prepare("SELECT conversation_id FROM conversation_contexts")
                .map_err(|error| {
                    MemoryError::storage(format!("failed to prepare conversation query: {error}"))
                })?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|error| {
                    MemoryError::storage(format!("failed to query conversations: {error}"))
                })?;

            let mut ids = BTreeSet::new();
            for row in rows {
                let id = row.map_err(|error| {
                    MemoryError::storage(format!("failed to read conversation row: {error}"))
                })?;
                ids.insert(ConversationId::from(id));
            }
            Ok(ids)
        })
    }
}

struct MessageRow {
    id: String,
    conversation_id: String,
    created_at_secs: i64,
    created_at_nanos: i64,
    role: String,
    content: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, MemoryError> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            MemoryError::storage(format!("unknown message role value '{}'", self.role))
        })?;

        Ok(Message {
            id: MessageId::from(self.id),
            conversation_id: ConversationId::from(self.conversation_id),
            timestamp: decode_system_time(self.created_at_secs, self.created_at_nanos)?,
            role,
            content: self.content,
        })
    }
}

fn read_message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        created_at_secs: row.get(2)?,
        created_at_nanos: row.get(3)?,
        role: row.get(4)?,
        content: row.get(5)?,
    })
}

fn ensure_context_row(
    conn: &Connection,
    conversation_id: &ConversationId,
) -> Result<(), MemoryError> {
    conn.execute(
        "
        INSERT OR IGNORE INTO conversation_contexts (conversation_id, context)
        VALUES (?1, '')
        ",
        params![conversation_id.as_str()],
    )
    .map_err(|error| {
        MemoryError::storage(format!("failed to ensure conversation context: {error}"))
    })?;
    Ok(())
}

fn encode_system_time(value: SystemTime) -> Result<(i64, i64), MemoryError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        MemoryError::invalid_request(format!("timestamp predates unix epoch: {error}"))
    })?;
    let secs = i64::try_from(duration.as_secs()).map_err(|_| {
        MemoryError::invalid_request("timestamp is too far in the future to store")
    })?;
    Ok((secs, i64::from(duration.subsec_nanos())))
}

fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, MemoryError> {
    let seconds = u64::try_from(seconds).map_err(|_| {
        MemoryError::storage(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        ))
    })?;
    let nanos = u32::try_from(nanos)
        .ok()
        .filter(|nanos| *nanos < 1_000_000_000)
        .ok_or_else(|| {
            MemoryError::storage(format!(
                "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
            ))
        })?;
    Ok(UNIX_EPOCH + Duration::new(seconds, nanos))
}

/// `PARLEY_SQLITE_PATH` if set, otherwise `~/.parley/messages.sqlite3`.
pub fn default_sqlite_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os("PARLEY_SQLITE_PATH") {
        return PathBuf::from(explicit);
    }

    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home)
            .join(".parley")
            .join("messages.sqlite3");
    }

    PathBuf::from("messages.sqlite3")
}
