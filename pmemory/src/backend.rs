//! Store selection and construction.

use std::path::PathBuf;
use std::sync::Arc;

use pchat::{InMemoryMessageStore, MessageStore};

use crate::error::MemoryError;
use crate::sqlite::{SqliteMessageStore, default_sqlite_path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStoreConfig {
    Sqlite { path: PathBuf },
    InMemory,
}

impl Default for MessageStoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

pub fn create_message_store(
    config: MessageStoreConfig,
) -> Result<Arc<dyn MessageStore>, MemoryError> {
    match config {
        MessageStoreConfig::Sqlite { path } => Ok(Arc::new(SqliteMessageStore::open(path)?)),
        MessageStoreConfig::InMemory => Ok(Arc::new(InMemoryMessageStore::new())),
    }
}

pub fn create_default_message_store() -> Result<Arc<dyn MessageStore>, MemoryError> {
    create_message_store(MessageStoreConfig::default())
}
