//! Durable conversation storage for pchat.
//!
//! [`SqliteMessageStore`] keeps contexts and messages in one SQLite file so history
//! survives restarts. [`create_message_store`] picks between it and the in-memory store.
//!
//! ```rust
//! use pchat::MessageStore;
//! use pcommon::ConversationId;
//! use pmemory::SqliteMessageStore;
//! use pprovider::{Message, Role};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteMessageStore::open_in_memory()?;
//! store
//!     .store_message(Message::new("demo", Role::User, "Hi"))
//!     .await?;
//!
//! let history = store.all_messages(&ConversationId::from("demo")).await?;
//! assert_eq!(history.len(), 1);
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod sqlite;

pub mod prelude {
    pub use crate::{
        MemoryError, MemoryErrorKind, MessageStoreConfig, SqliteMessageStore,
        create_default_message_store, create_message_store, default_sqlite_path,
    };
}

pub use backend::{MessageStoreConfig, create_default_message_store, create_message_store};
pub use error::{MemoryError, MemoryErrorKind};
pub use sqlite::{SqliteMessageStore, default_sqlite_path};
