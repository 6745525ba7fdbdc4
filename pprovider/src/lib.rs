//! Message model and chat backend adapters.
//!
//! A [`ChatBackend`] receives the fully ordered conversation (context layers, history and
//! the new user turn) and returns it with one or more assistant replies appended. Request
//! formatting and token budgeting stay inside each adapter.
//!
//! ```rust
//! use pprovider::{BackendError, BackendId, BoxFuture, ChatBackend, Message, Role};
//!
//! struct Echo;
//!
//! impl ChatBackend for Echo {
//!     fn id(&self) -> BackendId {
//!         BackendId::Ollama
//!     }
//!
//!     fn send<'a>(
//!         &'a self,
//!         mut messages: Vec<Message>,
//!     ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
//!         Box::pin(async move {
//!             let last = messages.last().cloned().ok_or_else(|| {
//!                 BackendError::invalid_request("nothing to echo")
//!             })?;
//!             messages.push(Message::new(last.conversation_id, Role::Assistant, last.content));
//!             Ok(messages)
//!         })
//!     }
//! }
//!
//! let backend = Echo;
//! assert_eq!(backend.id().to_string(), "ollama");
//! ```

pub mod adapters;
pub mod backend;
pub mod budget;
pub mod credentials;
pub mod error;
pub mod message;
pub mod prelude;

pub use backend::{BackendId, ChatBackend, reply_conversation};
pub use credentials::SecretString;
pub use error::{BackendError, BackendErrorKind};
pub use message::{Message, Role};
pub use pcommon::{BoxFuture, ConversationId, GenerationOptions, MessageId};
