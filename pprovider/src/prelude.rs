//! Common `pprovider` imports for downstream crates.

pub use crate::{
    BackendError, BackendErrorKind, BackendId, ChatBackend, Message, Role, SecretString,
};
pub use pcommon::{BoxFuture, ConversationId, MessageId};
