//! Conversation message model shared by stores and backends.
//!
//! ```rust
//! use pprovider::{Message, Role};
//!
//! let message = Message::new("demo", Role::User, "Hi");
//! assert_eq!(message.conversation_id.as_str(), "demo");
//! assert!(!message.id.is_empty());
//! assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
//! ```

use std::fmt::{Display, Formatter};
use std::time::SystemTime;

use pcommon::{ConversationId, MessageId};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub timestamp: SystemTime,
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Creates a message with a fresh id stamped with the current time.
    pub fn new(
        conversation_id: impl Into<ConversationId>,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(Uuid::new_v4().to_string()),
            conversation_id: conversation_id.into(),
            timestamp: SystemTime::now(),
            role,
            content: content.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Assigns a fresh id if none is set and returns the effective id.
    pub fn ensure_id(&mut self) -> &MessageId {
        if self.id.is_empty() {
            self.id = MessageId::new(Uuid::new_v4().to_string());
        }
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::{Message, Role};

    #[test]
    fn new_messages_get_distinct_ids() {
        let first = Message::new("c", Role::User, "one");
        let second = Message::new("c", Role::User, "one");

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn role_strings_are_stable() {
        for role in [Role::System, Role::User, Role::Assistant] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("tool"), None);
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn builders_override_generated_fields() {
        let at = UNIX_EPOCH + Duration::from_secs(42);
        let message = Message::new("c", Role::System, "ctx")
            .with_id("fixed")
            .with_timestamp(at);

        assert_eq!(message.id.as_str(), "fixed");
        assert_eq!(message.timestamp, at);
    }

    #[test]
    fn ensure_id_fills_only_missing_ids() {
        let mut unassigned = Message::new("c", Role::User, "hi").with_id("");
        let assigned = unassigned.ensure_id().clone();
        assert!(!assigned.is_empty());
        assert_eq!(unassigned.ensure_id(), &assigned);

        let mut fixed = Message::new("c", Role::User, "hi").with_id("m-1");
        assert_eq!(fixed.ensure_id().as_str(), "m-1");
    }
}
