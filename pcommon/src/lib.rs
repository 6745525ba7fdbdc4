//! Shared primitives and strongly-typed identifiers for the parley crates.
//!
//! ```rust
//! use pcommon::{ConversationId, GenerationOptions, MessageId};
//!
//! let conversation = ConversationId::from("demo");
//! let message = MessageId::new("m-1");
//! let options = GenerationOptions::default().with_temperature(0.2).with_max_tokens(1000);
//!
//! assert_eq!(conversation.as_str(), "demo");
//! assert_eq!(message.to_string(), "m-1");
//! assert_eq!(options.max_tokens, Some(1000));
//! ```

pub mod future {
    //! Shared async future aliases.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn str_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = str_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Conversation and message identifier newtypes.
    //!
    //! Two conversation ids are reserved: [`ConversationId::EPHEMERAL`] marks a turn that
    //! must not read history, and [`ConversationId::USER_DEFAULT`] holds the account-wide
    //! default context merged into every turn.
    //!
    //! ```rust
    //! use pcommon::ConversationId;
    //!
    //! assert!(ConversationId::resolve("").is_ephemeral());
    //! assert_eq!(ConversationId::resolve("  ").as_str(), "  ");
    //! assert_eq!(ConversationId::resolve("demo").as_str(), "demo");
    //! assert!(ConversationId::user_default().is_user_default());
    //! ```

    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ConversationId(String);

    impl ConversationId {
        pub const EPHEMERAL: &'static str = "random";
        pub const USER_DEFAULT: &'static str = "defaultUserContext";

        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        pub fn ephemeral() -> Self {
            Self::new(Self::EPHEMERAL)
        }

        pub fn user_default() -> Self {
            Self::new(Self::USER_DEFAULT)
        }

        /// Maps caller input to the effective conversation id.
        ///
        /// Only empty input falls back to the ephemeral sentinel. Whitespace ids are kept.
        pub fn resolve(input: &str) -> Self {
            if input.is_empty() {
                Self::ephemeral()
            } else {
                Self::new(input)
            }
        }

        pub fn is_ephemeral(&self) -> bool {
            self.0 == Self::EPHEMERAL
        }

        pub fn is_user_default(&self) -> bool {
            self.0 == Self::USER_DEFAULT
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for ConversationId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for ConversationId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for ConversationId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
    pub struct MessageId(String);

    impl MessageId {
        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// An empty id means "not assigned yet"; stores fill it on write.
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Display for MessageId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for MessageId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for MessageId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }
}

pub mod model {
    //! Shared generation settings used by backend requests.
    //!
    //! ```rust
    //! use pcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128)
    //!     .with_top_p(0.9);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert_eq!(options.top_k, None);
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
        pub top_p: Option<f32>,
        pub top_k: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn with_top_p(mut self, top_p: f32) -> Self {
            self.top_p = Some(top_p);
            self
        }

        pub fn with_top_k(mut self, top_k: u32) -> Self {
            self.top_k = Some(top_k);
            self
        }
    }
}

pub use context::{ConversationId, MessageId};
pub use future::BoxFuture;
pub use model::GenerationOptions;

#[cfg(test)]
mod tests {
    use super::{ConversationId, GenerationOptions, MessageId};

    #[test]
    fn id_newtypes_round_trip_strings() {
        let conversation = ConversationId::new("conversation-1");
        let message = MessageId::from("message-1");

        assert_eq!(conversation.as_str(), "conversation-1");
        assert_eq!(message.as_str(), "message-1");
        assert_eq!(conversation.to_string(), "conversation-1");
        assert_eq!(message.to_string(), "message-1");
    }

    #[test]
    fn resolve_maps_empty_and_sentinel_input_to_ephemeral() {
        assert_eq!(ConversationId::resolve(""), ConversationId::ephemeral());
        assert_eq!(
            ConversationId::resolve(ConversationId::EPHEMERAL),
            ConversationId::ephemeral()
        );
        assert!(!ConversationId::resolve("demo").is_ephemeral());
    }

    #[test]
    fn resolve_keeps_whitespace_ids_as_given() {
        let resolved = ConversationId::resolve("  ");
        assert!(!resolved.is_ephemeral());
        assert_eq!(resolved.as_str(), "  ");
        assert_eq!(ConversationId::resolve("\t\n").as_str(), "\t\n");
    }

    #[test]
    fn reserved_ids_are_distinct() {
        let ephemeral = ConversationId::ephemeral();
        let user_default = ConversationId::user_default();

        assert_ne!(ephemeral, user_default);
        assert!(ephemeral.is_ephemeral() && !ephemeral.is_user_default());
        assert!(user_default.is_user_default() && !user_default.is_ephemeral());
    }

    #[test]
    fn default_message_id_is_unassigned() {
        assert!(MessageId::default().is_empty());
        assert!(!MessageId::new("x").is_empty());
    }

    #[test]
    fn generation_options_builder_helpers_set_values() {
        let options = GenerationOptions::default()
            .with_temperature(0.3)
            .with_max_tokens(123)
            .with_top_p(0.9)
            .with_top_k(40);

        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(options.max_tokens, Some(123));
        assert_eq!(options.top_p, Some(0.9));
        assert_eq!(options.top_k, Some(40));
    }
}
