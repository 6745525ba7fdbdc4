//! Storage-layer errors for message and context persistence.

use std::error::Error;
use std::fmt::{Display, Formatter};

use pchat::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryErrorKind {
    Storage,
    NotFound,
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryError {
    pub kind: MemoryErrorKind,
    pub message: String,
}

impl MemoryError {
    pub fn new(kind: MemoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::Storage, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(MemoryErrorKind::InvalidRequest, message)
    }
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for MemoryError {}

impl From<MemoryError> for ChatError {
    fn from(error: MemoryError) -> Self {
        ChatError::store(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pchat::{ChatError, ChatErrorKind};

    use super::{MemoryError, MemoryErrorKind};

    #[test]
    fn memory_errors_surface_as_store_errors() {
        let error = MemoryError::not_found("no context for conversation 'c'");
        assert_eq!(error.kind, MemoryErrorKind::NotFound);

        let chat: ChatError = error.into();
        assert_eq!(chat.kind, ChatErrorKind::Store);
        assert_eq!(chat.message, "NotFound: no context for conversation 'c'");
        assert!(!chat.is_retryable());
    }

    #[test]
    fn constructors_set_their_kind() {
        let cases = [
            (MemoryError::storage("locked"), MemoryErrorKind::Storage),
            (MemoryError::not_found("gone"), MemoryErrorKind::NotFound),
            (MemoryError::invalid_request("bad"), MemoryErrorKind::InvalidRequest),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind, kind);
            assert!(error.to_string().starts_with(&format!("{kind:?}: ")));
        }
    }
}
