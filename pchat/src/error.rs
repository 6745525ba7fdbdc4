//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use pprovider::{BackendError, BackendErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Store,
    Backend,
    ContractViolation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    /// Set when the failure came from the backend adapter.
    pub backend_kind: Option<BackendErrorKind>,
    pub retryable: bool,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            backend_kind: None,
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Store, message)
    }

    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ContractViolation, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.backend_kind {
            Some(backend_kind) => write!(f, "{:?}({backend_kind:?}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

impl From<BackendError> for ChatError {
    fn from(value: BackendError) -> Self {
        Self {
            kind: ChatErrorKind::Backend,
            message: value.message,
            backend_kind: Some(value.kind),
            retryable: value.retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use pprovider::{BackendError, BackendErrorKind};

    use super::{ChatError, ChatErrorKind};

    #[test]
    fn backend_errors_keep_their_kind_and_retryability() {
        let error = ChatError::from(BackendError::rate_limited("slow down"));

        assert_eq!(error.kind, ChatErrorKind::Backend);
        assert_eq!(error.backend_kind, Some(BackendErrorKind::RateLimited));
        assert!(error.is_retryable());
        assert_eq!(error.to_string(), "Backend(RateLimited): slow down");
    }

    #[test]
    fn local_errors_are_not_retryable() {
        let error = ChatError::contract_violation("no reply");

        assert_eq!(error.backend_kind, None);
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "ContractViolation: no reply");
    }
}
