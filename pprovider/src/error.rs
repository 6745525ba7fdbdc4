//! Backend error kinds and error value helpers.
//!
//! ```rust
//! use pprovider::{BackendError, BackendErrorKind};
//!
//! let auth = BackendError::authentication("bad key");
//! assert!(!auth.retryable);
//!
//! let budget = BackendError::budget_exhausted("prompt fills the context window");
//! assert_eq!(budget.kind, BackendErrorKind::BudgetExhausted);
//!
//! let timeout = BackendError::timeout("temporary timeout");
//! assert!(timeout.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    MalformedResponse,
    EmptyResult,
    BudgetExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unavailable, message, true)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::MalformedResponse, message, false)
    }

    pub fn empty_result(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::EmptyResult, message, false)
    }

    pub fn budget_exhausted(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::BudgetExhausted, message, false)
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for BackendError {}
