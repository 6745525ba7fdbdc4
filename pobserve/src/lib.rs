//! Tracing and metrics hooks for conversation turns.
//!
//! ```rust
//! use pobserve::{MetricsChatHooks, SafeChatHooks, TracingChatHooks};
//!
//! let _hooks = SafeChatHooks::new(TracingChatHooks);
//! let _metrics = MetricsChatHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsChatHooks;
pub use safe_hooks::SafeChatHooks;
pub use tracing_hooks::TracingChatHooks;

pub mod prelude {
    pub use crate::{MetricsChatHooks, SafeChatHooks, TracingChatHooks};
}
