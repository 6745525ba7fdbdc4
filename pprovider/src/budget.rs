//! Character-based token budgeting shared by the adapters.
//!
//! Counts are approximations: roughly three characters per token.
//!
//! ```rust
//! use pprovider::budget::{completion_allowance, estimate_tokens};
//! use pprovider::{Message, Role};
//!
//! let messages = vec![Message::new("c", Role::User, "abcdef")];
//! // ("abcdef" + "user") / 3
//! assert_eq!(estimate_tokens(&messages), 3);
//! assert_eq!(completion_allowance(3, 100, 4000).unwrap(), 100);
//! assert_eq!(completion_allowance(3, 4000, 4000).unwrap(), 3997);
//! ```

use crate::{BackendError, Message, Role};

pub fn estimate_tokens(messages: &[Message]) -> usize {
    let chars = messages
        .iter()
        .map(|message| message.content.len() + message.role.as_str().len())
        .sum::<usize>();
    chars / 3
}

pub fn content_chars(messages: &[Message]) -> usize {
    messages.iter().map(|message| message.content.len()).sum()
}

/// Completion size that still fits next to the prompt inside `context_window`.
pub fn completion_allowance(
    prompt_tokens: usize,
    requested: usize,
    context_window: usize,
) -> Result<usize, BackendError> {
    if prompt_tokens + requested < context_window {
        return Ok(requested);
    }

    match context_window.saturating_sub(prompt_tokens) {
        0 => Err(BackendError::budget_exhausted(format!(
            "prompt of ~{prompt_tokens} tokens leaves no room in a {context_window} token window"
        ))),
        remaining => Ok(remaining),
    }
}

/// Drops the oldest non-system messages until `measure` falls below `limit`.
///
/// System messages are never dropped. Fails once a single droppable message remains and
/// the conversation still does not fit.
pub fn trim_oldest<F>(
    mut messages: Vec<Message>,
    limit: usize,
    measure: F,
) -> Result<Vec<Message>, BackendError>
where
    F: Fn(&[Message]) -> usize,
{
    loop {
        let size = measure(&messages);
        if size < limit {
            return Ok(messages);
        }

        let droppable = messages
            .iter()
            .filter(|message| message.role != Role::System)
            .count();
        if droppable <= 1 {
            return Err(BackendError::budget_exhausted(format!(
                "message of size {size} does not fit the input limit of {limit}"
            )));
        }

        if let Some(index) = messages
            .iter()
            .position(|message| message.role != Role::System)
        {
            messages.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BackendErrorKind, Message, Role};

    use super::{completion_allowance, content_chars, estimate_tokens, trim_oldest};

    fn conversation(contents: &[(Role, &str)]) -> Vec<Message> {
        contents
            .iter()
            .map(|(role, content)| Message::new("c", *role, *content))
            .collect()
    }

    #[test]
    fn estimate_counts_role_and_content() {
        let messages = conversation(&[(Role::System, "abc"), (Role::Assistant, "de")]);
        // (3 + 6 + 2 + 9) / 3
        assert_eq!(estimate_tokens(&messages), 6);
        assert_eq!(estimate_tokens(&[]), 0);
    }

    #[test]
    fn allowance_shrinks_then_exhausts() {
        assert_eq!(completion_allowance(10, 50, 100).expect("fits"), 50);
        assert_eq!(completion_allowance(60, 50, 100).expect("shrinks"), 40);

        let error = completion_allowance(100, 50, 100).expect_err("no room left");
        assert_eq!(error.kind, BackendErrorKind::BudgetExhausted);
        assert!(!error.retryable);
    }

    #[test]
    fn trim_drops_oldest_non_system_messages_first() {
        let messages = conversation(&[
            (Role::System, "sys"),
            (Role::User, "aaaa"),
            (Role::Assistant, "bbbb"),
            (Role::User, "cc"),
        ]);

        let trimmed = trim_oldest(messages, 10, content_chars).expect("should fit after trim");
        let contents = trimmed
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["sys", "bbbb", "cc"]);
    }

    #[test]
    fn trim_fails_when_last_message_alone_is_too_large() {
        let messages = conversation(&[(Role::User, "old"), (Role::User, "0123456789")]);

        let error = trim_oldest(messages, 5, content_chars).expect_err("cannot fit");
        assert_eq!(error.kind, BackendErrorKind::BudgetExhausted);
    }

    #[test]
    fn trim_keeps_conversation_that_already_fits() {
        let messages = conversation(&[(Role::User, "a"), (Role::Assistant, "b")]);
        let trimmed = trim_oldest(messages.clone(), 100, content_chars).expect("fits");
        assert_eq!(trimmed, messages);
    }
}
