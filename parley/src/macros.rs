/// Creates a single [`Message`](crate::Message) in a conversation from a role shorthand.
///
/// ```rust
/// use parley::{Role, parley_msg};
///
/// let message = parley_msg!("demo", assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.conversation_id.as_str(), "demo");
/// ```
#[macro_export]
macro_rules! parley_msg {
    ($conversation:expr, system => $content:expr $(,)?) => {
        $crate::Message::new($conversation, $crate::Role::System, $content)
    };
    ($conversation:expr, user => $content:expr $(,)?) => {
        $crate::Message::new($conversation, $crate::Role::User, $content)
    };
    ($conversation:expr, assistant => $content:expr $(,)?) => {
        $crate::Message::new($conversation, $crate::Role::Assistant, $content)
    };
    ($conversation:expr, $role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` for one conversation from role/content pairs.
///
/// ```rust
/// use parley::{Role, parley_messages};
///
/// let messages = parley_messages!["demo";
///     system => "You are terse.",
///     user => "Hi",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! parley_messages {
    ($conversation:expr $(;)?) => {
        Vec::<$crate::Message>::new()
    };
    ($conversation:expr; $($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::parley_msg!($conversation, $role => $content)),+]
    };
}
