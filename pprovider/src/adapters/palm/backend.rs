//! PaLM chat backend served through Vertex AI.
//!
//! System messages become the instance context. The remaining turns are trimmed to the
//! input limit and folded into a single user message of `"role: content"` lines.

use std::sync::Arc;

use pcommon::GenerationOptions;

use crate::budget::{content_chars, trim_oldest};
use crate::{
    BackendError, BackendId, BoxFuture, ChatBackend, Message, Role, SecretString,
    reply_conversation,
};

use super::transport::PalmTransport;
use super::types::{PalmMessage, PalmRequest};

/// Input limit in characters, context included.
pub const DEFAULT_INPUT_LIMIT: usize = 8_192;

pub fn default_palm_options() -> GenerationOptions {
    GenerationOptions::default()
        .with_temperature(0.2)
        .with_max_tokens(1_000)
        .with_top_p(0.9)
        .with_top_k(40)
}

#[derive(Clone)]
pub struct PalmBackend {
    access_token: Arc<SecretString>,
    transport: Arc<dyn PalmTransport>,
    options: GenerationOptions,
    input_limit: usize,
}

impl PalmBackend {
    pub fn new(access_token: impl Into<String>, transport: Arc<dyn PalmTransport>) -> Self {
        Self {
            access_token: Arc::new(SecretString::new(access_token)),
            transport,
            options: default_palm_options(),
            input_limit: DEFAULT_INPUT_LIMIT,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_input_limit(mut self, input_limit: usize) -> Self {
        self.input_limit = input_limit;
        self
    }

    pub(crate) fn build_request(&self, messages: &[Message]) -> Result<PalmRequest, BackendError> {
        if self.access_token.is_empty() {
            return Err(BackendError::authentication("no Vertex access token configured"));
        }

        let (context, turns): (Vec<&Message>, Vec<&Message>) = messages
            .iter()
            .partition(|message| message.role == Role::System);
        if turns.is_empty() {
            return Err(BackendError::invalid_request(
                "PaLM request requires at least one non-system message",
            ));
        }

        let context = context
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let context_len = context.len();
        let turns = trim_oldest(
            turns.into_iter().cloned().collect(),
            self.input_limit,
            |turns| content_chars(turns) + context_len,
        )?;

        let folded = turns
            .iter()
            .map(|message| format!("{}: {}\n", message.role, message.content))
            .collect::<String>();

        Ok(PalmRequest {
            context,
            messages: vec![PalmMessage {
                author: Role::User.as_str().to_string(),
                content: folded,
            }],
            options: self.options,
        })
    }
}

impl ChatBackend for PalmBackend {
    fn id(&self) -> BackendId {
        BackendId::Palm
    }

    fn send<'a>(
        &'a self,
        mut messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
        Box::pin(async move {
            let conversation_id = reply_conversation(&messages)?;
            let request = self.build_request(&messages)?;
            let response = self.transport.predict(request, &self.access_token).await?;

            if response.candidates.is_empty() {
                return Err(BackendError::empty_result(
                    "Vertex response did not include candidates",
                ));
            }

            messages.extend(response.candidates.into_iter().map(|candidate| {
                Message::new(conversation_id.clone(), Role::Assistant, candidate.content)
            }));
            Ok(messages)
        })
    }
}
