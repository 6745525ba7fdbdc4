//! OpenAI chat backend over a pluggable transport.

use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::budget::{completion_allowance, estimate_tokens};
use crate::{
    BackendError, BackendId, BoxFuture, ChatBackend, ConversationId, Message, Role, SecretString,
    reply_conversation,
};

use super::model::OpenAiModel;
use super::transport::OpenAiTransport;
use super::types::{OpenAiMessage, OpenAiRequest, OpenAiResponse};

pub const DEFAULT_MAX_COMPLETION_TOKENS: usize = 8_000;

#[derive(Clone)]
pub struct OpenAiBackend {
    api_key: Arc<SecretString>,
    transport: Arc<dyn OpenAiTransport>,
    model: OpenAiModel,
    max_completion_tokens: usize,
    timestamp_prefix: bool,
}

impl OpenAiBackend {
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            api_key: Arc::new(SecretString::new(api_key)),
            transport,
            model: OpenAiModel::default(),
            max_completion_tokens: DEFAULT_MAX_COMPLETION_TOKENS,
            timestamp_prefix: true,
        }
    }

    pub fn with_model(mut self, model: OpenAiModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_completion_tokens(mut self, max_completion_tokens: usize) -> Self {
        self.max_completion_tokens = max_completion_tokens;
        self
    }

    /// Sends message content verbatim instead of prefixing each with its timestamp.
    pub fn without_timestamp_prefix(mut self) -> Self {
        self.timestamp_prefix = false;
        self
    }

    pub fn model(&self) -> OpenAiModel {
        self.model
    }

    pub(crate) fn build_request(&self, messages: &[Message]) -> Result<OpenAiRequest, BackendError> {
        if self.api_key.is_empty() {
            return Err(BackendError::authentication("no OpenAI API key configured"));
        }

        let prompt_tokens = estimate_tokens(messages);
        let max_tokens = completion_allowance(
            prompt_tokens,
            self.max_completion_tokens,
            self.model.context_window,
        )?;

        let messages = messages
            .iter()
            .map(|message| OpenAiMessage {
                role: message.role.into(),
                content: if self.timestamp_prefix {
                    format!("{}: {}", format_timestamp(message.timestamp), message.content)
                } else {
                    message.content.clone()
                },
            })
            .collect();

        Ok(OpenAiRequest {
            model: self.model.name.to_string(),
            messages,
            max_tokens: u32::try_from(max_tokens).unwrap_or(u32::MAX),
            n: 1,
            temperature: None,
            top_p: None,
        })
    }
}

impl ChatBackend for OpenAiBackend {
    fn id(&self) -> BackendId {
        BackendId::OpenAi
    }

    fn send<'a>(
        &'a self,
        mut messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
        Box::pin(async move {
            let conversation_id = reply_conversation(&messages)?;
            let request = self.build_request(&messages)?;
            let response = self.transport.complete(request, &self.api_key).await?;
            messages.push(first_choice_reply(response, conversation_id)?);
            Ok(messages)
        })
    }
}

pub(crate) fn first_choice_reply(
    response: OpenAiResponse,
    conversation_id: ConversationId,
) -> Result<Message, BackendError> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        BackendError::empty_result(format!("model '{}' returned no choices", response.model))
    })?;

    Ok(Message::new(conversation_id, Role::Assistant, choice.content))
}

pub(crate) fn format_timestamp(timestamp: SystemTime) -> String {
    DateTime::<Utc>::from(timestamp)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
