//! Ollama backend implemented over the OpenAI-compatible transport.

use std::sync::Arc;

use pcommon::GenerationOptions;
use reqwest::Client;

use crate::adapters::openai::{
    OpenAiHttpTransport, OpenAiMessage, OpenAiRequest, OpenAiTransport, first_choice_reply,
};
use crate::budget::{completion_allowance, estimate_tokens, trim_oldest};
use crate::{
    BackendError, BackendId, BoxFuture, ChatBackend, Message, SecretString, reply_conversation,
};

pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama2";
pub const DEFAULT_CONTEXT_WINDOW: usize = 4_096;
const DEFAULT_COMPLETION_TOKENS: usize = 512;

#[derive(Clone)]
pub struct OllamaBackend {
    transport: Arc<dyn OpenAiTransport>,
    auth_placeholder: Arc<SecretString>,
    model: String,
    context_window: usize,
    options: GenerationOptions,
}

impl OllamaBackend {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            transport,
            auth_placeholder: Arc::new(SecretString::new("ollama-local")),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn default_http_transport(client: Client) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client).with_base_url(OLLAMA_BASE_URL)
    }

    /// Fails when `top_k` is set, since the OpenAI-compatible endpoint has no such field.
    pub(crate) fn build_request(&self, messages: Vec<Message>) -> Result<OpenAiRequest, BackendError> {
        if self.options.top_k.is_some() {
            return Err(BackendError::invalid_request(
                "top_k is not supported by Ollama's OpenAI-compatible endpoint",
            ));
        }

        let messages = trim_oldest(messages, self.context_window, estimate_tokens)?;
        let requested = self
            .options
            .max_tokens
            .map_or(DEFAULT_COMPLETION_TOKENS, |max| max as usize);
        let max_tokens =
            completion_allowance(estimate_tokens(&messages), requested, self.context_window)?;

        Ok(OpenAiRequest {
            model: self.model.clone(),
            messages: messages
                .into_iter()
                .map(|message| OpenAiMessage {
                    role: message.role.into(),
                    content: message.content,
                })
                .collect(),
            max_tokens: u32::try_from(max_tokens).unwrap_or(u32::MAX),
            n: 1,
            temperature: self.options.temperature,
            top_p: self.options.top_p,
        })
    }
}

impl ChatBackend for OllamaBackend {
    fn id(&self) -> BackendId {
        BackendId::Ollama
    }

    fn send<'a>(
        &'a self,
        mut messages: Vec<Message>,
    ) -> BoxFuture<'a, Result<Vec<Message>, BackendError>> {
        Box::pin(async move {
            let conversation_id = reply_conversation(&messages)?;
            let request = self.build_request(messages.clone())?;
            let response = self
                .transport
                .complete(request, &self.auth_placeholder)
                .await?;
            messages.push(first_choice_reply(response, conversation_id)?);
            Ok(messages)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::adapters::openai::{OpenAiRequest, OpenAiResponse, OpenAiTransport};
    use crate::{BackendError, BoxFuture, GenerationOptions, Message, Role, SecretString};

    use super::OllamaBackend;

    #[derive(Debug)]
    struct NoopTransport;

    impl OpenAiTransport for NoopTransport {
        fn complete<'a>(
            &'a self,
            _request: OpenAiRequest,
            _api_key: &'a SecretString,
        ) -> BoxFuture<'a, Result<OpenAiResponse, BackendError>> {
            Box::pin(async { Err(BackendError::transport("not used")) })
        }
    }

    #[test]
    fn history_is_trimmed_to_the_context_window() {
        let backend = OllamaBackend::new(Arc::new(NoopTransport))
            .with_context_window(20)
            .with_options(GenerationOptions::default().with_max_tokens(4));
        let messages = vec![
            Message::new("c", Role::System, "sys"),
            Message::new("c", Role::User, "x".repeat(60)),
            Message::new("c", Role::User, "hello"),
        ];

        let request = backend.build_request(messages).expect("request should build");
        let contents = request
            .messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["sys", "hello"]);
        assert_eq!(request.model, "llama2");
        assert_eq!(request.max_tokens, 4);
        assert_eq!(request.temperature, None);
        assert_eq!(request.top_p, None);
    }

    #[test]
    fn sampling_options_reach_the_request() {
        let backend = OllamaBackend::new(Arc::new(NoopTransport)).with_options(
            GenerationOptions::default()
                .with_temperature(0.9)
                .with_top_p(0.1),
        );

        let request = backend
            .build_request(vec![Message::new("c", Role::User, "hello")])
            .expect("request should build");
        assert_eq!(request.temperature, Some(0.9));
        assert_eq!(request.top_p, Some(0.1));
        assert_eq!(request.max_tokens, 512);
    }

    #[test]
    fn top_k_is_rejected_instead_of_dropped() {
        let backend = OllamaBackend::new(Arc::new(NoopTransport))
            .with_options(GenerationOptions::default().with_top_k(40));

        let error = backend
            .build_request(vec![Message::new("c", Role::User, "hello")])
            .expect_err("top_k has no wire field");
        assert_eq!(error.kind, crate::BackendErrorKind::InvalidRequest);
    }
}
