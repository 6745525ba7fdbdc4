//! OpenAI HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};

use crate::BackendError;

use super::types::{OpenAiChoice, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiUsage};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, BackendError> {
    if request.messages.is_empty() {
        return Err(BackendError::invalid_request(
            "OpenAI request requires at least one message",
        ));
    }

    Ok(OpenAiApiRequest {
        model: request.model,
        messages: request
            .messages
            .into_iter()
            .map(OpenAiApiMessage::from)
            .collect(),
        max_tokens: request.max_tokens,
        n: request.n,
        temperature: request.temperature,
        top_p: request.top_p,
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    pub max_tokens: u32,
    pub n: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: String,
}

impl From<OpenAiMessage> for OpenAiApiMessage {
    fn from(value: OpenAiMessage) -> Self {
        Self {
            role: value.role.as_str().to_string(),
            content: value.content,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<OpenAiApiChoice>,
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<OpenAiApiResponse> for OpenAiResponse {
    fn from(value: OpenAiApiResponse) -> Self {
        let usage = value
            .usage
            .map(|usage| OpenAiUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();

        Self {
            model: value.model,
            choices: value
                .choices
                .into_iter()
                .map(|choice| OpenAiChoice {
                    content: choice.message.content.unwrap_or_default(),
                    finish_reason: choice.finish_reason,
                })
                .collect(),
            usage,
        }
    }
}

pub(crate) fn parse_api_response(body: &str) -> Result<OpenAiResponse, BackendError> {
    serde_json::from_str::<OpenAiApiResponse>(body)
        .map(OpenAiResponse::from)
        .map_err(|err| {
            BackendError::malformed_response(format!("could not decode OpenAI response: {err}"))
        })
}
