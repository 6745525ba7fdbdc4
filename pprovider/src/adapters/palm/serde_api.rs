//! Vertex AI `predict` payloads for the chat-bison model.

use serde::{Deserialize, Serialize};

use crate::BackendError;

use super::types::{PalmCandidate, PalmMessage, PalmRequest, PalmResponse};

pub(crate) fn build_api_request(request: PalmRequest) -> Result<PalmApiRequest, BackendError> {
    if request.messages.is_empty() {
        return Err(BackendError::invalid_request(
            "PaLM request requires at least one message",
        ));
    }

    Ok(PalmApiRequest {
        instances: vec![PalmApiInstance {
            context: request.context,
            examples: Vec::new(),
            messages: request
                .messages
                .into_iter()
                .map(|message| PalmApiMessage {
                    author: message.author,
                    content: message.content,
                })
                .collect(),
        }],
        parameters: PalmApiParameters {
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_tokens,
            top_p: request.options.top_p,
            top_k: request.options.top_k,
        },
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<PalmApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

pub(crate) fn parse_api_response(body: &str) -> Result<PalmResponse, BackendError> {
    serde_json::from_str::<PalmApiResponse>(body)
        .map(PalmResponse::from)
        .map_err(|err| {
            BackendError::malformed_response(format!("could not decode Vertex response: {err}"))
        })
}

#[derive(Debug, Deserialize)]
pub(crate) struct PalmApiErrorEnvelope {
    pub error: PalmApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PalmApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PalmApiRequest {
    pub instances: Vec<PalmApiInstance>,
    pub parameters: PalmApiParameters,
}

#[derive(Debug, Serialize)]
pub(crate) struct PalmApiInstance {
    pub context: String,
    pub examples: Vec<serde_json::Value>,
    pub messages: Vec<PalmApiMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PalmApiMessage {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PalmApiParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PalmApiResponse {
    #[serde(default)]
    pub predictions: Vec<PalmApiPrediction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PalmApiPrediction {
    #[serde(default)]
    pub candidates: Vec<PalmApiMessage>,
}

impl From<PalmApiResponse> for PalmResponse {
    fn from(value: PalmApiResponse) -> Self {
        Self {
            candidates: value
                .predictions
                .into_iter()
                .flat_map(|prediction| prediction.candidates)
                .map(|candidate| PalmCandidate {
                    author: candidate.author,
                    content: candidate.content,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pcommon::GenerationOptions;
    use serde_json::json;

    use super::super::types::{PalmMessage, PalmRequest};
    use super::{build_api_request, parse_api_response};

    #[test]
    fn request_serializes_to_vertex_shape() {
        let request = PalmRequest {
            context: "be brief".to_string(),
            messages: vec![PalmMessage {
                author: "user".to_string(),
                content: "user: Hi\n".to_string(),
            }],
            options: GenerationOptions::default()
                .with_temperature(0.5)
                .with_max_tokens(1000)
                .with_top_k(40),
        };

        let body = serde_json::to_value(build_api_request(request).expect("request should build"))
            .expect("request should serialize");
        assert_eq!(
            body,
            json!({
                "instances": [{
                    "context": "be brief",
                    "examples": [],
                    "messages": [{"author": "user", "content": "user: Hi\n"}]
                }],
                "parameters": {"temperature": 0.5, "maxOutputTokens": 1000, "topK": 40}
            })
        );
    }

    #[test]
    fn candidates_of_all_predictions_are_flattened() {
        let body = r#"{
            "predictions": [
                {"candidates": [{"author": "1", "content": "a"}, {"author": "1", "content": "b"}]},
                {"candidates": [{"author": "1", "content": "c"}]}
            ]
        }"#;

        let response = parse_api_response(body).expect("body should decode");
        let contents = response
            .candidates
            .iter()
            .map(|candidate| candidate.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_predictions_decode_as_empty() {
        let response = parse_api_response("{}").expect("body should decode");
        assert!(response.candidates.is_empty());
    }
}
