#![cfg(feature = "backend-ollama")]

use std::sync::{Arc, Mutex};

use pprovider::adapters::ollama::OllamaBackend;
use pprovider::adapters::openai::{
    OpenAiChoice, OpenAiRequest, OpenAiResponse, OpenAiTransport, OpenAiUsage,
};
use pprovider::{
    BackendError, BackendId, BoxFuture, ChatBackend, Message, Role, SecretString,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_key: Mutex<Option<String>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: &'a SecretString,
    ) -> BoxFuture<'a, Result<OpenAiResponse, BackendError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_key.lock().expect("key lock") = Some(api_key.expose().to_string());

            Ok(OpenAiResponse {
                model: "llama2".to_string(),
                choices: vec![OpenAiChoice {
                    content: "ollama-ok".to_string(),
                    finish_reason: Some("stop".to_string()),
                }],
                usage: OpenAiUsage::default(),
            })
        })
    }
}

#[tokio::test]
async fn ollama_send_uses_placeholder_auth_and_plain_content() {
    let transport = Arc::new(FakeTransport::default());
    let backend = OllamaBackend::new(transport.clone()).with_model("mistral");

    let output = backend
        .send(vec![Message::new("local", Role::User, "hi")])
        .await
        .expect("send should succeed");
    assert_eq!(backend.id(), BackendId::Ollama);
    assert_eq!(output.len(), 2);
    assert_eq!(output[1].role, Role::Assistant);
    assert_eq!(output[1].content, "ollama-ok");
    assert_eq!(output[1].conversation_id.as_str(), "local");

    let key = transport
        .captured_key
        .lock()
        .expect("key lock")
        .clone()
        .expect("key should be captured");
    assert_eq!(key, "ollama-local");

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured.model, "mistral");
    assert_eq!(captured.messages[0].content, "hi");
}
