//! Vertex AI transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response};

use crate::adapters::http::{error_for_status, send_error};
use crate::{BackendError, BoxFuture, SecretString};

use super::serde_api::{build_api_request, extract_error_message, parse_api_response};
use super::types::{PalmRequest, PalmResponse};

pub const VERTEX_BASE_URL: &str = "https://us-central1-aiplatform.googleapis.com/v1";

pub trait PalmTransport: Send + Sync + std::fmt::Debug {
    fn predict<'a>(
        &'a self,
        request: PalmRequest,
        access_token: &'a SecretString,
    ) -> BoxFuture<'a, Result<PalmResponse, BackendError>>;
}

#[derive(Debug, Clone)]
pub struct PalmHttpTransport {
    client: Client,
    base_url: String,
    project_id: String,
    location: String,
    model: String,
}

impl PalmHttpTransport {
    pub fn new(client: Client, project_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: VERTEX_BASE_URL.to_string(),
            project_id: project_id.into(),
            location: "us-central1".to_string(),
            model: "chat-bison".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.location,
            self.model
        )
    }

    async fn parse_error(response: Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Vertex request failed with status {status}"));

        error_for_status(status, message)
    }
}

impl PalmTransport for PalmHttpTransport {
    fn predict<'a>(
        &'a self,
        request: PalmRequest,
        access_token: &'a SecretString,
    ) -> BoxFuture<'a, Result<PalmResponse, BackendError>> {
        Box::pin(async move {
            let api_request = build_api_request(request)?;
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(access_token.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let body = response.text().await.map_err(send_error)?;
            parse_api_response(&body)
        })
    }
}
