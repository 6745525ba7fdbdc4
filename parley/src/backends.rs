//! Backend construction from plain configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::{BackendError, BackendId, ChatBackend, SecretString};

pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(90);

/// Everything needed to construct one backend.
///
/// `credential` is the OpenAI API key or the Vertex access token; Ollama ignores it.
/// `project_id` is only read for PaLM.
#[derive(Debug, Clone)]
pub struct BackendBuildConfig {
    pub backend_id: BackendId,
    pub credential: Option<SecretString>,
    pub model: Option<String>,
    pub project_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl BackendBuildConfig {
    pub fn new(backend_id: BackendId) -> Self {
        Self {
            backend_id,
            credential: None,
            model: None,
            project_id: None,
            base_url: None,
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(SecretString::new(credential));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn required_credential(&self) -> Result<String, BackendError> {
        let credential = self
            .credential
            .as_ref()
            .map(|secret| secret.expose().trim())
            .unwrap_or_default();
        if credential.is_empty() {
            return Err(BackendError::authentication(format!(
                "{} backend requires a credential",
                self.backend_id
            )));
        }
        Ok(credential.to_string())
    }
}

pub fn build_backend(config: BackendBuildConfig) -> Result<Arc<dyn ChatBackend>, BackendError> {
    let http = Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|err| BackendError::transport(err.to_string()))?;

    match config.backend_id {
        BackendId::OpenAi => build_openai_backend(&config, http),
        BackendId::Palm => build_palm_backend(&config, http),
        BackendId::Ollama => build_ollama_backend(&config, http),
    }
}

/// Reads a key file, dropping line breaks so a trailing newline never reaches a header.
pub fn read_credential_file(path: impl AsRef<Path>) -> Result<String, BackendError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|error| {
        BackendError::authentication(format!(
            "failed to read credential file '{}': {error}",
            path.display()
        ))
    })?;

    let credential = raw.replace(['\r', '\n'], "");
    if credential.trim().is_empty() {
        return Err(BackendError::authentication(format!(
            "credential file '{}' is empty",
            path.display()
        )));
    }
    Ok(credential)
}

#[cfg(feature = "backend-openai")]
fn build_openai_backend(
    config: &BackendBuildConfig,
    http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    use pprovider::adapters::openai::{OpenAiBackend, OpenAiHttpTransport, OpenAiModel};

    let api_key = config.required_credential()?;
    let mut transport = OpenAiHttpTransport::new(http);
    if let Some(base_url) = &config.base_url {
        transport = transport.with_base_url(base_url.clone());
    }

    let mut backend = OpenAiBackend::new(api_key, Arc::new(transport));
    if let Some(model) = &config.model {
        let model = OpenAiModel::from_alias(model)
            .or_else(|| OpenAiModel::from_name(model))
            .ok_or_else(|| {
                BackendError::invalid_request(format!(
                    "unknown OpenAI model '{model}', expected one of: {}",
                    OpenAiModel::aliases().collect::<Vec<_>>().join(", ")
                ))
            })?;
        backend = backend.with_model(model);
    }
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "backend-openai"))]
fn build_openai_backend(
    _config: &BackendBuildConfig,
    _http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    Err(BackendError::invalid_request(
        "backend-openai feature is not enabled on parley",
    ))
}

#[cfg(feature = "backend-palm")]
fn build_palm_backend(
    config: &BackendBuildConfig,
    http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    use pprovider::adapters::palm::{PalmBackend, PalmHttpTransport};

    let access_token = config.required_credential()?;
    let project_id = config
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|project| !project.is_empty())
        .ok_or_else(|| BackendError::invalid_request("palm backend requires a project id"))?;

    let mut transport = PalmHttpTransport::new(http, project_id);
    if let Some(base_url) = &config.base_url {
        transport = transport.with_base_url(base_url.clone());
    }
    if let Some(model) = &config.model {
        transport = transport.with_model(model.clone());
    }
    Ok(Arc::new(PalmBackend::new(access_token, Arc::new(transport))))
}

#[cfg(not(feature = "backend-palm"))]
fn build_palm_backend(
    _config: &BackendBuildConfig,
    _http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    Err(BackendError::invalid_request(
        "backend-palm feature is not enabled on parley",
    ))
}

#[cfg(feature = "backend-ollama")]
fn build_ollama_backend(
    config: &BackendBuildConfig,
    http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    use pprovider::adapters::ollama::OllamaBackend;

    let mut transport = OllamaBackend::default_http_transport(http);
    if let Some(base_url) = &config.base_url {
        transport = transport.with_base_url(base_url.clone());
    }

    let mut backend = OllamaBackend::new(Arc::new(transport));
    if let Some(model) = &config.model {
        backend = backend.with_model(model.clone());
    }
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "backend-ollama"))]
fn build_ollama_backend(
    _config: &BackendBuildConfig,
    _http: Client,
) -> Result<Arc<dyn ChatBackend>, BackendError> {
    Err(BackendError::invalid_request(
        "backend-ollama feature is not enabled on parley",
    ))
}
