//! PaLM chat request and response types.

use pcommon::GenerationOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct PalmRequest {
    pub context: String,
    pub messages: Vec<PalmMessage>,
    pub options: GenerationOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalmMessage {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PalmResponse {
    pub candidates: Vec<PalmCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalmCandidate {
    pub author: String,
    pub content: String,
}
