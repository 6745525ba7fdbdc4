mod backend;
mod model;
mod serde_api;
mod transport;
mod types;

pub use backend::{DEFAULT_MAX_COMPLETION_TOKENS, OpenAiBackend};
pub use model::OpenAiModel;
pub use transport::{OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport};
pub use types::{OpenAiChoice, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiRole, OpenAiUsage};

pub(crate) use backend::first_choice_reply;
