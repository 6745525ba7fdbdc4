mod backend;
mod serde_api;
mod transport;
mod types;

pub use backend::{DEFAULT_INPUT_LIMIT, PalmBackend, default_palm_options};
pub use transport::{PalmHttpTransport, PalmTransport, VERTEX_BASE_URL};
pub use types::{PalmCandidate, PalmMessage, PalmRequest, PalmResponse};
