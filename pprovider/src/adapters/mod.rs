#[cfg(any(feature = "backend-openai", feature = "backend-palm"))]
mod http;

#[cfg(feature = "backend-openai")]
pub mod openai;

#[cfg(feature = "backend-palm")]
pub mod palm;

#[cfg(feature = "backend-ollama")]
pub mod ollama;
