//! OpenAI-compatible chat completions provider.
//!
//! Works against api.openai.com and any server that speaks the same
//! `/chat/completions` protocol (vLLM, Ollama, LiteLLM, ...).

mod client;
mod config;
pub mod convert;
mod stream;

pub use client::OpenAIClient;
pub use config::{OPENAI_API_BASE, OpenAIConfig};
pub use stream::StreamDecoder;
