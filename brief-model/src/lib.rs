//! # brief-model
//!
//! Model providers for brief.
//!
//! - [`OpenAIClient`] - OpenAI-compatible chat completions (streaming and non-streaming)
//! - [`MockLlm`] - scripted responses for tests
//! - [`retry`] - exponential backoff around provider requests

pub mod mock;
pub mod openai;
pub mod retry;

pub use mock::MockLlm;
pub use openai::{OPENAI_API_BASE, OpenAIClient, OpenAIConfig, StreamDecoder};
pub use retry::RetryConfig;
