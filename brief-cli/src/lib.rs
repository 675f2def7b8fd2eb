//! # brief-cli
//!
//! Command-line launcher for brief.
//!
//! - `brief serve` - the SSE chat server
//! - `brief console` - the same conversation in a terminal, with an optional transcript
//!
//! Settings come from an optional TOML file, then the environment (`OPENAI_API_KEY`,
//! `BRIEF_MODEL`, `BRIEF_EXTRACTION_MODEL`, `BRIEF_BASE_URL`, `BRIEF_DATABASE_URL`, and a
//! `.env` file), then command-line flags.

pub mod app;
pub mod cli;
pub mod config;
pub mod console;
pub mod serve;

pub use app::build_workflow;
pub use config::AppConfig;
