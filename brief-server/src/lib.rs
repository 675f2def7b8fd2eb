//! # brief-server
//!
//! HTTP surface for brief. `POST /chat` runs one conversation turn and streams it to the
//! client as server-sent events:
//!
//! | event | payload |
//! |---|---|
//! | `initial` | acknowledgement or the first progress note |
//! | `thought` | progress note |
//! | `chat` | assistant text |
//! | `report_block` | one Editor.js block as JSON |
//! | `error` | failure text, terminal |
//! | `final` | completion, terminal |
//!
//! [`EventTranslator`] holds the rules for mapping conversation messages onto these
//! events and is usable without the HTTP layer.

pub mod config;
pub mod report;
pub mod rest;
pub mod sse;
pub mod translate;
pub mod web_ui;

pub use config::{SecurityConfig, ServerConfig};
pub use report::{BlockKind, ReportBlock, ReportDocument, parse_report};
pub use rest::create_app;
pub use sse::{EventKind, FINAL_TEXT, SseEvent};
pub use translate::{EventTranslator, translate_stream};
