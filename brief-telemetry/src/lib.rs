//! # brief-telemetry
//!
//! Structured logging for brief built on `tracing`.
//!
//! ```rust
//! use brief_telemetry::{info, init_telemetry};
//!
//! init_telemetry("brief").expect("telemetry");
//! info!(user_id = "42", "turn started");
//! ```

pub mod init;
pub mod spans;

pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_json_telemetry, init_telemetry, init_with_format};
pub use spans::*;
