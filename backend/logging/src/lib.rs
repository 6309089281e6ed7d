//! Structured logging for the EcoAware backend.
//!
//! Handles subscriber setup, optional rolling JSON file output, redaction of
//! credentials, and per-request inference event records.

pub mod logger;
pub mod redact;
pub mod request_log;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
pub use request_log::{InferenceEvent, RequestLog};
