//! Inference Request Log
//!
//! One structured record per served inference request, emitted through
//! `tracing` under the `inference_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

/// Longest chat message prefix kept in a log record.
const MESSAGE_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InferenceEvent {
    Analysis {
        filename: String,
        user_id: String,
        method: String,
        alert: bool,
    },
    Segregation {
        filename: String,
        worker_id: String,
        method: String,
    },
    Chat {
        user_id: String,
        language: String,
        preview: String,
    },
}

#[derive(Debug, Serialize)]
pub struct RequestLog {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: InferenceEvent,
}

impl RequestLog {
    /// Redact free text and emit the record.
    pub fn record(request_id: &str, event: InferenceEvent) -> Self {
        let event = match event {
            InferenceEvent::Chat {
                user_id,
                language,
                preview,
            } => InferenceEvent::Chat {
                user_id,
                language,
                preview: redact_sensitive_data(&truncate_chars(&preview, MESSAGE_PREVIEW_CHARS)),
            },
            other => other,
        };

        let entry = Self {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            event,
        };
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "inference_events", record = %json, "Inference request"),
            Err(_) => info!(target: "inference_events", record = ?entry, "Inference request"),
        }
        entry
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_preview_is_truncated_and_redacted() {
        let long = format!("mail me at a@b.co {}", "x".repeat(200));
        let entry = RequestLog::record(
            "req-1",
            InferenceEvent::Chat {
                user_id: "anonymous".into(),
                language: "en".into(),
                preview: long,
            },
        );
        match entry.event {
            InferenceEvent::Chat { preview, .. } => {
                assert!(preview.starts_with("mail me at [REDACTED_EMAIL]"));
                assert!(!preview.contains("a@b.co"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let entry = RequestLog::record(
            "req-2",
            InferenceEvent::Segregation {
                filename: "mixed.png".into(),
                worker_id: "w1".into(),
                method: "mock".into(),
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "segregation");
        assert_eq!(json["request_id"], "req-2");
    }
}
