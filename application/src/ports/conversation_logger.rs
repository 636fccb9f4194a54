//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording session events
//! (turn boundaries, dispatched directives, tool results) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation flow in a machine-readable format (JSONL).
//!
//! | Event | Payload |
//! |-------|---------|
//! | `turn_start` | `role`, `message`, `think` |
//! | `directive` | `command`, `argv` |
//! | `tool_result` | `command`, `tool`, `status` or `error` |
//! | `turn_end` | `reply`, `directives` |
//! | `session_end` | `reason` |

use serde_json::Value;

/// A structured conversation event for logging.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The timestamp is added by the logger when the event is written.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "turn_start", "tool_result").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; logging failures are ignored.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
