//! Application layer for chatbot
//!
//! This crate contains the session use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    approval::{ApprovalDecision, ApprovalError, ApprovalGate, AutoApprove, AutoReject},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    session_presenter::{NoPresenter, SessionPresenter},
    tool_dispatcher::{NO_TOOLS_TEXT, NoTools, ToolDispatcher},
    transcript::{NoTranscript, TranscriptWriter},
    user_input::{ScriptedInput, UserInputPort},
};
pub use use_cases::run_session::{
    InputOutcome, RunSessionUseCase, SessionError, TOOLS_PLACEHOLDER, TurnReport,
};
