//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod approval;
pub mod conversation_logger;
pub mod session_presenter;
pub mod tool_dispatcher;
pub mod transcript;
pub mod user_input;
