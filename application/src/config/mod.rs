//! Application-level configuration.
//!
//! - [`SessionConfig`]: turn-loop control (exit token, think prefix, tool
//!   turn cap, state file, system prompt)

pub mod session_config;

pub use session_config::{DEFAULT_EXIT_TOKEN, DEFAULT_THINK_PREFIX, SessionConfig};
