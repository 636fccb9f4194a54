//! Session parameters for the turn loop.
//!
//! [`SessionConfig`] groups the static parameters that control the loop in
//! [`RunSessionUseCase`](crate::use_cases::run_session::RunSessionUseCase).
//! The infrastructure layer builds it from the merged configuration files and
//! command-line flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input that ends the session when it is the whole (trimmed) user line.
pub const DEFAULT_EXIT_TOKEN: &str = "!exit";

/// Input prefix that turns on think mode for one exchange.
pub const DEFAULT_THINK_PREFIX: &str = "!think";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Text of the one-time System seed; `{tools}` is replaced with the tool
    /// documentation.
    pub system_prompt: Option<String>,
    pub exit_token: String,
    pub think_prefix: String,
    /// Model state is loaded from here at start and saved here on exit.
    pub state_file: Option<PathBuf>,
    /// Cap on consecutive tool-loop turns; `None` means unlimited.
    pub max_tool_turns: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            exit_token: DEFAULT_EXIT_TOKEN.to_string(),
            think_prefix: DEFAULT_THINK_PREFIX.to_string(),
            state_file: None,
            max_tool_turns: None,
        }
    }
}

impl SessionConfig {
    // ==================== Builder Methods ====================

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_exit_token(mut self, token: impl Into<String>) -> Self {
        self.exit_token = token.into();
        self
    }

    pub fn with_think_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.think_prefix = prefix.into();
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = Some(max);
        self
    }

    /// True if `input` asks to end the session.
    pub fn is_exit(&self, input: &str) -> bool {
        input.trim() == self.exit_token
    }

    /// Strip the think prefix from `input`, if present.
    pub fn strip_think_prefix<'a>(&self, input: &'a str) -> Option<&'a str> {
        if self.think_prefix.is_empty() {
            return None;
        }
        input
            .trim_start()
            .strip_prefix(self.think_prefix.as_str())
            .map(str::trim_start)
    }
}
