//! Tool error taxonomy
//!
//! | Error | Raised by | Effect on the session |
//! |-------|-----------|-----------------------|
//! | [`DispatchError`] | routing a directive | diagnostic System turn |
//! | [`RegistryError`] | register / unregister / lookup | warning, continue |
//! | [`ToolError`] | constructing a tool | fatal at startup |

use thiserror::Error;

/// Failure to route or parse a directive. Never fatal.
///
/// The `Display` text is fed back to the model verbatim, so it is worded
/// as instructions the model can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("No command named \"{command}\" is found.")]
    NotFound { command: String },

    #[error("Tool \"{namespace}\" is not found.")]
    ToolNotFound { namespace: String },

    #[error("{}", ambiguous_message(.command, .owners))]
    Ambiguous { command: String, owners: Vec<String> },

    #[error("Failed to parse command \"{command}\": {reason}")]
    ParseFailure { command: String, reason: String },
}

fn ambiguous_message(command: &str, owners: &[String]) -> String {
    let example = owners.first().map(String::as_str).unwrap_or("tool");
    format!(
        "Command \"{command}\" is provided by some tools: {}\n\
         To call this command, you need to specify tool name, like \"{example}::{command}\".",
        owners.join(", ")
    )
}

/// Registry bookkeeping failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool \"{0}\" is already registered")]
    NameConflict(String),

    #[error("Tool \"{0}\" is not registered")]
    NotFound(String),
}

/// A tool backend rejected its construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Invalid parameter: {0}")]
    Parameter(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_lists_every_owner() {
        let err = DispatchError::Ambiguous {
            command: "add".into(),
            owners: vec!["a".into(), "b".into(), "c".into()],
        };
        let text = err.to_string();
        assert!(text.starts_with("Command \"add\" is provided by some tools: a, b, c\n"));
        assert!(text.ends_with("like \"a::add\"."));
    }

    #[test]
    fn not_found_texts() {
        assert_eq!(
            DispatchError::NotFound { command: "x".into() }.to_string(),
            "No command named \"x\" is found."
        );
        assert_eq!(
            DispatchError::ToolNotFound { namespace: "t".into() }.to_string(),
            "Tool \"t\" is not found."
        );
    }
}
