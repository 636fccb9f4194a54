//! Tool dispatcher port
//!
//! Defines how the session routes a parsed directive to a tool.

use async_trait::async_trait;
use chatbot_domain::tool::{Directive, DispatchError, DispatchOutcome, InputSource};

/// Text used in place of tool documentation when no tool is registered.
pub const NO_TOOLS_TEXT: &str = "No external tools are available.\n";

/// Port for directive dispatch
///
/// Implementations (adapters) live in the infrastructure layer. Dispatch
/// runs inline while the model's reply is still streaming; `input` answers
/// a tool's read-input requests by asking the model for more text.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Route `directive` to its tool and run it.
    async fn dispatch(
        &self,
        directive: &Directive,
        input: &mut dyn InputSource,
    ) -> Result<DispatchOutcome, DispatchError>;

    /// Documentation of every available tool, for the system prompt.
    fn describe(&self) -> String;
}

/// Dispatcher with no tools: every directive is `NotFound`.
pub struct NoTools;

#[async_trait]
impl ToolDispatcher for NoTools {
    async fn dispatch(
        &self,
        directive: &Directive,
        _input: &mut dyn InputSource,
    ) -> Result<DispatchOutcome, DispatchError> {
        Err(DispatchError::NotFound {
            command: directive.command().to_string(),
        })
    }

    fn describe(&self) -> String {
        NO_TOOLS_TEXT.to_string()
    }
}
