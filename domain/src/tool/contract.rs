//! Tool contract
//!
//! A [`Tool`] is an external capability the model can drive by emitting a
//! directive line. Tools are created outside the core and handed to a
//! registry as `Arc<dyn Tool>`; the creator may keep its own reference.
//!
//! Tools never touch process-level stdin/stdout. Output goes through the
//! [`ToolIo`] passed to [`Tool::invoke`], and a request to read input is
//! answered by asking the model to continue generating.

use async_trait::async_trait;

use super::value_objects::{OutputChannel, ToolOutput};

/// A command exposed by a tool. Immutable after the tool is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Source of text for a tool that wants to "read input".
#[async_trait]
pub trait InputSource: Send {
    async fn read_input(&mut self) -> String;
}

/// Input source that never has anything to say.
pub struct NoInput;

#[async_trait]
impl InputSource for NoInput {
    async fn read_input(&mut self) -> String {
        String::new()
    }
}

/// Output sink and input bridge handed to a tool for one invocation.
pub struct ToolIo<'a> {
    output: ToolOutput,
    input: &'a mut dyn InputSource,
}

impl<'a> ToolIo<'a> {
    pub fn new(input: &'a mut dyn InputSource) -> Self {
        Self {
            output: ToolOutput::default(),
            input,
        }
    }

    /// Write normal output.
    pub fn print(&mut self, text: impl AsRef<str>) {
        self.output.push(OutputChannel::Stdout, text.as_ref());
    }

    /// Write diagnostic output.
    pub fn eprint(&mut self, text: impl AsRef<str>) {
        self.output.push(OutputChannel::Stderr, text.as_ref());
    }

    /// Ask for more input. The text comes from the model, not the end user.
    pub async fn read_input(&mut self) -> String {
        self.input.read_input().await
    }

    pub fn output(&self) -> &ToolOutput {
        &self.output
    }

    pub fn into_output(self) -> ToolOutput {
        self.output
    }
}

/// Capability surface of a tool backend.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique identity; doubles as the dispatch namespace.
    fn name(&self) -> &str;

    /// Documentation surfaced to the model.
    fn description(&self) -> &str;

    /// Commands this tool answers to, in display order.
    fn commands(&self) -> &[CommandSpec];

    /// Run the command named by `argv[0]`.
    ///
    /// Returns an exit status; 0 conventionally means success.
    async fn invoke(&self, argv: &[String], io: &mut ToolIo<'_>) -> i32;

    fn has_command(&self, command: &str) -> bool {
        self.commands().iter().any(|c| c.name == command)
    }
}
