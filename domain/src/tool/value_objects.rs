//! Tool domain value objects - captured output and dispatch results

use serde::{Deserialize, Serialize};

/// Channel a piece of tool output was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputChannel {
    Stdout,
    Stderr,
}

/// Ordered output captured from one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    chunks: Vec<(OutputChannel, String)>,
}

impl ToolOutput {
    pub fn push(&mut self, channel: OutputChannel, text: &str) {
        if text.is_empty() {
            return;
        }
        self.chunks.push((channel, text.to_string()));
    }

    /// All output in write order, regardless of channel.
    pub fn text(&self) -> String {
        self.chunks.iter().map(|(_, text)| text.as_str()).collect()
    }

    pub fn has_diagnostics(&self) -> bool {
        self.chunks
            .iter()
            .any(|(channel, _)| *channel == OutputChannel::Stderr)
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Identity of the tool that ran.
    pub tool: String,
    /// Command text as the model wrote it, without the marker.
    pub command_line: String,
    /// Implementation-defined exit status.
    pub status: i32,
    pub output: ToolOutput,
}

impl DispatchOutcome {
    /// Status line appended after every invocation.
    pub fn status_line(&self) -> String {
        format!(
            "Command \"{}\" is returned with code {}",
            self.command_line, self.status
        )
    }

    /// Tool output followed by the status line, ready to feed back as a
    /// System turn.
    pub fn report(&self) -> String {
        let mut report = self.output.text();
        if !report.is_empty() && !report.ends_with('\n') {
            report.push('\n');
        }
        report.push_str(&self.status_line());
        report.push('\n');
        report
    }
}
