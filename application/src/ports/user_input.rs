//! End-user input port

/// Source of end-user lines
///
/// Reading blocks the session: nothing else runs while the user types.
pub trait UserInputPort {
    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Fixed list of lines, for tests and non-interactive runs.
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl UserInputPort for ScriptedInput {
    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}
