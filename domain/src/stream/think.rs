//! Think-mode filter
//!
//! Backends with a think mode open their reply with free-form reasoning and
//! close it with [`THINK_DELIMITER`]. The filter watches the fragment stream
//! for the first complete delimiter, which may be split across any number of
//! fragments, and splits the turn into thought and answer.
//!
//! ```text
//! Thinking ──(delimiter)──▶ Trimming ──(non-blank text)──▶ Answering
//! ```
//!
//! While thinking, the longest tail of the buffered text that could still
//! grow into the delimiter is held back; everything before it is released
//! as thought.

/// Marker that closes the thought section of a reply.
pub const THINK_DELIMITER: &str = "</think>";

const THINK_OPENER: &str = "<think>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkPhase {
    /// Delimiter not yet seen.
    Thinking,
    /// Delimiter seen; dropping whitespace that follows it.
    Trimming,
    /// Everything from here on is answer text.
    Answering,
}

/// What one fragment contributed to each side of the split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinkStep {
    /// Thought text released by this fragment.
    pub thought: String,
    /// True if this fragment completed the delimiter.
    pub closed: bool,
    /// Answer text released by this fragment.
    pub answer: String,
}

/// Thought/answer split of a finished turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinkSplit {
    pub thought: String,
    pub answer: String,
    /// False when the delimiter never appeared; the whole reply is thought.
    pub closed: bool,
}

#[derive(Debug, Clone)]
pub struct ThinkFilter {
    phase: ThinkPhase,
    held: String,
    thought: String,
    answer: String,
}

impl Default for ThinkFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ThinkFilter {
    pub fn new() -> Self {
        Self {
            phase: ThinkPhase::Thinking,
            held: String::new(),
            thought: String::new(),
            answer: String::new(),
        }
    }

    pub fn phase(&self) -> ThinkPhase {
        self.phase
    }

    pub fn feed(&mut self, fragment: &str) -> ThinkStep {
        let mut step = ThinkStep::default();
        match self.phase {
            ThinkPhase::Thinking => {
                let mut buffer = std::mem::take(&mut self.held);
                buffer.push_str(fragment);
                if let Some(at) = buffer.find(THINK_DELIMITER) {
                    step.thought = buffer[..at].to_string();
                    step.closed = true;
                    self.phase = ThinkPhase::Trimming;
                    step.answer = self.trim(&buffer[at + THINK_DELIMITER.len()..]);
                } else {
                    let keep = partial_delimiter_len(&buffer);
                    let split = buffer.len() - keep;
                    self.held = buffer[split..].to_string();
                    buffer.truncate(split);
                    step.thought = buffer;
                }
            }
            ThinkPhase::Trimming => step.answer = self.trim(fragment),
            ThinkPhase::Answering => step.answer = fragment.to_string(),
        }
        self.thought.push_str(&step.thought);
        self.answer.push_str(&step.answer);
        step
    }

    /// Release held-back text at end of turn.
    pub fn flush(&mut self) -> String {
        let held = std::mem::take(&mut self.held);
        self.thought.push_str(&held);
        held
    }

    pub fn split(&self) -> ThinkSplit {
        let thought = self.thought.trim_start();
        let thought = thought.strip_prefix(THINK_OPENER).unwrap_or(thought);
        ThinkSplit {
            thought: thought.trim().to_string(),
            answer: self.answer.clone(),
            closed: self.phase != ThinkPhase::Thinking,
        }
    }

    fn trim(&mut self, text: &str) -> String {
        let rest = text.trim_start();
        if !rest.is_empty() {
            self.phase = ThinkPhase::Answering;
        }
        rest.to_string()
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of the
/// delimiter.
fn partial_delimiter_len(text: &str) -> usize {
    (1..THINK_DELIMITER.len())
        .rev()
        .find(|&k| text.ends_with(&THINK_DELIMITER[..k]))
        .unwrap_or(0)
}
