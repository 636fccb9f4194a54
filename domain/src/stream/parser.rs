//! Per-turn stream parser
//!
//! Consumes generated fragments of arbitrary size and turns them into
//! [`ParseEvent`]s. The state is an explicit value owned by the caller: a
//! fresh [`StreamParser`] is created for every generation turn.
//!
//! | State | On a piece of text | Next |
//! |-------|--------------------|------|
//! | `AwaitingFirstFragment` | starts with `!` | `BufferingDirective` |
//! | `AwaitingFirstFragment` | anything else | `PassThrough` (emit text) |
//! | `PassThrough` | ends with `\n` | `AwaitingFirstFragment` |
//! | `BufferingDirective` | ends with `\n` | `AwaitingFirstFragment` (emit directive) |
//! | any | [`finish`](StreamParser::finish) | `Done` |
//!
//! Fragments are cut at line terminators before they are examined, so a
//! fragment carrying the end of one line and the start of the next is
//! handled as two pieces. A directive is only recognised when the marker is
//! the first character of a line.

use crate::tool::{DIRECTIVE_MARKER, Directive, DispatchError};

use super::think::{ThinkFilter, ThinkSplit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingFirstFragment,
    PassThrough,
    BufferingDirective,
    Done,
}

/// Output of the parser, in stream order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEvent {
    /// Visible reply text.
    Text(String),
    /// Thought text; an empty string marks the end of the thought section.
    Thought(String),
    /// A complete directive, ready to dispatch.
    Directive(Directive),
    /// A directive line that could not be tokenized.
    Malformed(DispatchError),
}

#[derive(Debug, Clone)]
pub struct StreamParser {
    state: ParseState,
    pending: String,
    think: Option<ThinkFilter>,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::AwaitingFirstFragment,
            pending: String::new(),
            think: None,
        }
    }

    /// Parser for a turn generated in think mode.
    pub fn with_think() -> Self {
        Self {
            think: Some(ThinkFilter::new()),
            ..Self::new()
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn feed(&mut self, fragment: &str) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        if self.state == ParseState::Done {
            return events;
        }

        let answer = match self.think.as_mut() {
            Some(filter) => {
                let step = filter.feed(fragment);
                if !step.thought.is_empty() {
                    events.push(ParseEvent::Thought(step.thought));
                }
                if step.closed {
                    events.push(ParseEvent::Thought(String::new()));
                }
                step.answer
            }
            None => fragment.to_string(),
        };

        for piece in answer.split_inclusive('\n') {
            self.feed_piece(piece, &mut events);
        }
        events
    }

    /// End the turn. A directive still being buffered is dispatched as if
    /// its line had been terminated.
    pub fn finish(&mut self) -> Vec<ParseEvent> {
        let mut events = Vec::new();
        if self.state == ParseState::Done {
            return events;
        }
        if let Some(filter) = self.think.as_mut() {
            let held = filter.flush();
            if !held.is_empty() {
                events.push(ParseEvent::Thought(held));
            }
        }
        if self.state == ParseState::BufferingDirective {
            self.complete_directive(&mut events);
        }
        self.state = ParseState::Done;
        events
    }

    /// Thought/answer split of the turn so far; `None` outside think mode.
    pub fn think_split(&self) -> Option<ThinkSplit> {
        self.think.as_ref().map(ThinkFilter::split)
    }

    fn feed_piece(&mut self, piece: &str, events: &mut Vec<ParseEvent>) {
        let ends_line = piece.ends_with('\n');
        match self.state {
            ParseState::AwaitingFirstFragment => {
                if let Some(rest) = piece.strip_prefix(DIRECTIVE_MARKER) {
                    self.state = ParseState::BufferingDirective;
                    self.pending.push_str(rest);
                    if ends_line {
                        self.complete_directive(events);
                    }
                } else if !piece.is_empty() {
                    events.push(ParseEvent::Text(piece.to_string()));
                    self.state = if ends_line {
                        ParseState::AwaitingFirstFragment
                    } else {
                        ParseState::PassThrough
                    };
                }
            }
            ParseState::PassThrough => {
                events.push(ParseEvent::Text(piece.to_string()));
                if ends_line {
                    self.state = ParseState::AwaitingFirstFragment;
                }
            }
            ParseState::BufferingDirective => {
                self.pending.push_str(piece);
                if ends_line {
                    self.complete_directive(events);
                }
            }
            ParseState::Done => {}
        }
    }

    fn complete_directive(&mut self, events: &mut Vec<ParseEvent>) {
        let text = std::mem::take(&mut self.pending);
        self.state = ParseState::AwaitingFirstFragment;
        events.push(match Directive::parse(&text) {
            Ok(directive) => ParseEvent::Directive(directive),
            Err(e) => ParseEvent::Malformed(e),
        });
    }
}
