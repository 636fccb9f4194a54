//! Streaming reply parsing.
//!
//! - [`parser::StreamParser`]: per-turn state machine that separates visible
//!   text from directive lines across arbitrary fragment boundaries
//! - [`think::ThinkFilter`]: splits a think-mode reply at `</think>`

pub mod parser;
pub mod think;

pub use parser::{ParseEvent, ParseState, StreamParser};
pub use think::{THINK_DELIMITER, ThinkFilter, ThinkPhase, ThinkSplit, ThinkStep};
