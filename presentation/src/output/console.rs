//! Console presenter for a running session
//!
//! Reply text is written as it streams in. Tool results fed back to the
//! model are shown in a `System:` block, and think-mode thoughts are shown
//! dimmed only when requested.

use chatbot_application::SessionPresenter;
use chatbot_domain::Role;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Mutex;

struct ConsoleState {
    out: Box<dyn Write + Send>,
    /// Whether the last byte written ended a line
    at_line_start: bool,
    wrote_thought: bool,
}

impl ConsoleState {
    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // A closed stdout must not abort the session.
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
        self.at_line_start = text.ends_with('\n');
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            self.write("\n");
        }
    }
}

/// Streams a session to a terminal
pub struct ConsolePresenter {
    state: Mutex<ConsoleState>,
    show_thinking: bool,
    color: bool,
}

impl ConsolePresenter {
    /// Presenter writing to stdout.
    pub fn stdout(show_thinking: bool) -> Self {
        Self::with_writer(Box::new(io::stdout()), show_thinking, true)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, show_thinking: bool, color: bool) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                out,
                at_line_start: true,
                wrote_thought: false,
            }),
            show_thinking,
            color,
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut ConsoleState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }

    fn label(&self, role: Role) -> String {
        let text = format!("{}:", role);
        if !self.color {
            return text;
        }
        match role {
            Role::System => text.yellow().bold().to_string(),
            Role::User => text.cyan().bold().to_string(),
            Role::Assistant => text.green().bold().to_string(),
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

impl SessionPresenter for ConsolePresenter {
    fn on_assistant_start(&self) {
        self.with_state(|state| {
            state.end_line();
            state.wrote_thought = false;
        });
    }

    fn on_text(&self, text: &str) {
        self.with_state(|state| state.write(text));
    }

    fn on_assistant_end(&self) {
        self.with_state(ConsoleState::end_line);
    }

    fn on_turn_message(&self, role: Role, message: &str) {
        let label = self.label(role);
        let body = self.dim(message);
        self.with_state(|state| {
            state.end_line();
            state.write(&format!("{}\n", label));
            state.write(&body);
            state.end_line();
        });
    }

    fn on_thought(&self, text: &str) {
        if !self.show_thinking {
            return;
        }
        let text = self.dim(text);
        self.with_state(|state| {
            state.write(&text);
            state.wrote_thought = true;
        });
    }

    fn on_thought_end(&self) {
        if !self.show_thinking {
            return;
        }
        let rule = self.dim("----");
        self.with_state(|state| {
            if state.wrote_thought {
                state.end_line();
                state.write(&format!("{}\n", rule));
            }
        });
    }
}
