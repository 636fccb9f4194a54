//! Line-editor input with persistent history, and a plain stdin reader for
//! when stdin is not a terminal.

use chatbot_application::UserInputPort;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing::{debug, warn};

const HISTORY_CAPACITY: usize = 1_000;

/// `$XDG_DATA_HOME/chatbot/history.txt`
pub fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("chatbot").join("history.txt"))
}

/// Interactive input through reedline
pub struct LineEditorInput {
    editor: Reedline,
    prompt: DefaultPrompt,
}

impl LineEditorInput {
    pub fn new(history_path: Option<PathBuf>) -> Self {
        let mut editor = Reedline::create();
        if let Some(path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => warn!("History disabled ({}): {}", path.display(), e),
            }
        }
        Self {
            editor,
            prompt: DefaultPrompt::new(
                DefaultPromptSegment::Basic("User".to_string()),
                DefaultPromptSegment::Empty,
            ),
        }
    }
}

impl UserInputPort for LineEditorInput {
    fn read_line(&mut self) -> Option<String> {
        match self.editor.read_line(&self.prompt) {
            Ok(Signal::Success(buffer)) => Some(buffer),
            // Abandon the current line; the session ignores blank input.
            Ok(Signal::CtrlC) => Some(String::new()),
            Ok(Signal::CtrlD) => None,
            Ok(_) => None,
            Err(e) => {
                warn!("Line editor failed: {}", e);
                None
            }
        }
    }
}

/// Line-by-line reader for piped input
pub struct StdinInput<R> {
    reader: R,
}

impl StdinInput<BufReader<std::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead> StdinInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> UserInputPort for StdinInput<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
            Err(e) => {
                debug!("stdin read failed: {}", e);
                None
            }
        }
    }
}
