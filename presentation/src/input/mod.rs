//! End-user input sources

mod line_editor;

pub use line_editor::{LineEditorInput, StdinInput, default_history_path};
