//! Presentation layer for chatbot
//!
//! This crate contains the CLI definition, the console presenter that
//! streams a session to the terminal, line-editor input, and the
//! interactive approval prompt for tool commands.

pub mod approval;
pub mod cli;
pub mod input;
pub mod output;

// Re-export commonly used types
pub use approval::InteractiveApproval;
pub use cli::commands::Cli;
pub use input::{LineEditorInput, StdinInput, default_history_path};
pub use output::console::ConsolePresenter;
