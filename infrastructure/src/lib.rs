//! Infrastructure layer for chatbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the tool registry, compiled-in model backends
//! and tools, the module catalog, transcript and event log files, and
//! configuration file loading.

pub mod config;
pub mod logging;
pub mod models;
pub mod modules;
pub mod tools;
pub mod transcript;


// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLogConfig, FileModelConfig,
    FileSessionConfig, FileToolConfig,
};
pub use logging::JsonlConversationLogger;
pub use models::{EchoModel, OllamaModel};
pub use modules::{LoadError, ModuleCatalog, ModuleContext, ModuleKind};
pub use tools::{CalcTool, RegistryStats, ShellTool, ToolRegistry};
pub use transcript::{FileTranscript, TranscriptContents, read_transcript};
