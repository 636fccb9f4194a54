//! Configuration file loading for chatbot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./chatbot.toml` or `./.chatbot.toml`
//! 3. Global: `$XDG_CONFIG_HOME/chatbot/config.toml`
//! 4. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLogConfig, FileModelConfig, FileSessionConfig,
    FileToolConfig,
};
pub use loader::ConfigLoader;
