//! Raw TOML configuration data types
//!
//! These structs mirror the configuration file:
//!
//! ```toml
//! [model]
//! module = "ollama"
//! params = "model=llama3.2:url=http://localhost:11434"
//!
//! [[tools]]
//! module = "ish"
//! params = "approve=ask"
//!
//! [session]
//! system_prompt_file = "prompt.txt"
//! transcript = "chat.log"
//! max_tool_turns = 8
//!
//! [log]
//! events = "events.jsonl"
//! ```

use chatbot_application::config::{DEFAULT_EXIT_TOKEN, DEFAULT_THINK_PREFIX};
use chatbot_application::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{section} module name cannot be empty")]
    EmptyModuleName { section: &'static str },

    #[error("max_tool_turns cannot be 0")]
    ZeroMaxToolTurns,

    #[error("Failed to read system prompt file {path}: {source}")]
    SystemPromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `[model]`: the language model module to load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub module: Option<String>,
    /// Module parameters, `key=value` pairs joined by `:`
    pub params: String,
}

/// One `[[tools]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolConfig {
    pub module: String,
    pub params: String,
}

/// `[session]`: turn loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub system_prompt: Option<String>,
    /// Takes precedence over `system_prompt`
    pub system_prompt_file: Option<PathBuf>,
    /// Plain-text record of every prompt and reply
    pub transcript: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub exit_token: String,
    pub think_prefix: String,
    /// Print the model's thoughts in think mode
    pub show_thinking: bool,
    pub max_tool_turns: Option<usize>,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            system_prompt_file: None,
            transcript: None,
            state_file: None,
            exit_token: DEFAULT_EXIT_TOKEN.to_string(),
            think_prefix: DEFAULT_THINK_PREFIX.to_string(),
            show_thinking: false,
            max_tool_turns: None,
        }
    }
}

/// `[log]`: diagnostic output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// JSONL conversation event log
    pub events: Option<PathBuf>,
    /// Tracing output file (stderr when unset)
    pub file: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: FileModelConfig,
    pub tools: Vec<FileToolConfig>,
    pub session: FileSessionConfig,
    pub log: FileLogConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(module) = &self.model.module
            && module.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyModuleName { section: "model" });
        }

        if self.tools.iter().any(|t| t.module.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyModuleName { section: "tools" });
        }

        if let Some(0) = self.session.max_tool_turns {
            return Err(ConfigValidationError::ZeroMaxToolTurns);
        }

        Ok(())
    }

    /// The System seed text, read from `system_prompt_file` when set.
    pub fn system_prompt(&self) -> Result<Option<String>, ConfigValidationError> {
        let Some(path) = &self.session.system_prompt_file else {
            return Ok(self.session.system_prompt.clone());
        };
        if self.session.system_prompt.is_some() {
            warn!(file = %path.display(), "Both system_prompt and system_prompt_file are set; using the file");
        }
        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigValidationError::SystemPromptFile {
                path: path.clone(),
                source,
            })
    }

    /// Build the session parameters from the `[session]` section.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigValidationError> {
        let session = &self.session;
        let mut config = SessionConfig::default()
            .with_exit_token(session.exit_token.clone())
            .with_think_prefix(session.think_prefix.clone());
        if let Some(prompt) = self.system_prompt()? {
            config = config.with_system_prompt(prompt);
        }
        if let Some(path) = &session.state_file {
            config = config.with_state_file(path.clone());
        }
        if let Some(max) = session.max_tool_turns {
            config = config.with_max_tool_turns(max);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[model]
module = "ollama"
params = "model=llama3.2:url=http://localhost:11434"

[[tools]]
module = "ish"
params = "approve=never"

[[tools]]
module = "calc"

[session]
system_prompt = "You can use tools.\n{tools}"
transcript = "chat.log"
state_file = "state.json"
exit_token = "/quit"
show_thinking = true
max_tool_turns = 8

[log]
events = "events.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.module.as_deref(), Some("ollama"));
        assert_eq!(config.tools.len(), 2);
        assert_eq!(config.tools[0].params, "approve=never");
        assert_eq!(config.tools[1].params, "");
        assert_eq!(config.session.exit_token, "/quit");
        assert_eq!(config.session.think_prefix, DEFAULT_THINK_PREFIX);
        assert!(config.session.show_thinking);
        assert_eq!(config.log.events, Some(PathBuf::from("events.jsonl")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.model.module.is_none());
        assert!(config.tools.is_empty());
        assert_eq!(config.session.exit_token, DEFAULT_EXIT_TOKEN);
        assert!(!config.session.show_thinking);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_module_name() {
        let config: FileConfig = toml::from_str("[[tools]]\nmodule = \" \"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModuleName { section: "tools" })
        ));

        let config: FileConfig = toml::from_str("[model]\nmodule = \"\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyModuleName { section: "model" })
        ));
    }

    #[test]
    fn test_validate_zero_max_tool_turns() {
        let config: FileConfig = toml::from_str("[session]\nmax_tool_turns = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroMaxToolTurns)
        ));
    }

    #[test]
    fn test_to_session_config() {
        let config: FileConfig = toml::from_str(
            "[session]\nsystem_prompt = \"seed\"\nstate_file = \"s.json\"\nmax_tool_turns = 3\n",
        )
        .unwrap();
        let session = config.to_session_config().unwrap();
        assert_eq!(session.system_prompt.as_deref(), Some("seed"));
        assert_eq!(session.state_file, Some(PathBuf::from("s.json")));
        assert_eq!(session.max_tool_turns, Some(3));
        assert_eq!(session.exit_token, DEFAULT_EXIT_TOKEN);
    }

    #[test]
    fn test_system_prompt_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from file {{tools}}").unwrap();

        let mut config = FileConfig::default();
        config.session.system_prompt = Some("inline".into());
        config.session.system_prompt_file = Some(file.path().to_path_buf());
        assert_eq!(
            config.system_prompt().unwrap().as_deref(),
            Some("from file {tools}")
        );
    }

    #[test]
    fn test_missing_system_prompt_file() {
        let mut config = FileConfig::default();
        config.session.system_prompt_file = Some(PathBuf::from("/nonexistent/prompt.txt"));
        assert!(matches!(
            config.to_session_config(),
            Err(ConfigValidationError::SystemPromptFile { .. })
        ));
    }
}
