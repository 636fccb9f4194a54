//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for chatbot
#[derive(Parser, Debug, Default)]
#[command(name = "chatbot")]
#[command(author, version, about = "Conversational agent that lets a language model run tools")]
#[command(long_about = r#"
Chatbot runs a conversation between you and a language model. When the model
starts a line of its reply with '!', the rest of the line is run as a command
of a loaded tool and the result is fed back to the model.

Configuration files are loaded from (in priority order):
1. --config <path>      Explicit config file
2. ./chatbot.toml       Project-level config
3. ~/.config/chatbot/config.toml   Global config
Command-line flags override every file.

Example:
  chatbot --lm ollama --lm-args model=llama3.2 --tool ish --tool calc \
          --system-prompt-file prompt.txt
  chatbot --lm echo --tool calc
"#)]
pub struct Cli {
    /// Language model module (ollama, echo)
    #[arg(long, value_name = "MODULE")]
    pub lm: Option<String>,

    /// Parameters for the language model, as key=value pairs joined by ':'
    #[arg(long, value_name = "ARGS")]
    pub lm_args: Option<String>,

    /// Tool module to load (can be specified multiple times)
    #[arg(long, value_name = "MODULE")]
    pub tool: Vec<String>,

    /// Parameters for the tool at the same position in --tool
    #[arg(long, value_name = "ARGS")]
    pub tool_args: Vec<String>,

    /// System prompt for the session; {tools} is replaced by tool documentation
    #[arg(long, value_name = "TEXT")]
    pub system_prompt: Option<String>,

    /// Read the system prompt from a file
    #[arg(long, value_name = "PATH")]
    pub system_prompt_file: Option<PathBuf>,

    /// Append every prompt and reply to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Load model state from this file at start and save it on exit
    #[arg(long, value_name = "PATH")]
    pub state_file: Option<PathBuf>,

    /// Show the model's thoughts in think mode
    #[arg(long)]
    pub show_thinking: bool,

    /// Stop the tool loop after this many consecutive tool turns
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_tool_turns: Option<u64>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write conversation events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Pair each `--tool` with the `--tool-args` at the same position.
    ///
    /// Tools without a matching `--tool-args` get no parameters.
    pub fn tool_modules(&self) -> Result<Vec<(String, String)>, String> {
        if self.tool_args.len() > self.tool.len() {
            return Err(format!(
                "{} --tool-args given for {} --tool",
                self.tool_args.len(),
                self.tool.len()
            ));
        }
        Ok(self
            .tool
            .iter()
            .enumerate()
            .map(|(i, module)| {
                let args = self.tool_args.get(i).cloned().unwrap_or_default();
                (module.clone(), args)
            })
            .collect())
    }
}
