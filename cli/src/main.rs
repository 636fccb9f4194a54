//! CLI entrypoint for chatbot
//!
//! This is the main binary that wires together all layers using
//! dependency injection: configuration files and flags are merged, the
//! language model and tool modules are loaded from the catalog, and the
//! session runs until the user exits or the backend fails.

use anyhow::{Context, Result, anyhow};
use chatbot_application::{
    ApprovalGate, AutoReject, ConversationLogger, RunSessionUseCase, TranscriptWriter,
    UserInputPort,
};
use chatbot_domain::ModuleParams;
use chatbot_infrastructure::{
    ConfigLoader, FileConfig, FileToolConfig, FileTranscript, JsonlConversationLogger,
    ModuleCatalog, ModuleContext, ToolRegistry,
};
use chatbot_presentation::{
    Cli, ConsolePresenter, InteractiveApproval, LineEditorInput, StdinInput,
    default_history_path,
};
use clap::Parser;
use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if cli.show_config {
        print!("{}", ConfigLoader::config_sources(cli.config.as_deref()));
        return;
    }

    if let Err(e) = run(cli).await {
        eprintln!("Fatal Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).map_err(|e| anyhow!("{}", e))?
    };
    apply_cli(&mut config, &cli)?;
    config.validate()?;

    // Flushes buffered log lines when dropped
    let _guard = init_logging(cli.verbose, config.log.file.as_deref())?;
    info!("Starting chatbot");

    // === Dependency Injection ===
    let catalog = ModuleCatalog::with_builtin();

    let lm = config
        .model
        .module
        .as_deref()
        .ok_or_else(|| anyhow!("No language model is specified. Use --lm or [model] module."))?;
    let model = catalog.load_model(lm, &ModuleParams::parse(&config.model.params))?;
    info!(module = %lm, "Language model loaded");

    let interactive = std::io::stdin().is_terminal();
    let approval: Arc<dyn ApprovalGate> = if interactive {
        Arc::new(InteractiveApproval::new())
    } else {
        Arc::new(AutoReject)
    };
    let context = ModuleContext { approval };

    let mut registry = ToolRegistry::new();
    for tool in &config.tools {
        let loaded = catalog.load_tool(&tool.module, &ModuleParams::parse(&tool.params), &context)?;
        if let Err(e) = registry.register(loaded) {
            warn!("{}", e);
        }
    }
    let stats = registry.stats();
    info!(
        tools = stats.total_tools,
        commands = stats.total_commands,
        shared = stats.shared_commands,
        "Tools registered"
    );

    let presenter = Arc::new(ConsolePresenter::stdout(config.session.show_thinking));
    let mut session =
        RunSessionUseCase::new(model, Arc::new(registry), config.to_session_config()?)
            .with_presenter(presenter);

    if let Some(path) = &config.session.transcript {
        let transcript: Arc<dyn TranscriptWriter> = Arc::new(
            FileTranscript::open(path)
                .with_context(|| format!("Failed to open transcript {}", path.display()))?,
        );
        session = session.with_transcript(transcript);
    }
    if let Some(path) = &config.log.events {
        let logger: Arc<dyn ConversationLogger> = Arc::new(
            JsonlConversationLogger::open(path)
                .with_context(|| format!("Failed to open event log {}", path.display()))?,
        );
        session = session.with_conversation_logger(logger);
    }

    let mut input: Box<dyn UserInputPort> = if interactive {
        Box::new(LineEditorInput::new(default_history_path()))
    } else {
        Box::new(StdinInput::stdin())
    };

    session.run(input.as_mut()).await?;
    Ok(())
}

/// Command-line flags override the merged configuration files.
fn apply_cli(config: &mut FileConfig, cli: &Cli) -> Result<()> {
    if let Some(lm) = &cli.lm {
        config.model.module = Some(lm.clone());
        config.model.params = cli.lm_args.clone().unwrap_or_default();
    } else if let Some(args) = &cli.lm_args {
        config.model.params = args.clone();
    }

    if !cli.tool.is_empty() || !cli.tool_args.is_empty() {
        config.tools = cli
            .tool_modules()
            .map_err(|e| anyhow!(e))?
            .into_iter()
            .map(|(module, params)| FileToolConfig { module, params })
            .collect();
    }

    let session = &mut config.session;
    if let Some(prompt) = &cli.system_prompt {
        session.system_prompt = Some(prompt.clone());
        session.system_prompt_file = None;
    }
    if let Some(path) = &cli.system_prompt_file {
        session.system_prompt_file = Some(path.clone());
    }
    if let Some(path) = &cli.transcript {
        session.transcript = Some(path.clone());
    }
    if let Some(path) = &cli.state_file {
        session.state_file = Some(path.clone());
    }
    if cli.show_thinking {
        session.show_thinking = true;
    }
    if let Some(max) = cli.max_tool_turns {
        session.max_tool_turns = Some(usize::try_from(max).context("--max-tool-turns is too large")?);
    }

    if let Some(path) = &cli.event_log {
        config.log.events = Some(path.clone());
    }
    if let Some(path) = &cli.log_file {
        config.log.file = Some(path.clone());
    }
    Ok(())
}

/// Initialize logging based on verbosity level.
///
/// Logs go to stderr, or to `log_file` through a non-blocking writer, so
/// they never interleave with the reply stream on stdout.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}
