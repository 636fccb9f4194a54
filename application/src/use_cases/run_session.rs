//! Run Session use case.
//!
//! Drives one conversation between the end user, a language model and the
//! registered tools.
//!
//! ```text
//! user line ──▶ BuildPrompt ──▶ Ingest ──▶ Generate ──┬──▶ no directive: back to user
//!                   ▲                                 │
//!                   └──── System turn (tool reports) ◀┘
//! ```
//!
//! Fragments are parsed while the reply is still streaming, and directives
//! are dispatched inline: a tool runs before the next fragment is handled.

use crate::config::SessionConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::session_presenter::{NoPresenter, SessionPresenter};
use crate::ports::tool_dispatcher::ToolDispatcher;
use crate::ports::transcript::{NoTranscript, TranscriptWriter};
use crate::ports::user_input::UserInputPort;
use async_trait::async_trait;
use chatbot_domain::model::{FragmentSink, LanguageModel, ModelError};
use chatbot_domain::session::{Message, Role, TemplateTurn, Transcript};
use chatbot_domain::stream::{ParseEvent, StreamParser};
use chatbot_domain::tool::{Directive, InputSource};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Placeholder in the system prompt replaced by the tool documentation.
pub const TOOLS_PLACEHOLDER: &str = "{tools}";

/// Errors that end a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(ModelError),

    #[error(transparent)]
    Generation(ModelError),
}

/// What happened to one line of end-user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The exchange finished; control is back with the user.
    Continue(TurnReport),
    /// The user asked to end the session.
    Exit,
}

/// Summary of one exchange (a user turn plus any tool-loop turns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Generation turns run, including tool-loop turns.
    pub turns: usize,
    /// Directives seen, whether or not they dispatched.
    pub directives: usize,
    /// Raw text of the last reply.
    pub reply: String,
    /// True if the tool loop was cut short by `max_tool_turns`.
    pub capped: bool,
}

/// Result of one generation turn.
struct TurnOutput {
    reply: String,
    results: Vec<String>,
    directives: usize,
}

/// Use case for running an interactive session.
pub struct RunSessionUseCase {
    model: Arc<dyn LanguageModel>,
    tools: Arc<dyn ToolDispatcher>,
    presenter: Arc<dyn SessionPresenter>,
    transcript: Arc<dyn TranscriptWriter>,
    conversation_logger: Arc<dyn ConversationLogger>,
    config: SessionConfig,
    history: Transcript,
    /// System seed still waiting to be sent with the first turn.
    seed: Option<String>,
    started: bool,
}

impl RunSessionUseCase {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: Arc<dyn ToolDispatcher>,
        config: SessionConfig,
    ) -> Self {
        Self {
            model,
            tools,
            presenter: Arc::new(NoPresenter),
            transcript: Arc::new(NoTranscript),
            conversation_logger: Arc::new(NoConversationLogger),
            config,
            history: Transcript::default(),
            seed: None,
            started: false,
        }
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn SessionPresenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptWriter>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Messages exchanged so far, in order.
    pub fn history(&self) -> &Transcript {
        &self.history
    }

    /// Restore prior model state and prepare the System seed.
    ///
    /// Called implicitly by [`handle_input`](Self::handle_input); calling it
    /// again is a no-op.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let mut state_loaded = false;
        if let Some(path) = &self.config.state_file {
            if path.exists() {
                match self.model.load_state(path).await {
                    Ok(()) => {
                        info!("Restored model state from {}", path.display());
                        state_loaded = true;
                    }
                    Err(e) => warn!("Failed to restore model state from {}: {}", path.display(), e),
                }
            } else {
                debug!("No prior model state at {}", path.display());
            }
        }

        if state_loaded {
            return;
        }
        match self.config.system_prompt.as_deref() {
            Some(prompt) if !prompt.trim().is_empty() => {
                let seed = if prompt.contains(TOOLS_PLACEHOLDER) {
                    prompt.replace(TOOLS_PLACEHOLDER, &self.tools.describe())
                } else {
                    prompt.to_string()
                };
                self.seed = Some(seed);
            }
            _ => warn!("No system prompt was set."),
        }
    }

    /// Handle one line of end-user input.
    ///
    /// Runs the user turn and every tool-loop turn it triggers. Only
    /// ingestion and generation failures are returned as errors.
    pub async fn handle_input(&mut self, input: &str) -> Result<InputOutcome, SessionError> {
        self.start().await;

        if self.config.is_exit(input) {
            info!("Exit requested");
            return Ok(InputOutcome::Exit);
        }
        if input.trim().is_empty() {
            return Ok(InputOutcome::Continue(TurnReport::default()));
        }

        let (text, think) = match self.config.strip_think_prefix(input) {
            Some(rest) if self.model.think_prefix().is_some() => (rest, true),
            _ => (input, false),
        };

        let mut report = TurnReport::default();
        let mut message = Message::user(text);
        let mut tool_turns = 0usize;

        loop {
            let output = self.run_turn(message, think).await?;
            report.turns += 1;
            report.directives += output.directives;
            report.reply = output.reply;

            if output.results.is_empty() {
                break;
            }

            let combined = output.results.concat();
            self.presenter.on_turn_message(Role::System, &combined);

            if let Some(max) = self.config.max_tool_turns
                && tool_turns >= max
            {
                warn!("Tool loop exceeded max_tool_turns ({})", max);
                report.capped = true;
                break;
            }
            tool_turns += 1;
            debug!("Tool turn {}: feeding back {} bytes", tool_turns, combined.len());
            message = Message::system(combined);
        }

        Ok(InputOutcome::Continue(report))
    }

    /// Run the session until the user exits, input ends, or a fatal error.
    ///
    /// Exactly one state-save attempt is made on the way out, whatever the
    /// reason for stopping.
    pub async fn run(&mut self, input: &mut dyn UserInputPort) -> Result<(), SessionError> {
        self.start().await;

        let result = loop {
            let Some(line) = input.read_line() else {
                info!("End of input");
                break Ok(());
            };
            match self.handle_input(&line).await {
                Ok(InputOutcome::Exit) => break Ok(()),
                Ok(InputOutcome::Continue(_)) => {}
                Err(e) => break Err(e),
            }
        };

        self.save_state().await;
        self.conversation_logger.log(ConversationEvent::new(
            "session_end",
            serde_json::json!({
                "reason": match &result {
                    Ok(()) => "exit".to_string(),
                    Err(e) => e.to_string(),
                },
            }),
        ));
        result
    }

    /// Save model state if a state file is configured. Failures are logged.
    pub async fn save_state(&self) -> bool {
        let Some(path) = &self.config.state_file else {
            return false;
        };
        match self.model.save_state(path).await {
            Ok(()) => {
                info!("Saved model state to {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to save model state to {}: {}", path.display(), e);
                false
            }
        }
    }

    async fn run_turn(&mut self, message: Message, think: bool) -> Result<TurnOutput, SessionError> {
        let mut turns = Vec::with_capacity(3);
        if let Some(seed) = self.seed.take() {
            let seed = Message::system(seed);
            turns.push(TemplateTurn::from(&seed));
            self.history.push(seed);
        }
        turns.push(TemplateTurn::from(&message));
        turns.push(TemplateTurn::open(Role::Assistant));

        let mut prompt = self.model.apply_template(&turns);
        if think && let Some(prefix) = self.model.think_prefix() {
            prompt.push_str(prefix);
        }

        self.conversation_logger.log(ConversationEvent::new(
            "turn_start",
            serde_json::json!({
                "role": message.role.as_str(),
                "message": message.content,
                "think": think,
            }),
        ));
        self.history.push(message);
        self.record(&prompt);

        debug!("Ingesting {} bytes into {}", prompt.len(), self.model.name());
        self.model
            .ingest(&prompt)
            .await
            .map_err(SessionError::Ingest)?;

        let mut sink = TurnSink {
            parser: if think {
                StreamParser::with_think()
            } else {
                StreamParser::new()
            },
            model: self.model.clone(),
            tools: self.tools.clone(),
            presenter: self.presenter.clone(),
            conversation_logger: self.conversation_logger.clone(),
            reply: String::new(),
            results: Vec::new(),
            directives: 0,
        };

        self.presenter.on_assistant_start();
        let generated = self.model.generate_streaming(&mut sink).await;
        if generated.is_ok() {
            sink.finish().await;
        }
        self.presenter.on_assistant_end();
        generated.map_err(SessionError::Generation)?;

        let TurnSink {
            reply,
            results,
            directives,
            ..
        } = sink;

        self.record(&reply);
        self.history.push(Message::assistant(reply.clone()));
        self.conversation_logger.log(ConversationEvent::new(
            "turn_end",
            serde_json::json!({
                "reply": reply,
                "directives": directives,
            }),
        ));

        Ok(TurnOutput {
            reply,
            results,
            directives,
        })
    }

    fn record(&self, text: &str) {
        if let Err(e) = self.transcript.append(text) {
            warn!("Failed to write transcript: {}", e);
        }
    }
}

/// Receives fragments of one generation turn and acts on parse events.
struct TurnSink {
    parser: StreamParser,
    model: Arc<dyn LanguageModel>,
    tools: Arc<dyn ToolDispatcher>,
    presenter: Arc<dyn SessionPresenter>,
    conversation_logger: Arc<dyn ConversationLogger>,
    reply: String,
    /// Tool reports and diagnostics, in dispatch order.
    results: Vec<String>,
    directives: usize,
}

impl TurnSink {
    async fn handle(&mut self, events: Vec<ParseEvent>) {
        for event in events {
            match event {
                ParseEvent::Text(text) => self.presenter.on_text(&text),
                ParseEvent::Thought(text) if text.is_empty() => self.presenter.on_thought_end(),
                ParseEvent::Thought(text) => self.presenter.on_thought(&text),
                ParseEvent::Directive(directive) => self.dispatch(directive).await,
                ParseEvent::Malformed(e) => {
                    self.directives += 1;
                    debug!("Malformed directive: {}", e);
                    self.results.push(format!("{}\n", e));
                }
            }
        }
    }

    async fn dispatch(&mut self, directive: Directive) {
        self.directives += 1;
        self.conversation_logger.log(ConversationEvent::new(
            "directive",
            serde_json::json!({
                "command": directive.text,
                "argv": directive.argv,
            }),
        ));

        let mut input = ModelInput {
            model: self.model.clone(),
        };
        match self.tools.dispatch(&directive, &mut input).await {
            Ok(outcome) => {
                debug!(tool = %outcome.tool, status = outcome.status, "Directive dispatched");
                self.conversation_logger.log(ConversationEvent::new(
                    "tool_result",
                    serde_json::json!({
                        "command": directive.text,
                        "tool": outcome.tool,
                        "status": outcome.status,
                    }),
                ));
                self.results.push(outcome.report());
            }
            Err(e) => {
                debug!("Dispatch of \"{}\" failed: {}", directive.text, e);
                self.conversation_logger.log(ConversationEvent::new(
                    "tool_result",
                    serde_json::json!({
                        "command": directive.text,
                        "error": e.to_string(),
                    }),
                ));
                self.results.push(format!("{}\n", e));
            }
        }
    }

    async fn finish(&mut self) {
        let events = self.parser.finish();
        self.handle(events).await;
    }
}

#[async_trait]
impl FragmentSink for TurnSink {
    async fn on_fragment(&mut self, fragment: &str) {
        self.reply.push_str(fragment);
        let events = self.parser.feed(fragment);
        self.handle(events).await;
    }
}

/// Answers a tool's read-input request by asking the model to continue.
struct ModelInput {
    model: Arc<dyn LanguageModel>,
}

#[async_trait]
impl InputSource for ModelInput {
    async fn read_input(&mut self) -> String {
        match self.model.generate().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Tool input request failed: {}", e);
                String::new()
            }
        }
    }
}
