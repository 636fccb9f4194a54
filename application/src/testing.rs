//! Test doubles shared by the use case tests.

use crate::ports::session_presenter::SessionPresenter;
use crate::ports::tool_dispatcher::{NO_TOOLS_TEXT, ToolDispatcher};
use crate::ports::transcript::TranscriptWriter;
use async_trait::async_trait;
use chatbot_domain::model::{FragmentSink, LanguageModel, ModelError};
use chatbot_domain::session::{Role, TemplateTurn};
use chatbot_domain::tool::{
    CommandSpec, Directive, DispatchError, DispatchOutcome, InputSource, Tool, ToolIo,
};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Model that replays one fragment script per generation.
pub struct ScriptedModel {
    scripts: Mutex<VecDeque<Vec<&'static str>>>,
    ingested: Mutex<Vec<String>>,
    generations: Mutex<usize>,
    saves: Mutex<Vec<PathBuf>>,
    loads: Mutex<Vec<PathBuf>>,
    think: Option<&'static str>,
    fail_ingest: bool,
    fail_generation: bool,
}

impl ScriptedModel {
    pub fn new(scripts: Vec<Vec<&'static str>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ingested: Mutex::new(Vec::new()),
            generations: Mutex::new(0),
            saves: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
            think: None,
            fail_ingest: false,
            fail_generation: false,
        }
    }

    pub fn with_think(mut self, prefix: &'static str) -> Self {
        self.think = Some(prefix);
        self
    }

    pub fn failing_ingest(mut self) -> Self {
        self.fail_ingest = true;
        self
    }

    pub fn failing_generation(mut self) -> Self {
        self.fail_generation = true;
        self
    }

    pub fn ingested(&self) -> Vec<String> {
        self.ingested.lock().unwrap().clone()
    }

    pub fn generations(&self) -> usize {
        *self.generations.lock().unwrap()
    }

    pub fn saves(&self) -> Vec<PathBuf> {
        self.saves.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn apply_template(&self, turns: &[TemplateTurn]) -> String {
        turns
            .iter()
            .map(|turn| match &turn.message {
                Some(message) => format!("{}: {}", turn.role, message.trim()),
                None => format!("{}:", turn.role),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    async fn ingest(&self, text: &str) -> Result<(), ModelError> {
        self.ingested.lock().unwrap().push(text.to_string());
        if self.fail_ingest {
            return Err(ModelError::Ingest("scripted failure".into()));
        }
        Ok(())
    }

    async fn generate_streaming(&self, sink: &mut dyn FragmentSink) -> Result<(), ModelError> {
        *self.generations.lock().unwrap() += 1;
        if self.fail_generation {
            return Err(ModelError::Generation("scripted failure".into()));
        }
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        for fragment in script {
            sink.on_fragment(fragment).await;
        }
        Ok(())
    }

    async fn save_state(&self, path: &Path) -> Result<(), ModelError> {
        self.saves.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn load_state(&self, path: &Path) -> Result<(), ModelError> {
        self.loads.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn think_prefix(&self) -> Option<&str> {
        self.think
    }
}

/// Tool that answers every command with fixed output, or with model input.
pub struct EchoTool {
    name: String,
    output: String,
    status: i32,
    reading: bool,
    commands: Vec<CommandSpec>,
}

impl EchoTool {
    pub fn returning(name: &str, output: &str, status: i32) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
            status,
            reading: false,
            commands: Vec::new(),
        }
    }

    pub fn reading(name: &str) -> Self {
        Self {
            reading: true,
            ..Self::returning(name, "", 0)
        }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "echo"
    }

    fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    async fn invoke(&self, _argv: &[String], io: &mut ToolIo<'_>) -> i32 {
        if self.reading {
            let text = io.read_input().await;
            io.print(text);
        } else {
            io.print(&self.output);
        }
        self.status
    }
}

/// Dispatcher that routes every directive to a single tool, if any.
#[derive(Default)]
pub struct StubDispatcher {
    tool: Option<Arc<dyn Tool>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubDispatcher {
    pub fn with_tool(tool: impl Tool + 'static) -> Self {
        Self {
            tool: Some(Arc::new(tool)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolDispatcher for StubDispatcher {
    async fn dispatch(
        &self,
        directive: &Directive,
        input: &mut dyn InputSource,
    ) -> Result<DispatchOutcome, DispatchError> {
        let argv = directive.tool_argv();
        self.calls.lock().unwrap().push(argv.clone());
        let Some(tool) = &self.tool else {
            return Err(DispatchError::NotFound {
                command: directive.command().to_string(),
            });
        };
        let mut io = ToolIo::new(input);
        let status = tool.invoke(&argv, &mut io).await;
        Ok(DispatchOutcome {
            tool: tool.name().to_string(),
            command_line: directive.text.clone(),
            status,
            output: io.into_output(),
        })
    }

    fn describe(&self) -> String {
        match &self.tool {
            Some(tool) => format!("## Tool {}\n", tool.name()),
            None => NO_TOOLS_TEXT.to_string(),
        }
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    visible: Mutex<String>,
    thought: Mutex<String>,
    thought_ends: Mutex<usize>,
    messages: Mutex<Vec<(Role, String)>>,
}

impl RecordingPresenter {
    pub fn visible(&self) -> String {
        self.visible.lock().unwrap().clone()
    }

    pub fn thought(&self) -> String {
        self.thought.lock().unwrap().clone()
    }

    pub fn thought_ends(&self) -> usize {
        *self.thought_ends.lock().unwrap()
    }

    pub fn messages(&self) -> Vec<(Role, String)> {
        self.messages.lock().unwrap().clone()
    }
}

impl SessionPresenter for RecordingPresenter {
    fn on_assistant_start(&self) {}

    fn on_text(&self, text: &str) {
        self.visible.lock().unwrap().push_str(text);
    }

    fn on_assistant_end(&self) {}

    fn on_turn_message(&self, role: Role, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((role, message.to_string()));
    }

    fn on_thought(&self, text: &str) {
        self.thought.lock().unwrap().push_str(text);
    }

    fn on_thought_end(&self) {
        *self.thought_ends.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingTranscript {
    records: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingTranscript {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

impl TranscriptWriter for RecordingTranscript {
    fn append(&self, record: &str) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other("disk full"));
        }
        self.records.lock().unwrap().push(record.to_string());
        Ok(())
    }
}
