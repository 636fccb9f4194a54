//! Offline echo backend
//!
//! Streams back the last user message ingested since the previous
//! generation, in fixed-size chunks. Useful for exercising the session
//! wiring without a model server: typing `!calc::add 1 2` makes the echo
//! "model" issue that directive.

use super::template::render_plain;
use async_trait::async_trait;
use chatbot_domain::model::{FragmentSink, LanguageModel, ModelError};
use chatbot_domain::module::ModuleParams;
use chatbot_domain::session::{Role, TemplateTurn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

pub const ECHO: &str = "echo";

const DEFAULT_CHUNK: usize = 4;

#[derive(Debug, Default, Serialize, Deserialize)]
struct EchoState {
    /// Text ingested since the last generation
    pending: String,
}

pub struct EchoModel {
    chunk: usize,
    state: Mutex<EchoState>,
}

impl EchoModel {
    pub fn new(chunk: usize) -> Self {
        Self {
            chunk: chunk.max(1),
            state: Mutex::new(EchoState::default()),
        }
    }

    pub fn from_params(params: &ModuleParams) -> Result<Self, ModelError> {
        let chunk: usize = params
            .get_parsed("chunk", DEFAULT_CHUNK)
            .map_err(|e| ModelError::Parameter(e.to_string()))?;
        if chunk == 0 {
            return Err(ModelError::Parameter("chunk must be at least 1".into()));
        }
        Ok(Self::new(chunk))
    }
}

/// Message of the last `User:` block in text rendered by [`render_plain`].
fn last_user_message(text: &str) -> Option<&str> {
    let labels = [Role::System, Role::User, Role::Assistant].map(|r| format!("{}:", r));
    let is_block_start = |at: &str| labels.iter().any(|label| at.starts_with(label.as_str()));

    let mut starts = vec![0];
    let mut from = 0;
    while let Some(offset) = text[from..].find("\n\n") {
        let boundary = from + offset + 2;
        if is_block_start(&text[boundary..]) {
            starts.push(boundary);
        }
        from = boundary;
    }

    let user_label = format!("{}:", Role::User);
    starts
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, &start)| {
            let end = starts.get(i + 1).map_or(text.len(), |&next| next - 2);
            text[start..end].strip_prefix(user_label.as_str())
        })
        .map(str::trim)
}

/// Split `text` into pieces of at most `size` characters.
fn chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[async_trait]
impl LanguageModel for EchoModel {
    fn name(&self) -> &str {
        ECHO
    }

    fn apply_template(&self, turns: &[TemplateTurn]) -> String {
        render_plain(turns)
    }

    async fn ingest(&self, text: &str) -> Result<(), ModelError> {
        self.state.lock().await.pending.push_str(text);
        Ok(())
    }

    async fn generate_streaming(&self, sink: &mut dyn FragmentSink) -> Result<(), ModelError> {
        let pending = std::mem::take(&mut self.state.lock().await.pending);
        let reply = last_user_message(&pending).unwrap_or_default();
        debug!(bytes = reply.len(), "echo generating");

        for piece in chunks(reply, self.chunk) {
            sink.on_fragment(&piece).await;
        }
        if !reply.is_empty() {
            sink.on_fragment("\n").await;
        }
        Ok(())
    }

    async fn save_state(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string(&*self.state.lock().await)
            .map_err(|e| ModelError::State(e.to_string()))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ModelError::State(format!("{}: {}", path.display(), e)))
    }

    async fn load_state(&self, path: &Path) -> Result<(), ModelError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ModelError::State(format!("{}: {}", path.display(), e)))?;
        let state: EchoState =
            serde_json::from_str(&json).map_err(|e| ModelError::State(e.to_string()))?;
        *self.state.lock().await = state;
        Ok(())
    }
}
