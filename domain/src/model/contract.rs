//! Language model contract

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::TemplateTurn;

/// Errors a language model backend can report.
///
/// `Ingest` and `Generation` are fatal to a session; `State` failures are
/// reported to the caller which decides whether to continue.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to ingest prompt: {0}")]
    Ingest(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("State persistence failed: {0}")]
    State(String),

    #[error("Invalid parameter: {0}")]
    Parameter(String),
}

/// Receiver for incrementally generated text.
///
/// Backends call [`on_fragment`](Self::on_fragment) zero or more times
/// before `generate_streaming` returns. Fragment size is backend-defined.
#[async_trait]
pub trait FragmentSink: Send {
    async fn on_fragment(&mut self, fragment: &str);
}

#[async_trait]
impl FragmentSink for String {
    async fn on_fragment(&mut self, fragment: &str) {
        self.push_str(fragment);
    }
}

/// Capability surface of a language model backend.
///
/// Methods take `&self`: a tool invoked while a generation is in flight may
/// ask the model for more text (see [`generate`](Self::generate)), so
/// implementations keep their mutable state behind interior mutability and
/// must not hold a lock while calling into the sink.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier of the backend, for logs.
    fn name(&self) -> &str;

    /// Render backend-native prompt text for the given turns.
    fn apply_template(&self, turns: &[TemplateTurn]) -> String;

    /// Absorb rendered text into the model context without generating.
    async fn ingest(&self, text: &str) -> Result<(), ModelError>;

    /// Generate a reply, delivering it fragment by fragment.
    async fn generate_streaming(&self, sink: &mut dyn FragmentSink) -> Result<(), ModelError>;

    /// Generate a reply and return it whole.
    async fn generate(&self) -> Result<String, ModelError> {
        let mut collected = String::new();
        self.generate_streaming(&mut collected).await?;
        Ok(collected)
    }

    async fn save_state(&self, path: &Path) -> Result<(), ModelError>;

    async fn load_state(&self, path: &Path) -> Result<(), ModelError>;

    /// Text appended to a rendered prompt to put the model in "think" mode.
    ///
    /// `None` means the backend has no think mode.
    fn think_prefix(&self) -> Option<&str> {
        None
    }
}
