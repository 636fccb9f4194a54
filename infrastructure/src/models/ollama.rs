//! Ollama backend
//!
//! Uses the raw completion endpoint (`POST /api/generate` with `raw: true`)
//! so the prompt text produced by [`render_plain`] reaches the model
//! verbatim. Ollama answers with newline-delimited JSON records; every
//! record's `response` field is forwarded as one fragment and the final
//! record's `context` is kept so the next request continues the same
//! conversation.
//!
//! | Parameter | Default | Meaning |
//! |-----------|---------|---------|
//! | `model` | required | model tag, e.g. `llama3.2` |
//! | `url` | `http://localhost:11434` | server base URL |
//! | `think` | none | text appended to the prompt in think mode |

use super::template::render_plain;
use async_trait::async_trait;
use chatbot_domain::model::{FragmentSink, LanguageModel, ModelError};
use chatbot_domain::module::ModuleParams;
use chatbot_domain::session::TemplateTurn;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const OLLAMA: &str = "ollama";

const DEFAULT_URL: &str = "http://localhost:11434";

/// Conversation state that survives between generations.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct OllamaState {
    /// Token context returned by the last completed generation
    context: Vec<i64>,
    /// Rendered text not yet sent to the server
    pending: String,
}

/// One line of the `/api/generate` stream.
#[derive(Debug, Deserialize)]
struct GenerateRecord {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    context: Option<Vec<i64>>,
    #[serde(default)]
    error: Option<String>,
}

/// Reassembles NDJSON records from arbitrarily split byte chunks.
#[derive(Debug, Default)]
struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<GenerateRecord, serde_json::Error>> {
        self.buffer.extend_from_slice(bytes);
        let mut records = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            if let Some(record) = Self::decode(&line) {
                records.push(record);
            }
        }
        records
    }

    /// Decode whatever is left once the stream has ended.
    fn finish(&mut self) -> Option<Result<GenerateRecord, serde_json::Error>> {
        let rest = std::mem::take(&mut self.buffer);
        Self::decode(&rest)
    }

    fn decode(line: &[u8]) -> Option<Result<GenerateRecord, serde_json::Error>> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(serde_json::from_slice(line))
    }
}

pub struct OllamaModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    think: Option<String>,
    state: Mutex<OllamaState>,
}

impl OllamaModel {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            think: None,
            state: Mutex::new(OllamaState::default()),
        }
    }

    pub fn with_think(mut self, prefix: impl Into<String>) -> Self {
        self.think = Some(prefix.into());
        self
    }

    pub fn from_params(params: &ModuleParams) -> Result<Self, ModelError> {
        let model = params
            .require("model")
            .map_err(|e| ModelError::Parameter(e.to_string()))?;
        let url = params.get("url").unwrap_or(DEFAULT_URL);
        let backend = Self::new(url, model);
        Ok(match params.get("think") {
            Some(prefix) if !prefix.is_empty() => backend.with_think(prefix),
            _ => backend,
        })
    }

    fn request_body(&self, prompt: &str, context: &[i64]) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "raw": true,
            "stream": true,
        });
        if !context.is_empty() {
            body["context"] = serde_json::json!(context);
        }
        body
    }

    /// Forward one record; returns the final context when the record ends the stream.
    async fn forward(
        record: Result<GenerateRecord, serde_json::Error>,
        sink: &mut dyn FragmentSink,
    ) -> Result<Option<Vec<i64>>, ModelError> {
        let record =
            record.map_err(|e| ModelError::Generation(format!("Failed to parse stream: {}", e)))?;
        if let Some(error) = record.error {
            return Err(ModelError::Generation(error));
        }
        if !record.response.is_empty() {
            sink.on_fragment(&record.response).await;
        }
        Ok(if record.done { record.context } else { None })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        OLLAMA
    }

    fn apply_template(&self, turns: &[TemplateTurn]) -> String {
        render_plain(turns)
    }

    async fn ingest(&self, text: &str) -> Result<(), ModelError> {
        self.state.lock().await.pending.push_str(text);
        Ok(())
    }

    async fn generate_streaming(&self, sink: &mut dyn FragmentSink) -> Result<(), ModelError> {
        // The lock is released before any fragment reaches the sink.
        let (prompt, context) = {
            let mut state = self.state.lock().await;
            (std::mem::take(&mut state.pending), state.context.clone())
        };

        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, prompt_bytes = prompt.len(), context = context.len(), "Calling Ollama");

        let response = match self
            .client
            .post(&url)
            .json(&self.request_body(&prompt, &context))
            .send()
            .await
        {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                self.state.lock().await.pending.insert_str(0, &prompt);
                return Err(ModelError::Generation(format!(
                    "Ollama API error ({}): {}",
                    status, body
                )));
            }
            Err(e) => {
                self.state.lock().await.pending.insert_str(0, &prompt);
                return Err(ModelError::Generation(e.to_string()));
            }
        };

        let mut stream = response.bytes_stream();
        let mut decoder = LineDecoder::default();
        let mut final_context = None;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| ModelError::Generation(e.to_string()))?;
            for record in decoder.push(&bytes) {
                if let Some(ctx) = Self::forward(record, sink).await? {
                    final_context = Some(ctx);
                }
            }
        }
        if let Some(record) = decoder.finish()
            && let Some(ctx) = Self::forward(record, sink).await?
        {
            final_context = Some(ctx);
        }

        match final_context {
            Some(ctx) => self.state.lock().await.context = ctx,
            None => warn!(model = %self.model, "Ollama stream ended without a context"),
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
        let state: OllamaState =
            serde_json::from_str(&json).map_err(|e| ModelError::State(e.to_string()))?;
        *self.state.lock().await = state;
        Ok(())
    }

    fn think_prefix(&self) -> Option<&str> {
        self.think.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params() {
        let model = OllamaModel::from_params(&ModuleParams::parse(
            "model=llama3.2:url=http://gpu:11434/:think=<think>",
        ))
        .unwrap();
        assert_eq!(model.model, "llama3.2");
        assert_eq!(model.base_url, "http://gpu:11434");
        assert_eq!(model.think_prefix(), Some("<think>"));

        let model = OllamaModel::from_params(&ModuleParams::parse("model=m")).unwrap();
        assert_eq!(model.base_url, DEFAULT_URL);
        assert_eq!(model.think_prefix(), None);
    }

    #[test]
    fn test_model_parameter_is_required() {
        assert!(matches!(
            OllamaModel::from_params(&ModuleParams::parse("url=http://x")),
            Err(ModelError::Parameter(_))
        ));
    }

    #[test]
    fn test_request_body() {
        let model = OllamaModel::new(DEFAULT_URL, "m");
        let body = model.request_body("User: hi\n\nAssistant:", &[]);
        assert_eq!(body["raw"], true);
        assert_eq!(body["stream"], true);
        assert!(body.get("context").is_none());

        let body = model.request_body("", &[1, 2]);
        assert_eq!(body["context"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_decoder_handles_split_records() {
        let stream = "{\"response\":\"hé\",\"done\":false}\n\n{\"response\":\"\",\"done\":true,\"context\":[7,8]}\n";
        let bytes = stream.as_bytes();
        for cut in 0..bytes.len() {
            let mut decoder = LineDecoder::default();
            let mut records = decoder.push(&bytes[..cut]);
            records.extend(decoder.push(&bytes[cut..]));
            assert!(decoder.finish().is_none());

            let records: Vec<GenerateRecord> = records.into_iter().map(Result::unwrap).collect();
            assert_eq!(records.len(), 2, "cut at {}", cut);
            assert_eq!(records[0].response, "hé");
            assert!(records[1].done);
            assert_eq!(records[1].context, Some(vec![7, 8]));
        }
    }

    #[test]
    fn test_decoder_finish_reads_unterminated_record() {
        let mut decoder = LineDecoder::default();
        assert!(decoder.push(b"{\"response\":\"x\"}").is_empty());
        assert_eq!(decoder.finish().unwrap().unwrap().response, "x");
    }

    #[tokio::test]
    async fn test_forward_reports_server_error() {
        let mut sink = String::new();
        let record = serde_json::from_str("{\"error\":\"model not found\"}");
        let result = OllamaModel::forward(record, &mut sink).await;
        assert!(matches!(result, Err(ModelError::Generation(msg)) if msg == "model not found"));
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let model = OllamaModel::new(DEFAULT_URL, "m");
        model.state.lock().await.context = vec![1, 2, 3];
        model.ingest("User: later").await.unwrap();
        model.save_state(&path).await.unwrap();

        let restored = OllamaModel::new(DEFAULT_URL, "m");
        restored.load_state(&path).await.unwrap();
        assert_eq!(*restored.state.lock().await, *model.state.lock().await);
    }

    #[tokio::test]
    async fn test_unreachable_server_keeps_pending_text() {
        let model = OllamaModel::new("http://127.0.0.1:9", "m");
        model.ingest("User: hi").await.unwrap();
        assert!(matches!(model.generate().await, Err(ModelError::Generation(_))));
        assert_eq!(model.state.lock().await.pending, "User: hi");
    }
}
