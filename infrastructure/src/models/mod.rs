//! Compiled-in language model backends

pub mod echo;
pub mod ollama;
mod template;

pub use echo::{ECHO, EchoModel};
pub use ollama::{OLLAMA, OllamaModel};
pub use template::render_plain;
