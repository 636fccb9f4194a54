//! Conversation session domain.
//!
//! - [`entities::Role`] - who authored a message
//! - [`entities::Message`] - a single (role, message) pair
//! - [`entities::TemplateTurn`] - input to a backend's chat template
//! - [`entities::Transcript`] - append-only conversation history

pub mod entities;

pub use entities::{Message, Role, TemplateTurn, Transcript};
