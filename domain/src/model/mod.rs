//! Language model domain.
//!
//! The core never knows how a backend generates text. It only relies on the
//! [`LanguageModel`] contract: render a chat template, ingest rendered text,
//! stream a reply into a [`FragmentSink`], and persist or restore state.

pub mod contract;

pub use contract::{FragmentSink, LanguageModel, ModelError};
