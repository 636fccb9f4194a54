//! Domain layer for chatbot
//!
//! This crate contains the core types and algorithms of the conversational
//! agent runtime. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Contracts
//!
//! - [`LanguageModel`]: template rendering, ingestion, streaming generation,
//!   state persistence
//! - [`Tool`]: identity, description, command table, invocation
//!
//! ## Streaming
//!
//! A reply arrives as fragments whose boundaries are chosen by the backend.
//! [`StreamParser`] recognises directive lines (`!command arg...`) and the
//! think-mode delimiter no matter where those boundaries fall.

pub mod model;
pub mod module;
pub mod session;
pub mod stream;
pub mod tool;
pub mod util;

pub use model::{FragmentSink, LanguageModel, ModelError};
pub use module::{ModuleParams, ParamError};
pub use session::{Message, Role, TemplateTurn, Transcript};
pub use stream::{ParseEvent, ParseState, StreamParser, THINK_DELIMITER, ThinkSplit};
pub use tool::{
    CommandSpec, Directive, DispatchError, DispatchOutcome, InputSource, NoInput, OutputChannel,
    RegistryError, Tool, ToolError, ToolIo, ToolOutput,
};
