//! Tool domain module
//!
//! Tools are external capabilities the model drives by writing a directive
//! line into its reply:
//!
//! ```text
//! model reply ──▶ "!calc::add 1 2\n" ──▶ Directive ──▶ Tool::invoke ──▶ DispatchOutcome
//!                                         (argv)        (ToolIo)         (report → System turn)
//! ```
//!
//! # Key Types
//!
//! - [`Tool`]: capability surface: identity, description, commands, invocation
//! - [`CommandSpec`]: name and description of one command
//! - [`ToolIo`]: per-invocation output capture and read-input bridge
//! - [`Directive`]: tokenized `[namespace::]command arg...`
//! - [`DispatchOutcome`]: status and captured output of a successful dispatch
//! - [`DispatchError`]: routing failures, rendered as diagnostic text
//!
//! The registry that routes directives lives in the infrastructure layer;
//! the application layer sees it through the `ToolDispatcher` port.

pub mod contract;
pub mod directive;
pub mod error;
pub mod value_objects;

pub use contract::{CommandSpec, InputSource, NoInput, Tool, ToolIo};
pub use directive::{
    DIRECTIVE_MARKER, Directive, NAMESPACE_SEPARATOR, QuoteError, split_argv,
};
pub use error::{DispatchError, RegistryError, ToolError};
pub use value_objects::{DispatchOutcome, OutputChannel, ToolOutput};
