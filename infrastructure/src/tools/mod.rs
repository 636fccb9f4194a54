//! Tool implementations and the tool registry
//!
//! - `calc`: integer arithmetic (`add`, `mul`)
//! - `shell`: `ish`, runs approved commands as subprocesses
//! - `registry`: [`ToolRegistry`], routes directives to registered tools

pub mod calc;
pub mod shell;

mod registry;

pub use calc::CalcTool;
pub use registry::{RegistryStats, ToolRegistry};
pub use shell::ShellTool;
