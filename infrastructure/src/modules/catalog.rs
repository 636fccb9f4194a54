//! Module catalog
//!
//! Maps load-time identifiers (`--lm ollama`, `--tool ish`) to constructors
//! for compiled-in language models and tools. Every constructor receives the
//! module's parameter string already split into [`ModuleParams`].

use crate::models::{ECHO, EchoModel, OLLAMA, OllamaModel};
use crate::tools::calc::CALC;
use crate::tools::shell::ISH;
use crate::tools::{CalcTool, ShellTool};
use chatbot_application::ports::approval::{ApprovalGate, AutoReject};
use chatbot_domain::model::{LanguageModel, ModelError};
use chatbot_domain::module::ModuleParams;
use chatbot_domain::tool::{Tool, ToolError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// What a module provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    LanguageModel,
    Tool,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::LanguageModel => f.write_str("language model"),
            ModuleKind::Tool => f.write_str("tool"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unknown {kind} module \"{name}\" (available: {available})")]
    UnknownModule {
        kind: ModuleKind,
        name: String,
        available: String,
    },

    #[error("Module \"{name}\" could not be initialized: {reason}")]
    Contract { name: String, reason: String },
}

/// Services a module constructor may need beyond its parameters.
#[derive(Clone)]
pub struct ModuleContext {
    /// Answers `approve=ask` for tools that run commands
    pub approval: Arc<dyn ApprovalGate>,
}

impl Default for ModuleContext {
    fn default() -> Self {
        Self {
            approval: Arc::new(AutoReject),
        }
    }
}

pub type ModelConstructor = fn(&ModuleParams) -> Result<Arc<dyn LanguageModel>, ModelError>;
pub type ToolConstructor =
    fn(&ModuleParams, &ModuleContext) -> Result<Arc<dyn Tool>, ToolError>;

#[derive(Default)]
pub struct ModuleCatalog {
    models: BTreeMap<String, ModelConstructor>,
    tools: BTreeMap<String, ToolConstructor>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every compiled-in module.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add_model(OLLAMA, |params| {
            Ok(Arc::new(OllamaModel::from_params(params)?) as Arc<dyn LanguageModel>)
        });
        catalog.add_model(ECHO, |params| {
            Ok(Arc::new(EchoModel::from_params(params)?) as Arc<dyn LanguageModel>)
        });
        catalog.add_tool(ISH, |params, ctx| {
            Ok(Arc::new(ShellTool::from_params(params, ctx.approval.clone())?) as Arc<dyn Tool>)
        });
        catalog.add_tool(CALC, |_, _| Ok(Arc::new(CalcTool::new()) as Arc<dyn Tool>));
        catalog
    }

    pub fn add_model(&mut self, name: &str, constructor: ModelConstructor) {
        self.models.insert(name.to_string(), constructor);
    }

    pub fn add_tool(&mut self, name: &str, constructor: ToolConstructor) {
        self.tools.insert(name.to_string(), constructor);
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn load_model(
        &self,
        name: &str,
        params: &ModuleParams,
    ) -> Result<Arc<dyn LanguageModel>, LoadError> {
        let constructor = self.models.get(name).ok_or_else(|| LoadError::UnknownModule {
            kind: ModuleKind::LanguageModel,
            name: name.to_string(),
            available: self.model_names().collect::<Vec<_>>().join(", "),
        })?;
        warn_rejected(name, params);
        debug!(module = %name, "Loading language model");
        constructor(params).map_err(|e| LoadError::Contract {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load_tool(
        &self,
        name: &str,
        params: &ModuleParams,
        ctx: &ModuleContext,
    ) -> Result<Arc<dyn Tool>, LoadError> {
        let constructor = self.tools.get(name).ok_or_else(|| LoadError::UnknownModule {
            kind: ModuleKind::Tool,
            name: name.to_string(),
            available: self.tool_names().collect::<Vec<_>>().join(", "),
        })?;
        warn_rejected(name, params);
        debug!(module = %name, "Loading tool");
        constructor(params, ctx).map_err(|e| LoadError::Contract {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

fn warn_rejected(module: &str, params: &ModuleParams) {
    for entry in params.rejected() {
        warn!(module = %module, entry = %entry, "Ignoring malformed module parameter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_modules() {
        let catalog = ModuleCatalog::with_builtin();
        assert_eq!(catalog.model_names().collect::<Vec<_>>(), vec!["echo", "ollama"]);
        assert_eq!(catalog.tool_names().collect::<Vec<_>>(), vec!["calc", "ish"]);
    }

    #[test]
    fn test_load_model() {
        let catalog = ModuleCatalog::with_builtin();
        let model = catalog
            .load_model("echo", &ModuleParams::parse("chunk=2"))
            .unwrap();
        assert_eq!(model.name(), "echo");
    }

    #[test]
    fn test_unknown_module() {
        let catalog = ModuleCatalog::with_builtin();
        let err = catalog
            .load_model("gpt", &ModuleParams::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::UnknownModule { kind: ModuleKind::LanguageModel, .. }));
        assert_eq!(
            err.to_string(),
            "Unknown language model module \"gpt\" (available: echo, ollama)"
        );

        let err = catalog
            .load_tool("vim", &ModuleParams::default(), &ModuleContext::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::UnknownModule { kind: ModuleKind::Tool, .. }));
    }

    #[test]
    fn test_constructor_rejection_is_contract_error() {
        let catalog = ModuleCatalog::with_builtin();
        let err = catalog
            .load_model("ollama", &ModuleParams::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Contract { ref name, .. } if name == "ollama"));

        let err = catalog
            .load_tool("ish", &ModuleParams::parse("approve=sometimes"), &ModuleContext::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Contract { .. }));
    }

    #[test]
    fn test_load_tool_with_context() {
        let catalog = ModuleCatalog::with_builtin();
        let tool = catalog
            .load_tool("ish", &ModuleParams::default(), &ModuleContext::default())
            .unwrap();
        assert_eq!(tool.name(), "ish");
        assert!(tool.has_command("ish"));
    }
}
