//! Tool Registry
//!
//! The [`ToolRegistry`] owns the registered tools and implements
//! [`ToolDispatcher`]. It keeps a command-name → owning-tools index that is
//! updated on every register/unregister, never rebuilt lazily.
//!
//! # Usage
//!
//! ```ignore
//! use chatbot_infrastructure::tools::{CalcTool, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(CalcTool::new()))?;
//!
//! let directive = Directive::parse("add 1 2")?;
//! let outcome = registry.dispatch(&directive, &mut NoInput).await?;
//! assert_eq!(outcome.output.text(), "3\n");
//! ```
//!
//! # Resolution
//!
//! | Directive | Owners of `cmd` | Result |
//! |-----------|-----------------|--------|
//! | `cmd` | none | `NotFound` |
//! | `cmd` | one | invoke that tool |
//! | `cmd` | two or more | `Ambiguous`, nothing invoked |
//! | `tool::cmd` | `tool` not registered | `ToolNotFound` |
//! | `tool::cmd` | `tool` lacks `cmd` | `NotFound`, even if another tool owns it |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chatbot_application::ports::tool_dispatcher::{NO_TOOLS_TEXT, ToolDispatcher};
use chatbot_domain::tool::{
    Directive, DispatchError, DispatchOutcome, InputSource, RegistryError, Tool, ToolIo,
};

/// Registry of tools and the command index derived from them.
pub struct ToolRegistry {
    /// Tool identity -> tool
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Tool identities in registration order
    order: Vec<String>,
    /// Command name -> identities of the tools that expose it
    index: HashMap<String, Vec<String>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. The first tool with a given identity wins.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Tool name is already registered, skipping");
            return Err(RegistryError::NameConflict(name));
        }

        for command in tool.commands() {
            let owners = self.index.entry(command.name.clone()).or_default();
            if !owners.contains(&name) {
                owners.push(name.clone());
            }
            if owners.len() > 1 {
                tracing::debug!(
                    command = %command.name,
                    owners = ?owners,
                    "Command is shared by several tools"
                );
            }
        }

        tracing::debug!(tool = %name, commands = tool.commands().len(), "Registered tool");
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Remove a tool from routing. The tool itself is handed back.
    pub fn unregister(&mut self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        let tool = self
            .tools
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        self.order.retain(|n| n != name);

        for command in tool.commands() {
            if let Some(owners) = self.index.get_mut(&command.name) {
                owners.retain(|owner| owner != name);
                if owners.is_empty() {
                    self.index.remove(&command.name);
                }
            }
        }

        tracing::debug!(tool = %name, "Unregistered tool");
        Ok(tool)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Identities of the tools that expose `command`, in registration order.
    pub fn owners(&self, command: &str) -> &[String] {
        self.index.get(command).map(Vec::as_slice).unwrap_or_default()
    }

    /// Registered tool identities, in registration order.
    pub fn tool_names(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_tools: self.tools.len(),
            total_commands: self.index.len(),
            shared_commands: self.index.values().filter(|o| o.len() > 1).count(),
        }
    }

    fn resolve(&self, directive: &Directive) -> Result<&Arc<dyn Tool>, DispatchError> {
        let command = directive.command();

        if let Some(namespace) = directive.namespace() {
            let tool = self
                .tools
                .get(namespace)
                .ok_or_else(|| DispatchError::ToolNotFound {
                    namespace: namespace.to_string(),
                })?;
            if command.is_empty() || !tool.has_command(command) {
                return Err(DispatchError::NotFound {
                    command: command.to_string(),
                });
            }
            return Ok(tool);
        }

        match self.owners(command) {
            [] => Err(DispatchError::NotFound {
                command: command.to_string(),
            }),
            [owner] => self.tools.get(owner).ok_or_else(|| DispatchError::NotFound {
                command: command.to_string(),
            }),
            owners => Err(DispatchError::Ambiguous {
                command: command.to_string(),
                owners: owners.to_vec(),
            }),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub total_commands: usize,
    /// Commands owned by more than one tool
    pub shared_commands: usize,
}

#[async_trait]
impl ToolDispatcher for ToolRegistry {
    async fn dispatch(
        &self,
        directive: &Directive,
        input: &mut dyn InputSource,
    ) -> Result<DispatchOutcome, DispatchError> {
        let tool = match self.resolve(directive) {
            Ok(tool) => tool,
            Err(e) => {
                tracing::debug!(command = %directive.text, error = %e, "Dispatch failed");
                return Err(e);
            }
        };

        let argv = directive.tool_argv();
        tracing::info!(tool = tool.name(), command = %directive.text, "Invoking tool");

        let mut io = ToolIo::new(input);
        let status = tool.invoke(&argv, &mut io).await;
        let output = io.into_output();
        tracing::debug!(
            tool = tool.name(),
            status,
            bytes = output.text().len(),
            "Tool returned"
        );

        Ok(DispatchOutcome {
            tool: tool.name().to_string(),
            command_line: directive.text.clone(),
            status,
            output,
        })
    }

    fn describe(&self) -> String {
        if self.order.is_empty() {
            return NO_TOOLS_TEXT.to_string();
        }

        let mut doc = String::from("# External Tools\n");
        for tool in self.order.iter().filter_map(|name| self.tools.get(name)) {
            doc.push_str(&format!(
                "## Tool {}\n{}\n\n### Commands\n",
                tool.name(),
                tool.description()
            ));
            for command in tool.commands() {
                doc.push_str(&format!("#### {}\n{}\n", command.name, command.description));
            }
            doc.push('\n');
        }
        doc.push_str(
            "You can use an external tool by starting a line with '!'.\n\
             The syntax is \"![tool::]command arg1 arg2 ...\".\n\
             Add \"tool::\" when several tools provide the same command.\n",
        );
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_domain::tool::{CommandSpec, NoInput};
    use std::sync::Mutex;

    /// Tool that records its calls and prints its own name.
    struct Probe {
        name: &'static str,
        commands: Vec<CommandSpec>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl Probe {
        fn new(name: &'static str, commands: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                name,
                commands: commands
                    .iter()
                    .map(|c| CommandSpec::new(*c, format!("{c} command")))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Tool for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "probe tool"
        }

        fn commands(&self) -> &[CommandSpec] {
            &self.commands
        }

        async fn invoke(&self, argv: &[String], io: &mut ToolIo<'_>) -> i32 {
            self.calls.lock().unwrap().push(argv.to_vec());
            io.print(self.name);
            7
        }
    }

    async fn dispatch(registry: &ToolRegistry, text: &str) -> Result<DispatchOutcome, DispatchError> {
        let directive = Directive::parse(text).unwrap();
        registry.dispatch(&directive, &mut NoInput).await
    }

    #[tokio::test]
    async fn test_dispatch_single_owner() {
        let calc = Probe::new("calc", &["add"]);
        let mut registry = ToolRegistry::new();
        registry.register(calc.clone()).unwrap();

        let outcome = dispatch(&registry, "add 1 2").await.unwrap();
        assert_eq!(outcome.tool, "calc");
        assert_eq!(outcome.status, 7);
        assert_eq!(outcome.command_line, "add 1 2");
        assert_eq!(outcome.output.text(), "calc");
        assert_eq!(calc.calls(), vec![vec!["add", "1", "2"]]);
    }

    #[tokio::test]
    async fn test_namespace_is_stripped_from_argv() {
        let calc = Probe::new("calc", &["add"]);
        let mut registry = ToolRegistry::new();
        registry.register(calc.clone()).unwrap();

        let outcome = dispatch(&registry, "calc::add 4").await.unwrap();
        assert_eq!(outcome.command_line, "calc::add 4");
        assert_eq!(calc.calls(), vec![vec!["add", "4"]]);
    }

    #[tokio::test]
    async fn test_shared_command_is_ambiguous() {
        let a = Probe::new("a", &["add"]);
        let b = Probe::new("b", &["add", "sub"]);
        let mut registry = ToolRegistry::new();
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();

        let err = dispatch(&registry, "add 1 2").await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::Ambiguous {
                command: "add".into(),
                owners: vec!["a".into(), "b".into()],
            }
        );
        assert!(a.calls().is_empty());
        assert!(b.calls().is_empty());

        // Namespaced dispatch still works, and unshared commands are unaffected.
        assert_eq!(dispatch(&registry, "b::add").await.unwrap().tool, "b");
        assert_eq!(dispatch(&registry, "sub").await.unwrap().tool, "b");
        assert_eq!(registry.stats().shared_commands, 1);
    }

    #[tokio::test]
    async fn test_three_owners_resolve_none() {
        let mut registry = ToolRegistry::new();
        for name in ["x", "y", "z"] {
            registry.register(Probe::new(name, &["go"])).unwrap();
        }
        let err = dispatch(&registry, "go").await.unwrap_err();
        assert!(matches!(err, DispatchError::Ambiguous { ref owners, .. } if owners.len() == 3));
        assert!(err.to_string().contains("x, y, z"));
    }

    #[tokio::test]
    async fn test_namespace_only_searches_that_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Probe::new("toolA", &["other"])).unwrap();
        registry.register(Probe::new("toolB", &["cmd"])).unwrap();

        assert_eq!(
            dispatch(&registry, "toolA::cmd").await.unwrap_err(),
            DispatchError::NotFound {
                command: "cmd".into()
            }
        );
        assert_eq!(dispatch(&registry, "cmd").await.unwrap().tool, "toolB");
    }

    #[tokio::test]
    async fn test_unknown_namespace_and_command() {
        let mut registry = ToolRegistry::new();
        registry.register(Probe::new("calc", &["add"])).unwrap();

        assert_eq!(
            dispatch(&registry, "nope::add").await.unwrap_err(),
            DispatchError::ToolNotFound {
                namespace: "nope".into()
            }
        );
        assert_eq!(
            dispatch(&registry, "mul").await.unwrap_err(),
            DispatchError::NotFound {
                command: "mul".into()
            }
        );
        assert_eq!(
            dispatch(&registry, "calc::").await.unwrap_err(),
            DispatchError::NotFound {
                command: String::new()
            }
        );
    }

    #[test]
    fn test_name_conflict_keeps_first() {
        let first = Probe::new("calc", &["add"]);
        let second = Probe::new("calc", &["mul"]);
        let mut registry = ToolRegistry::new();
        registry.register(first).unwrap();
        assert_eq!(
            registry.register(second),
            Err(RegistryError::NameConflict("calc".into()))
        );
        assert_eq!(registry.owners("add"), &["calc".to_string()]);
        assert!(registry.owners("mul").is_empty());
    }

    #[tokio::test]
    async fn test_unregister_sole_owner() {
        let calc = Probe::new("calc", &["add"]);
        let mut registry = ToolRegistry::new();
        registry.register(calc.clone()).unwrap();

        let removed = registry.unregister("calc").unwrap();
        assert!(Arc::ptr_eq(&removed, &(calc.clone() as Arc<dyn Tool>)));
        assert!(registry.owners("add").is_empty());
        assert_eq!(registry.stats().total_commands, 0);
        assert!(matches!(
            dispatch(&registry, "add").await,
            Err(DispatchError::NotFound { .. })
        ));
        // The caller's reference still works.
        assert_eq!(calc.name(), "calc");
    }

    #[tokio::test]
    async fn test_unregister_one_of_two_owners() {
        let mut registry = ToolRegistry::new();
        registry.register(Probe::new("a", &["add"])).unwrap();
        registry.register(Probe::new("b", &["add"])).unwrap();

        registry.unregister("a").unwrap();
        assert_eq!(dispatch(&registry, "add").await.unwrap().tool, "b");
        assert_eq!(dispatch(&registry, "b::add").await.unwrap().tool, "b");
        assert_eq!(
            dispatch(&registry, "a::add").await.unwrap_err(),
            DispatchError::ToolNotFound {
                namespace: "a".into()
            }
        );
    }

    #[test]
    fn test_unregister_and_lookup_missing() {
        let mut registry = ToolRegistry::new();
        assert!(matches!(
            registry.unregister("ghost"),
            Err(RegistryError::NotFound(name)) if name == "ghost"
        ));
        assert!(registry.lookup("ghost").is_err());
        registry.register(Probe::new("calc", &["add"])).unwrap();
        assert_eq!(registry.lookup("calc").unwrap().name(), "calc");
    }

    #[test]
    fn test_reregister_after_unregister() {
        let mut registry = ToolRegistry::new();
        registry.register(Probe::new("calc", &["add"])).unwrap();
        registry.unregister("calc").unwrap();
        registry.register(Probe::new("calc", &["mul"])).unwrap();
        assert!(registry.owners("add").is_empty());
        assert_eq!(registry.owners("mul"), &["calc".to_string()]);
        assert_eq!(registry.tool_names(), &["calc".to_string()]);
    }

    #[test]
    fn test_describe() {
        let mut registry = ToolRegistry::new();
        assert_eq!(registry.describe(), NO_TOOLS_TEXT);

        registry.register(Probe::new("calc", &["add", "mul"])).unwrap();
        let doc = registry.describe();
        assert!(doc.starts_with("# External Tools\n## Tool calc\nprobe tool\n\n### Commands\n"));
        assert!(doc.contains("#### add\nadd command\n#### mul\nmul command\n"));
        assert!(doc.contains("starting a line with '!'"));
    }
}
