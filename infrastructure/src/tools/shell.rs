//! Shell tool: `ish`
//!
//! Runs the given argument vector as a subprocess, without a shell, after
//! asking an [`ApprovalGate`]. Output is captured, stderr after stdout, and
//! only the trailing `max_output` bytes are kept.
//!
//! | Parameter | Default | Meaning |
//! |-----------|---------|---------|
//! | `approve` | `ask` | `ask` (use the supplied gate), `always`, `never` |
//! | `max_output` | 4096 | bytes of output kept |
//! | `timeout` | 60 | seconds before the subprocess is killed |

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chatbot_application::ports::approval::{
    ApprovalDecision, ApprovalGate, AutoApprove, AutoReject,
};
use chatbot_domain::module::ModuleParams;
use chatbot_domain::tool::{CommandSpec, Tool, ToolError, ToolIo};
use chatbot_domain::util::tail_str;
use tokio::process::Command;

/// Tool name constant
pub const ISH: &str = "ish";

/// Default number of output bytes kept
const DEFAULT_MAX_OUTPUT: usize = 4096;

/// Default timeout for command execution (60 seconds)
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ISH_HELP: &str = "ish [commandline] - executing commands\n\
ish executes the given command like a normal shell, but without shell syntax.\n\
Interactive applications cannot be used. For example, to edit a file use sed \
instead of vim or emacs.\n\
NOTE: ish just executes the specified command, so you can use \"[command] --help\" \
to see help.";

pub struct ShellTool {
    commands: Vec<CommandSpec>,
    approval: Arc<dyn ApprovalGate>,
    max_output: usize,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(approval: Arc<dyn ApprovalGate>) -> Self {
        Self {
            commands: vec![CommandSpec::new(ISH, ISH_HELP)],
            approval,
            max_output: DEFAULT_MAX_OUTPUT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from module parameters. `interactive` answers `approve=ask`.
    pub fn from_params(
        params: &ModuleParams,
        interactive: Arc<dyn ApprovalGate>,
    ) -> Result<Self, ToolError> {
        let approval: Arc<dyn ApprovalGate> = match params.get("approve").unwrap_or("ask") {
            "ask" => interactive,
            "always" => Arc::new(AutoApprove),
            "never" => Arc::new(AutoReject),
            other => {
                return Err(ToolError::Parameter(format!(
                    "approve must be ask, always or never, not \"{}\"",
                    other
                )));
            }
        };
        let max_output = params
            .get_parsed("max_output", DEFAULT_MAX_OUTPUT)
            .map_err(|e| ToolError::Parameter(e.to_string()))?;
        let timeout = params
            .get_parsed("timeout", DEFAULT_TIMEOUT_SECS)
            .map_err(|e| ToolError::Parameter(e.to_string()))?;

        Ok(Self::new(approval)
            .with_max_output(max_output)
            .with_timeout(Duration::from_secs(timeout)))
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, args: &[String]) -> Result<(Vec<u8>, Option<i32>), String> {
        let mut cmd = Command::new(&args[0]);
        cmd.args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| format!("Failed to spawn command: {}", e))?;
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| format!("Command timed out after {} seconds", self.timeout.as_secs()))?
            .map_err(|e| e.to_string())?;

        let mut merged = output.stdout;
        merged.extend_from_slice(&output.stderr);
        Ok((merged, output.status.code()))
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        ISH
    }

    fn description(&self) -> &str {
        "Shell environment"
    }

    fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    async fn invoke(&self, argv: &[String], io: &mut ToolIo<'_>) -> i32 {
        let args = argv.get(1..).unwrap_or_default();
        if args.is_empty() {
            io.eprint("ish: no command given\n");
            return 1;
        }

        match self.approval.request_approval(ISH, args).await {
            Ok(ApprovalDecision::Approve) => {}
            Ok(ApprovalDecision::Reject) => {
                tracing::info!(command = ?args, "ish command rejected");
                io.eprint("ish: Fatal: Operation was rejected by User.\n");
                return 1;
            }
            Err(e) => {
                io.eprint(format!("ish: Fatal: {}\n", e));
                return 1;
            }
        }

        tracing::info!(command = ?args, "ish running command");
        let (raw, code) = match self.run(args).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(command = ?args, error = %e, "ish subprocess failed");
                io.eprint(format!("ish: error while executing subprocess: {}\n", e));
                return 1;
            }
        };

        let text = String::from_utf8_lossy(&raw);
        let kept = tail_str(&text, self.max_output);
        io.print(kept);
        io.print("\n");
        if kept.len() < text.len() {
            io.eprint(format!(
                "ish: WARNING: Output length exceeds limit {}, so some leading output was discarded.\n",
                self.max_output
            ));
        }
        io.print(format!(
            "ish: subprocess finished with exit code {}\n",
            code.unwrap_or(-1)
        ));
        0
    }
}
