//! Terminal approval prompt for commands a tool wants to run.
//!
//! ```text
//! Do you allow to run command "rm -rf build"? [y/N]
//! ```
//!
//! Only `y` or `yes` (any case) approves; anything else, including an empty
//! line, rejects. End of input cancels.

use async_trait::async_trait;
use chatbot_application::{ApprovalDecision, ApprovalError, ApprovalGate};
use colored::Colorize;
use std::io::{self, Write};

/// Asks the end user on the terminal before each command.
pub struct InteractiveApproval;

impl InteractiveApproval {
    pub fn new() -> Self {
        Self
    }

    /// Quote arguments that would otherwise read ambiguously.
    fn display_command(argv: &[String]) -> String {
        argv.iter()
            .map(|arg| {
                if arg.is_empty() || arg.contains(char::is_whitespace) || arg.contains('"') {
                    format!("{:?}", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parse_answer(answer: &str) -> ApprovalDecision {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => ApprovalDecision::Approve,
            _ => ApprovalDecision::Reject,
        }
    }

    fn read_answer() -> Result<String, ApprovalError> {
        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| ApprovalError::Io(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            return Err(ApprovalError::Cancelled);
        }
        Ok(input)
    }
}

impl Default for InteractiveApproval {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApprovalGate for InteractiveApproval {
    async fn request_approval(
        &self,
        tool: &str,
        argv: &[String],
    ) -> Result<ApprovalDecision, ApprovalError> {
        println!();
        print!(
            "{} Do you allow to run command \"{}\"? [y/N] ",
            format!("[{}]", tool).magenta().bold(),
            Self::display_command(argv)
        );
        io::stdout()
            .flush()
            .map_err(|e| ApprovalError::Io(format!("Failed to flush stdout: {}", e)))?;

        let decision = Self::parse_answer(&Self::read_answer()?);
        if decision == ApprovalDecision::Reject {
            println!("{}", "✗ Rejected".red());
        }
        Ok(decision)
    }
}
