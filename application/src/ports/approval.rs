//! Approval port for tools with side effects.
//!
//! A tool that runs arbitrary commands asks an [`ApprovalGate`] before each
//! invocation. The session core never calls this port itself; it is handed
//! to such tools when they are constructed.
//!
//! # Built-in Implementations
//!
//! - [`AutoApprove`] - Always approves
//! - [`AutoReject`] - Always rejects
//!
//! For interactive use, see `InteractiveApproval` in the presentation layer.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

/// Failure to obtain a decision, as opposed to a rejection.
#[derive(Debug, Clone, Error)]
pub enum ApprovalError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Port for confirming a risky operation with the end user.
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    /// Ask whether `tool` may run `argv`.
    async fn request_approval(
        &self,
        tool: &str,
        argv: &[String],
    ) -> Result<ApprovalDecision, ApprovalError>;
}

/// Approves every request.
///
/// **Use with caution!** Model-written commands run without confirmation.
pub struct AutoApprove;

#[async_trait]
impl ApprovalGate for AutoApprove {
    async fn request_approval(
        &self,
        _tool: &str,
        _argv: &[String],
    ) -> Result<ApprovalDecision, ApprovalError> {
        Ok(ApprovalDecision::Approve)
    }
}

/// Rejects every request. The safest non-interactive mode.
pub struct AutoReject;

#[async_trait]
impl ApprovalGate for AutoReject {
    async fn request_approval(
        &self,
        _tool: &str,
        _argv: &[String],
    ) -> Result<ApprovalDecision, ApprovalError> {
        Ok(ApprovalDecision::Reject)
    }
}
