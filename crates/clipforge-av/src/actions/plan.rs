//! Fully resolved command plans.

use crate::budget::SizeBudget;
use crate::command::ToolCommand;
use crate::passlog::PassLog;
use std::path::{Path, PathBuf};

/// What an operation leaves on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// A single output file.
    File,
    /// A directory filled with a numbered sequence of files.
    Directory,
}

/// The external invocations for one operation, in execution order.
///
/// Single-pass operations hold one command; size-targeted encodes hold
/// exactly two (analysis pass, then output pass). Built per action and
/// discarded after execution.
#[derive(Debug)]
pub struct CommandPlan {
    pub(crate) operation: &'static str,
    pub(crate) commands: Vec<ToolCommand>,
    pub(crate) output: PathBuf,
    pub(crate) artifact: Artifact,
    pub(crate) pass_log: Option<PassLog>,
    pub(crate) budget: Option<SizeBudget>,
}

impl CommandPlan {
    /// A plan running one command.
    pub fn single(
        operation: &'static str,
        command: ToolCommand,
        output: PathBuf,
        artifact: Artifact,
    ) -> Self {
        Self {
            operation,
            commands: vec![command],
            output,
            artifact,
            pass_log: None,
            budget: None,
        }
    }

    /// A two-pass plan sharing one pass-log workspace.
    pub fn two_pass(
        operation: &'static str,
        first: ToolCommand,
        second: ToolCommand,
        output: PathBuf,
        pass_log: PassLog,
        budget: SizeBudget,
    ) -> Self {
        Self {
            operation,
            commands: vec![first, second],
            output,
            artifact: Artifact::File,
            pass_log: Some(pass_log),
            budget: Some(budget),
        }
    }

    /// Operation label.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Commands in execution order.
    pub fn commands(&self) -> &[ToolCommand] {
        &self.commands
    }

    /// Final output file or directory.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Kind of artifact written.
    pub fn artifact(&self) -> Artifact {
        self.artifact
    }

    /// Bitrate budget of a size-targeted plan.
    pub fn budget(&self) -> Option<&SizeBudget> {
        self.budget.as_ref()
    }

    /// Whether this is a two-pass plan.
    pub fn is_two_pass(&self) -> bool {
        self.pass_log.is_some()
    }

    pub(crate) fn take_pass_log(&mut self) -> Option<PassLog> {
        self.pass_log.take()
    }
}
