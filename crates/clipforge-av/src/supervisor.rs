//! Previewing, confirming and running command plans.
//!
//! The supervisor talks to the user only through the [`Console`] trait and to
//! the operating system only through the [`Runner`] trait, so the whole
//! lifecycle can be driven by scripted collaborators in tests.

use crate::actions::{Artifact, CommandPlan};
use crate::command::ToolCommand;
use crate::{Error, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;

/// Lifecycle of a plan handed to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    Built,
    Previewed,
    Confirmed,
    Declined,
    Running,
    Succeeded,
    Failed,
}

/// The interactive terminal.
pub trait Console {
    /// Print a line of information.
    fn show(&mut self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Console with pre-recorded answers. Unanswered questions get `false`.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<bool>,
    shown: Vec<String>,
    questions: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Everything passed to [`Console::show`].
    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    /// Every question asked.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Console for ScriptedConsole {
    fn show(&mut self, message: &str) {
        self.shown.push(message.to_string());
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}

/// How an external process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub success: bool,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn code(code: i32) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
        }
    }
}

/// Spawns external processes.
pub trait Runner {
    fn run(&mut self, command: &ToolCommand) -> Result<ExitOutcome>;
}

/// Runs commands with the terminal attached so ffmpeg's progress is visible.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<ExitOutcome> {
        let status = command
            .to_std()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::tool_not_found(command.program_name()),
                _ => Error::Io(e),
            })?;
        Ok(ExitOutcome {
            success: status.success(),
            code: status.code(),
        })
    }
}

/// Outcome of [`Supervisor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub state: PlanState,
    /// Exit code of the last command run.
    pub exit_code: Option<i32>,
    /// Size of the artifact on success. Directories report the sum of their
    /// files.
    pub output_size_bytes: Option<u64>,
}

impl ExecutionReport {
    fn stopped(state: PlanState) -> Self {
        Self {
            state,
            exit_code: None,
            output_size_bytes: None,
        }
    }

    /// Output size in (binary) megabytes.
    pub fn output_size_mb(&self) -> Option<f64> {
        self.output_size_bytes
            .map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Drives a [`CommandPlan`] through preview, confirmation and execution.
pub struct Supervisor<'a, R: Runner = SystemRunner> {
    console: &'a mut dyn Console,
    runner: R,
    assume_yes: bool,
    state: PlanState,
}

impl<'a> Supervisor<'a, SystemRunner> {
    pub fn new(console: &'a mut dyn Console) -> Self {
        Self::with_runner(console, SystemRunner)
    }
}

impl<'a, R: Runner> Supervisor<'a, R> {
    pub fn with_runner(console: &'a mut dyn Console, runner: R) -> Self {
        Self {
            console,
            runner,
            assume_yes: false,
            state: PlanState::Built,
        }
    }

    /// Skip the confirmation prompt.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlanState {
        self.state
    }

    /// Show the commands the plan will run.
    pub fn preview(&mut self, plan: &CommandPlan) {
        let total = plan.commands().len();
        for (i, cmd) in plan.commands().iter().enumerate() {
            if total > 1 {
                self.console
                    .show(&format!("[{}/{}] {}", i + 1, total, cmd.display()));
            } else {
                self.console.show(&cmd.display());
            }
        }
        if let Some(budget) = plan.budget() {
            self.console.show(&format!(
                "Budget: video {} kbps + audio {} kbps (estimate, container overhead not included)",
                budget.video_bitrate_kbps, budget.audio_bitrate_kbps
            ));
        }
        self.state = PlanState::Previewed;
    }

    /// Preview, confirm and run the plan.
    ///
    /// A declined confirmation is not an error; the report carries
    /// [`PlanState::Declined`]. Commands run in order and the first failure
    /// stops the plan.
    ///
    /// # Errors
    ///
    /// [`Error::ExternalProcessFailed`] with the 1-based step of the failing
    /// command, or any error from spawning it.
    pub fn execute(&mut self, mut plan: CommandPlan) -> Result<ExecutionReport> {
        self.state = PlanState::Built;
        self.preview(&plan);

        if !self.assume_yes && !self.console.confirm("Run this command?")? {
            self.state = PlanState::Declined;
            return Ok(ExecutionReport::stopped(PlanState::Declined));
        }
        self.state = PlanState::Confirmed;

        if plan.artifact() == Artifact::Directory {
            std::fs::create_dir_all(plan.output())?;
        }

        self.state = PlanState::Running;
        let mut last_code = None;
        for (i, cmd) in plan.commands().iter().enumerate() {
            let step = i + 1;

            #[cfg(feature = "tracing")]
            tracing::info!("Running {} step {}: {}", plan.operation(), step, cmd.display());

            let outcome = match self.runner.run(cmd) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.state = PlanState::Failed;
                    return Err(e);
                }
            };
            last_code = outcome.code;
            if !outcome.success {
                self.state = PlanState::Failed;

                #[cfg(feature = "tracing")]
                tracing::warn!("{} step {} exited with {:?}", plan.operation(), step, outcome.code);

                return Err(Error::ExternalProcessFailed {
                    tool: cmd.program_name(),
                    step,
                    exit_code: outcome.code,
                });
            }
        }

        // The output is already written; leftover statistics only cost disk.
        if let Some(log) = plan.take_pass_log() {
            let dir = log.dir().to_path_buf();
            if let Err(e) = log.cleanup() {
                #[cfg(feature = "tracing")]
                tracing::warn!("Failed to remove pass-log directory {:?}: {}", dir, e);

                self.console.show(&format!(
                    "Warning: could not remove pass-log files in {}: {e}",
                    dir.display()
                ));
            }
        }

        self.state = PlanState::Succeeded;
        let size = artifact_size(plan.output(), plan.artifact());
        Ok(ExecutionReport {
            state: PlanState::Succeeded,
            exit_code: last_code,
            output_size_bytes: size,
        })
    }
}

fn artifact_size(path: &Path, artifact: Artifact) -> Option<u64> {
    match artifact {
        Artifact::File => std::fs::metadata(path).ok().map(|m| m.len()),
        Artifact::Directory => {
            let entries = std::fs::read_dir(path).ok()?;
            Some(
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum(),
            )
        }
    }
}
