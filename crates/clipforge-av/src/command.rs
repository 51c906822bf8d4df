//! Structured external command invocations.
//!
//! A [`ToolCommand`] is a program plus a list of discrete arguments. It is
//! never flattened into a shell string for execution; [`ToolCommand::display`]
//! exists only to show the user what will run.

use std::path::{Path, PathBuf};
use std::process::Command;

/// A single external tool invocation.
///
/// # Example
///
/// ```
/// use clipforge_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
/// cmd.arg("-i").arg("my clip.mp4").args(["-c", "copy"]).arg("out.mkv");
/// assert_eq!(cmd.display(), "ffmpeg -i 'my clip.mp4' -c copy out.mkv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, p: &Path) -> &mut Self {
        self.args.push(p.to_string_lossy().into_owned());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Program to run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, in order.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Short program name for messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Whether `flag` appears as an argument.
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// The argument following the first occurrence of `flag`.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        let pos = self.args.iter().position(|a| a == flag)?;
        self.args.get(pos + 1).map(String::as_str)
    }

    /// Build a `std::process::Command` with the same program and arguments.
    pub fn to_std(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Human-readable form with POSIX-style quoting. Display only.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|a| quote(&a))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,%+@".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_argument_boundaries() {
        let mut cmd = ToolCommand::new(PathBuf::from("/usr/bin/ffmpeg"));
        cmd.arg("-i").path_arg(Path::new("a; rm -rf ~.mp4"));
        assert_eq!(cmd.get_args(), &["-i", "a; rm -rf ~.mp4"]);
        assert_eq!(cmd.program_name(), "ffmpeg");
    }

    #[test]
    fn test_display_quotes_unsafe_arguments() {
        let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
        cmd.args(["-vf", "scale=640:-2", "it's here.mp4", ""]);
        assert_eq!(
            cmd.display(),
            r"ffmpeg -vf scale=640:-2 'it'\''s here.mp4' ''"
        );
    }

    #[test]
    fn test_value_of() {
        let mut cmd = ToolCommand::new(PathBuf::from("ffmpeg"));
        cmd.args(["-pass", "1", "-b:v", "896k"]);
        assert_eq!(cmd.value_of("-b:v"), Some("896k"));
        assert_eq!(cmd.value_of("-pass"), Some("1"));
        assert!(cmd.has_arg("-pass"));
        assert_eq!(cmd.value_of("-c:a"), None);
    }

    #[test]
    fn test_to_std_carries_args() {
        let mut cmd = ToolCommand::new(PathBuf::from("echo"));
        cmd.args(["a", "b"]);
        let std_cmd = cmd.to_std();
        let args: Vec<_> = std_cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["a", "b"]);
    }
}
