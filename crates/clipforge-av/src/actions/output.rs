//! Output path safety.

use crate::supervisor::Console;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// State of a prospective output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Nothing exists at the path yet.
    Fresh,
    /// A file or directory already exists and would be overwritten.
    Exists,
}

/// Reject an output that resolves to the input and report whether it exists.
///
/// Comparison is lexical first, then through canonicalization so that
/// `./a.mp4`, `a.mp4` and symlinks to the same file are all caught.
pub fn check_output_path(input: &Path, output: &Path) -> Result<OutputState> {
    if same_file(input, output) {
        return Err(Error::OutputIsInput {
            path: output.to_path_buf(),
        });
    }
    if output.exists() {
        Ok(OutputState::Exists)
    } else {
        Ok(OutputState::Fresh)
    }
}

/// [`check_output_path`], asking the console before overwriting.
///
/// With `assume_yes` an existing output is overwritten without asking.
pub fn confirm_output_path(
    input: &Path,
    output: &Path,
    console: &mut dyn Console,
    assume_yes: bool,
) -> Result<()> {
    match check_output_path(input, output)? {
        OutputState::Fresh => Ok(()),
        OutputState::Exists if assume_yes => Ok(()),
        OutputState::Exists => {
            let question = format!("{} already exists. Overwrite?", output.display());
            if console.confirm(&question)? {
                Ok(())
            } else {
                Err(Error::OverwriteDeclined {
                    path: output.to_path_buf(),
                })
            }
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if lexical(a) == lexical(b) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn lexical(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .collect()
}
