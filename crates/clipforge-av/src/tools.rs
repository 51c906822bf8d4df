//! External tool discovery.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Availability of an external tool.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// First line of `-version` output.
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// Check whether `program` runs and record its version line.
///
/// `program` may be a bare name looked up on `PATH` or an explicit path.
///
/// # Example
///
/// ```no_run
/// use clipforge_av::check_tool;
///
/// let info = check_tool("ffprobe");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(program: impl AsRef<Path>) -> ToolInfo {
    let program = program.as_ref();
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    match Command::new(program).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.trim().to_string());
            let path = which::which(program).ok();
            ToolInfo {
                name,
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check ffmpeg and ffprobe.
pub fn check_tools(ffmpeg: &Path, ffprobe: &Path) -> Vec<ToolInfo> {
    vec![check_tool(ffmpeg), check_tool(ffprobe)]
}

/// Require that a tool is on `PATH`, returning its path.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve a tool, preferring a configured path over `PATH` lookup.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }

        #[cfg(feature = "tracing")]
        tracing::warn!("Configured {} path {:?} does not exist, using PATH", name, path);
    }

    require_tool(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_tool_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
        assert_eq!(info.name, "nonexistent_tool_12345");
    }

    #[test]
    fn test_configured_path_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let fake = dir.path().join("ffmpeg");
        std::fs::write(&fake, b"").unwrap();
        assert_eq!(get_tool_path("ffmpeg", Some(&fake)).unwrap(), fake);
    }

    #[test]
    fn test_missing_tool() {
        assert_matches!(
            get_tool_path("nonexistent_tool_12345", Some(Path::new("/nope/ffmpeg"))),
            Err(Error::ToolNotFound { .. })
        );
    }
}
