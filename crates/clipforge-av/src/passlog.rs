//! Scratch space for two-pass encoding statistics.

use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding the statistics ffmpeg writes during pass 1
/// and reads back during pass 2.
///
/// The directory is removed on [`PassLog::cleanup`] or when dropped.
///
/// # Example
///
/// ```no_run
/// use clipforge_av::PassLog;
///
/// let log = PassLog::new()?;
/// // ffmpeg ... -pass 1 -passlogfile <log.prefix()> ...
/// log.cleanup()?;
/// # Ok::<(), clipforge_av::Error>(())
/// ```
#[derive(Debug)]
pub struct PassLog {
    temp_dir: TempDir,
    prefix: PathBuf,
}

impl PassLog {
    /// Create a fresh pass-log workspace in the system temp directory.
    pub fn new() -> Result<Self> {
        Self::new_in(std::env::temp_dir())
    }

    /// Create a fresh pass-log workspace under `parent`.
    pub fn new_in(parent: impl AsRef<Path>) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("clipforge-passlog-")
            .tempdir_in(parent)?;
        let prefix = temp_dir.path().join("ffmpeg2pass");
        Ok(Self { temp_dir, prefix })
    }

    /// Value for ffmpeg's `-passlogfile`.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Directory containing the log files.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Delete the log files.
    pub fn cleanup(self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let dir = self.temp_dir.path().to_path_buf();

        self.temp_dir.close()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Removed pass-log directory {:?}", dir);

        Ok(())
    }
}
