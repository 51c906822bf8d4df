//! Media file probing module.
//!
//! Files are classified by shelling out to `ffprobe` and reading its JSON
//! stream listing. Probing is best effort: apart from a missing input file,
//! failures produce a [`MediaKind::Unknown`] descriptor with a warning.

mod ffprobe;
mod types;

pub use ffprobe::probe_with_ffprobe;
pub use types::*;

use crate::Result;
use std::path::Path;

/// Probe a media file with the `ffprobe` found on `PATH`.
pub fn probe(path: &Path, policy: ClassifyPolicy) -> Result<MediaDescriptor> {
    probe_with_ffprobe(Path::new("ffprobe"), path, policy)
}
