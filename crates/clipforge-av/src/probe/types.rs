//! Media description types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Broad media class of an input file, as far as operations care.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Moving picture, usually with sound.
    Video,
    /// Sound only.
    Audio,
    /// A still picture.
    Image,
    /// Nothing usable was detected.
    Unknown,
}

/// How a file with a video stream but no audio stream is classified.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifyPolicy {
    /// Video-only files are images only when they hold a single frame.
    #[default]
    FrameAware,
    /// Every video-only file is treated as an image.
    Legacy,
}

/// Frame size in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Everything the command assembler needs to know about an input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDescriptor {
    /// Path to the media file.
    pub path: PathBuf,
    /// Classified media kind.
    pub kind: MediaKind,
    /// Codec of the first video stream (e.g. "h264").
    pub video_codec: Option<String>,
    /// Codec of the first audio stream (e.g. "aac").
    pub audio_codec: Option<String>,
    /// Resolution of the first video stream.
    pub resolution: Option<Resolution>,
    /// Container duration.
    pub duration: Option<Duration>,
    /// Frame count of the first video stream when the container reports it.
    pub frame_count: Option<u64>,
    /// Lowercase file extension without the dot; empty if none.
    pub extension: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Non-fatal problems met while probing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl MediaDescriptor {
    /// A descriptor for a file that could not be probed.
    pub fn unknown(path: impl Into<PathBuf>, file_size: u64, warning: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            extension: extension_of(&path),
            path,
            kind: MediaKind::Unknown,
            video_codec: None,
            audio_codec: None,
            resolution: None,
            duration: None,
            frame_count: None,
            file_size,
            warnings: vec![warning.into()],
        }
    }

    /// Whether the file carries an audio stream.
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    /// Whole seconds of duration, rounded up. `None` when unknown or zero.
    pub fn duration_secs(&self) -> Option<u64> {
        let secs = self.duration?.as_secs_f64();
        if secs > 0.0 {
            Some(secs.ceil() as u64)
        } else {
            None
        }
    }

    /// Human-readable duration as HH:MM:SS.
    pub fn duration_display(&self) -> Option<String> {
        self.duration.map(|d| {
            let secs = d.as_secs();
            format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
        })
    }
}

/// Lowercase extension of a path, or an empty string.
pub(crate) fn extension_of(path: &std::path::Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Image => write!(f, "image"),
            MediaKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
