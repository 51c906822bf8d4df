//! The operations a user can pick and what they apply to.

use super::formats::{AudioFormat, Container, ImageFormat, VideoCodec};
use crate::probe::{MediaDescriptor, MediaKind};
use crate::speed::format_number;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A media operation together with its parameters.
///
/// `None` parameters fall back to [`EncodeSettings`](super::EncodeSettings)
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Copy all streams into another container.
    Remux { container: Container },
    /// Re-encode video in software at a constant quality.
    Compress { codec: VideoCodec, crf: Option<u8> },
    /// Re-encode video with the detected hardware encoder.
    HardwareEncode { codec: VideoCodec, quality: Option<u8> },
    /// Two-pass encode aiming at an output size in MB.
    TargetSize { size_mb: u64 },
    /// Speed playback up or down.
    ChangeSpeed { factor: f64 },
    /// Save the audio track to its own file.
    ExtractAudio { format: AudioFormat },
    /// Drop every audio stream.
    RemoveAudio,
    /// Keep a time range.
    Trim {
        start: Duration,
        duration: Option<Duration>,
    },
    /// Resize to a width, keeping aspect ratio unless a height is given.
    Scale { width: u32, height: Option<u32> },
    /// Animated GIF with a generated palette.
    ToGif {
        fps: Option<u32>,
        width: Option<u32>,
    },
    /// One PNG every `interval_secs` into a numbered sequence.
    Screenshots { interval_secs: u32 },
    /// Single frame at a timestamp.
    ExtractFrame { at: Duration },
    /// Convert a still image.
    ConvertImage { format: ImageFormat },
    /// Re-encode audio.
    ConvertAudio {
        format: AudioFormat,
        bitrate_kbps: Option<u32>,
    },
    /// Multiply loudness.
    AdjustVolume { factor: f64 },
}

impl Operation {
    /// Short name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Remux { .. } => "remux",
            Operation::Compress { .. } => "compress",
            Operation::HardwareEncode { .. } => "hardware encode",
            Operation::TargetSize { .. } => "target size",
            Operation::ChangeSpeed { .. } => "change speed",
            Operation::ExtractAudio { .. } => "extract audio",
            Operation::RemoveAudio => "remove audio",
            Operation::Trim { .. } => "trim",
            Operation::Scale { .. } => "scale",
            Operation::ToGif { .. } => "make gif",
            Operation::Screenshots { .. } => "screenshots",
            Operation::ExtractFrame { .. } => "extract frame",
            Operation::ConvertImage { .. } => "convert image",
            Operation::ConvertAudio { .. } => "convert audio",
            Operation::AdjustVolume { .. } => "adjust volume",
        }
    }

    /// Media kinds the operation can be applied to.
    pub fn supported_kinds(&self) -> &'static [MediaKind] {
        use MediaKind::*;
        match self {
            Operation::Remux { .. }
            | Operation::ChangeSpeed { .. }
            | Operation::Trim { .. }
            | Operation::AdjustVolume { .. } => &[Video, Audio],
            Operation::Compress { .. }
            | Operation::HardwareEncode { .. }
            | Operation::TargetSize { .. }
            | Operation::ExtractAudio { .. }
            | Operation::RemoveAudio
            | Operation::ToGif { .. }
            | Operation::Screenshots { .. }
            | Operation::ExtractFrame { .. } => &[Video],
            Operation::Scale { .. } => &[Video, Image],
            Operation::ConvertImage { .. } => &[Image],
            Operation::ConvertAudio { .. } => &[Audio],
        }
    }

    /// Whether the operation applies to `kind`.
    pub fn supports(&self, kind: MediaKind) -> bool {
        self.supported_kinds().contains(&kind)
    }

    /// Whether the operation needs a hardware encoder.
    pub fn requires_hardware(&self) -> bool {
        matches!(self, Operation::HardwareEncode { .. })
    }

    /// Whether the operation writes a directory of files instead of one file.
    pub fn writes_directory(&self) -> bool {
        matches!(self, Operation::Screenshots { .. })
    }

    /// Default output extension for this operation on `media`.
    pub fn default_extension(&self, media: &MediaDescriptor) -> String {
        let same = || {
            if media.extension.is_empty() {
                match media.kind {
                    MediaKind::Audio => "m4a".to_string(),
                    MediaKind::Image => "png".to_string(),
                    _ => "mp4".to_string(),
                }
            } else {
                media.extension.clone()
            }
        };
        match self {
            Operation::Remux { container } => container.extension().to_string(),
            Operation::Compress { .. }
            | Operation::HardwareEncode { .. }
            | Operation::TargetSize { .. } => "mp4".to_string(),
            Operation::ExtractAudio { format } | Operation::ConvertAudio { format, .. } => {
                format.extension().to_string()
            }
            Operation::ToGif { .. } => "gif".to_string(),
            Operation::Screenshots { .. } | Operation::ExtractFrame { .. } => "png".to_string(),
            Operation::ConvertImage { format } => format.extension().to_string(),
            Operation::ChangeSpeed { .. }
            | Operation::RemoveAudio
            | Operation::Trim { .. }
            | Operation::Scale { .. }
            | Operation::AdjustVolume { .. } => same(),
        }
    }

    fn suffix(&self) -> String {
        match self {
            Operation::Remux { .. } => "_remux".to_string(),
            Operation::Compress { .. } => "_compressed".to_string(),
            Operation::HardwareEncode { .. } => "_hw".to_string(),
            Operation::TargetSize { size_mb } => format!("_{size_mb}mb"),
            Operation::ChangeSpeed { factor } => format!("_{}x", format_number(*factor)),
            Operation::ExtractAudio { .. } => "_audio".to_string(),
            Operation::RemoveAudio => "_muted".to_string(),
            Operation::Trim { .. } => "_trimmed".to_string(),
            Operation::Scale { width, .. } => format!("_{width}w"),
            Operation::ToGif { .. } => "_anim".to_string(),
            Operation::Screenshots { .. } => "_screenshots".to_string(),
            Operation::ExtractFrame { .. } => "_frame".to_string(),
            Operation::ConvertImage { .. } | Operation::ConvertAudio { .. } => {
                "_converted".to_string()
            }
            Operation::AdjustVolume { .. } => "_volume".to_string(),
        }
    }

    /// Output path next to the input, e.g. `clip.mp4` → `clip_muted.mp4`.
    ///
    /// Screenshot sequences get a directory, `clip_screenshots/`. Every
    /// operation adds a non-empty suffix to the stem, so the result never
    /// names the input itself.
    pub fn default_output(&self, media: &MediaDescriptor) -> PathBuf {
        let input: &Path = &media.path;
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        let name = if self.writes_directory() {
            format!("{stem}{}", self.suffix())
        } else {
            format!("{stem}{}.{}", self.suffix(), self.default_extension(media))
        };
        dir.join(name)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(path: &str, kind: MediaKind) -> MediaDescriptor {
        let mut d = MediaDescriptor::unknown(path, 0, "fixture");
        d.kind = kind;
        d.warnings.clear();
        d
    }

    #[test]
    fn test_kind_table() {
        assert!(Operation::RemoveAudio.supports(MediaKind::Video));
        assert!(!Operation::RemoveAudio.supports(MediaKind::Audio));
        assert!(Operation::ChangeSpeed { factor: 2.0 }.supports(MediaKind::Audio));
        assert!(Operation::Scale { width: 640, height: None }.supports(MediaKind::Image));
        assert!(!Operation::ConvertImage { format: ImageFormat::Png }.supports(MediaKind::Video));
        for op in [
            Operation::RemoveAudio,
            Operation::Remux { container: Container::Mkv },
            Operation::ConvertAudio { format: AudioFormat::Mp3, bitrate_kbps: None },
        ] {
            assert!(!op.supports(MediaKind::Unknown));
        }
    }

    #[test]
    fn test_default_outputs() {
        let clip = media("/videos/clip.mov", MediaKind::Video);
        assert_eq!(
            Operation::RemoveAudio.default_output(&clip),
            PathBuf::from("/videos/clip_muted.mov")
        );
        assert_eq!(
            Operation::TargetSize { size_mb: 25 }.default_output(&clip),
            PathBuf::from("/videos/clip_25mb.mp4")
        );
        assert_eq!(
            Operation::ChangeSpeed { factor: 1.5 }.default_output(&clip),
            PathBuf::from("/videos/clip_1.5x.mov")
        );
        assert_eq!(
            Operation::ToGif { fps: None, width: None }.default_output(&clip),
            PathBuf::from("/videos/clip_anim.gif")
        );
        assert_eq!(
            Operation::Screenshots { interval_secs: 5 }.default_output(&clip),
            PathBuf::from("/videos/clip_screenshots")
        );
        assert_eq!(
            Operation::ExtractAudio { format: AudioFormat::Aac }.default_output(&clip),
            PathBuf::from("/videos/clip_audio.m4a")
        );
    }

    fn every_operation() -> Vec<Operation> {
        vec![
            Operation::Remux { container: Container::Mp4 },
            Operation::Compress { codec: VideoCodec::H264, crf: None },
            Operation::HardwareEncode { codec: VideoCodec::H264, quality: None },
            Operation::TargetSize { size_mb: 25 },
            Operation::ChangeSpeed { factor: 1.0 },
            Operation::ExtractAudio { format: AudioFormat::Mp3 },
            Operation::RemoveAudio,
            Operation::Trim { start: Duration::ZERO, duration: None },
            Operation::Scale { width: 640, height: None },
            Operation::ToGif { fps: None, width: None },
            Operation::Screenshots { interval_secs: 5 },
            Operation::ExtractFrame { at: Duration::ZERO },
            Operation::ConvertImage { format: ImageFormat::Png },
            Operation::ConvertAudio { format: AudioFormat::Mp3, bitrate_kbps: None },
            Operation::AdjustVolume { factor: 1.0 },
        ]
    }

    #[test]
    fn test_default_output_never_names_the_input() {
        // Inputs whose extension matches what each operation would produce.
        let inputs = [
            media("/m/clip.mp4", MediaKind::Video),
            media("/m/anim.gif", MediaKind::Video),
            media("/m/pic.png", MediaKind::Image),
            media("/m/song.mp3", MediaKind::Audio),
            media("/m/clip_muted", MediaKind::Video),
        ];
        for input in &inputs {
            for op in every_operation() {
                assert_ne!(op.default_output(input), input.path, "{op} on {:?}", input.path);
            }
        }
    }

    #[test]
    fn test_same_format_conversions_get_suffixes() {
        let pic = media("/m/pic.png", MediaKind::Image);
        assert_eq!(
            Operation::ConvertImage { format: ImageFormat::Png }.default_output(&pic),
            PathBuf::from("/m/pic_converted.png")
        );
        let anim = media("/m/anim.gif", MediaKind::Video);
        assert_eq!(
            Operation::ToGif { fps: None, width: None }.default_output(&anim),
            PathBuf::from("/m/anim_anim.gif")
        );
    }

    #[test]
    fn test_extensionless_input_gets_kind_default() {
        let song = media("/music/track", MediaKind::Audio);
        assert_eq!(
            Operation::AdjustVolume { factor: 0.5 }.default_output(&song),
            PathBuf::from("/music/track_volume.m4a")
        );
    }
}
