//! FFprobe-based media probing.

use super::types::*;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Codecs that only ever carry still pictures.
const IMAGE_CODECS: &[&str] = &[
    "png", "mjpeg", "jpegls", "webp", "bmp", "tiff", "gif", "jpeg2000", "avif", "qoi",
];

#[derive(Debug, Deserialize)]
pub(crate) struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Probe a media file using ffprobe.
///
/// Fails with [`Error::InputNotFound`] if the file is missing. Every other
/// failure yields a descriptor of kind [`MediaKind::Unknown`] carrying a
/// warning, so probing never aborts a session.
pub fn probe_with_ffprobe(
    ffprobe: &Path,
    path: &Path,
    policy: ClassifyPolicy,
) -> Result<MediaDescriptor> {
    let metadata = std::fs::metadata(path).map_err(|_| Error::input_not_found(path))?;
    if !metadata.is_file() {
        return Err(Error::input_not_found(path));
    }
    let file_size = metadata.len();

    match run_ffprobe(ffprobe, path) {
        Ok(output) => {
            let descriptor = describe(path, file_size, output, policy);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "Probed {:?}: kind={} video={:?} audio={:?}",
                path,
                descriptor.kind,
                descriptor.video_codec,
                descriptor.audio_codec
            );
            Ok(descriptor)
        }
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("ffprobe failed for {:?}: {}", path, e);
            Ok(MediaDescriptor::unknown(
                path,
                file_size,
                format!("could not probe file: {e}"),
            ))
        }
    }
}

fn run_ffprobe(ffprobe: &Path, path: &Path) -> Result<FfprobeOutput> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        return Err(Error::ExternalProcessFailed {
            tool: "ffprobe".to_string(),
            step: 1,
            exit_code: output.status.code(),
        });
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_json(&json_str)
}

/// Parse raw ffprobe JSON output.
pub(crate) fn parse_ffprobe_json(json: &str) -> Result<FfprobeOutput> {
    Ok(serde_json::from_str(json)?)
}

/// Build a descriptor from parsed ffprobe output.
pub(crate) fn describe(
    path: &Path,
    file_size: u64,
    output: FfprobeOutput,
    policy: ClassifyPolicy,
) -> MediaDescriptor {
    let mut warnings = Vec::new();

    // Cover art shows up as a video stream; it does not make a file a video.
    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type == "video" && s.disposition.attached_pic == 0);
    let audio = output.streams.iter().find(|s| s.codec_type == "audio");

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| video.and_then(|v| v.duration.as_deref()))
        .and_then(parse_seconds);

    let frame_count = video
        .and_then(|v| v.nb_frames.as_deref())
        .and_then(|n| n.parse().ok());

    let resolution = video.and_then(|v| match (v.width, v.height) {
        (Some(width), Some(height)) if width > 0 && height > 0 => {
            Some(Resolution { width, height })
        }
        _ => None,
    });

    let kind = match (video, audio) {
        (Some(_), Some(_)) => MediaKind::Video,
        (None, Some(_)) => MediaKind::Audio,
        (Some(v), None) => match policy {
            ClassifyPolicy::Legacy => MediaKind::Image,
            ClassifyPolicy::FrameAware => {
                if is_single_frame(v.codec_name.as_deref(), frame_count, duration) {
                    MediaKind::Image
                } else {
                    MediaKind::Video
                }
            }
        },
        (None, None) => {
            warnings.push("no audio or video streams detected".to_string());
            MediaKind::Unknown
        }
    };

    if duration.is_none() && matches!(kind, MediaKind::Video | MediaKind::Audio) {
        warnings.push("duration unavailable; size-targeted encoding is disabled".to_string());
    }

    MediaDescriptor {
        path: path.to_path_buf(),
        kind,
        video_codec: video.and_then(|v| v.codec_name.clone()),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        resolution,
        duration,
        frame_count,
        extension: extension_of(path),
        file_size,
        warnings,
    }
}

fn is_single_frame(
    codec: Option<&str>,
    frame_count: Option<u64>,
    duration: Option<Duration>,
) -> bool {
    if codec.is_some_and(|c| IMAGE_CODECS.contains(&c)) && frame_count.unwrap_or(1) <= 1 {
        return true;
    }
    match frame_count {
        Some(n) => n <= 1,
        None => duration.is_none(),
    }
}

fn parse_seconds(s: &str) -> Option<Duration> {
    let secs: f64 = s.parse().ok()?;
    if secs.is_finite() && secs > 0.0 {
        Some(Duration::from_secs_f64(secs))
    } else {
        None
    }
}
