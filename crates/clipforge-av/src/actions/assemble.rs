//! Operation → command plan.

use super::formats::{AudioFormat, ImageFormat, VideoCodec};
use super::hardware::hardware_args;
use super::operation::Operation;
use super::plan::{Artifact, CommandPlan};
use crate::budget::{compute_budget, SizeBudget};
use crate::command::ToolCommand;
use crate::encoders::EncoderCapability;
use crate::passlog::PassLog;
use crate::probe::{MediaDescriptor, MediaKind};
use crate::speed::{decompose, format_number};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name pattern for screenshot sequences.
pub const SCREENSHOT_PATTERN: &str = "shot_%04d.png";

/// Defaults and tool paths the assembler needs.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// ffmpeg executable.
    pub ffmpeg: PathBuf,
    /// Audio bitrate for re-encoded audio and size budgets.
    pub audio_bitrate_kbps: u32,
    /// CRF used by [`Operation::Compress`] when none is given.
    pub default_crf: u8,
    /// Quality used by [`Operation::HardwareEncode`] when none is given.
    pub default_hw_quality: u8,
    /// x264/x265 preset.
    pub preset: String,
    /// GIF frame rate default.
    pub gif_fps: u32,
    /// GIF width default.
    pub gif_width: u32,
    /// VA-API render node.
    pub vaapi_device: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            audio_bitrate_kbps: crate::budget::DEFAULT_AUDIO_BITRATE_KBPS,
            default_crf: 23,
            default_hw_quality: 23,
            preset: "medium".to_string(),
            gif_fps: 12,
            gif_width: 480,
            vaapi_device: "/dev/dri/renderD128".to_string(),
        }
    }
}

/// Null muxer target for analysis passes.
fn null_sink() -> &'static str {
    if cfg!(windows) {
        "NUL"
    } else {
        "/dev/null"
    }
}

/// Build the command plan for `operation` on `media`, writing to `output`.
///
/// # Errors
///
/// - [`Error::UnsupportedOperation`] if the operation does not apply to the
///   media kind.
/// - [`Error::MissingCapability`] for hardware encodes without a usable
///   encoder.
/// - [`Error::InvalidFactor`], [`Error::DurationUnknown`],
///   [`Error::BudgetTooSmall`] and [`Error::InvalidInput`] for parameters
///   that cannot be realized.
pub fn assemble(
    operation: &Operation,
    media: &MediaDescriptor,
    capability: &EncoderCapability,
    output: &Path,
    settings: &EncodeSettings,
) -> Result<CommandPlan> {
    if !operation.supports(media.kind) {
        return Err(Error::UnsupportedOperation {
            operation: operation.label(),
            kind: media.kind,
        });
    }

    let label = operation.label();
    let mut b = Builder::new(settings, &media.path);

    match operation {
        Operation::Remux { container } => {
            if media.kind == MediaKind::Video && !container.holds_video() {
                return Err(Error::InvalidInput(format!(
                    "{} cannot hold a video stream",
                    container.extension()
                )));
            }
            b.input();
            b.cmd.args(["-map", "0", "-c", "copy"]);
        }

        Operation::Compress { codec, crf } => {
            let crf = crf.unwrap_or(settings.default_crf);
            check_quality("CRF", crf)?;
            b.input();
            b.cmd
                .args(["-c:v", codec.software_encoder()])
                .args(["-crf".to_string(), crf.to_string()])
                .args(["-preset", settings.preset.as_str()]);
            if *codec == VideoCodec::H265 {
                b.cmd.args(["-tag:v", "hvc1"]);
            }
            b.aac_audio(media);
        }

        Operation::HardwareEncode { codec, quality } => {
            let vendor = match capability.vendor {
                Some(vendor) if capability.available => vendor,
                _ => return Err(Error::MissingCapability { operation: label }),
            };
            let quality = quality.unwrap_or(settings.default_hw_quality);
            check_quality("quality", quality)?;
            let hw = hardware_args(capability, vendor, *codec, quality, &settings.vaapi_device);
            b.cmd.args(hw.before_input);
            b.input();
            b.cmd.args(hw.after_input);
            b.aac_audio(media);
        }

        Operation::TargetSize { size_mb } => {
            return target_size(*size_mb, media, output, settings);
        }

        Operation::ChangeSpeed { factor } => {
            let plan = decompose(*factor)?;
            b.input();
            if media.kind == MediaKind::Video {
                b.cmd.args(["-filter:v".to_string(), plan.setpts_filter()]);
            }
            if media.has_audio() {
                b.cmd.args(["-filter:a".to_string(), plan.atempo_chain()]);
            } else {
                b.cmd.arg("-an");
            }
        }

        Operation::ExtractAudio { format } => {
            require_audio(media)?;
            b.input();
            b.cmd.arg("-vn");
            b.audio_codec(*format, None);
        }

        Operation::RemoveAudio => {
            b.input();
            b.cmd.args(["-map", "0:v", "-c:v", "copy", "-an"]);
        }

        Operation::Trim { start, duration } => {
            if duration.is_some_and(|d| d.is_zero()) {
                return Err(Error::InvalidInput("trim duration must be positive".into()));
            }
            if let Some(total) = media.duration {
                if *start >= total {
                    return Err(Error::InvalidInput(format!(
                        "start {} is past the end of the media",
                        seconds(*start)
                    )));
                }
            }
            b.cmd.args(["-ss".to_string(), seconds(*start)]);
            b.input();
            if let Some(duration) = duration {
                b.cmd.args(["-t".to_string(), seconds(*duration)]);
            }
            b.cmd.args(["-map", "0", "-c", "copy", "-avoid_negative_ts", "make_zero"]);
        }

        Operation::Scale { width, height } => {
            if *width == 0 || *height == Some(0) {
                return Err(Error::InvalidInput("scale dimensions must be positive".into()));
            }
            // -2 keeps aspect ratio and an even height, which video encoders need.
            let keep = if media.kind == MediaKind::Video { "-2" } else { "-1" };
            let h = height.map(|h| h.to_string()).unwrap_or_else(|| keep.to_string());
            b.input();
            b.cmd.args(["-vf".to_string(), format!("scale={width}:{h}")]);
            if media.kind == MediaKind::Video {
                b.cmd.args(["-c:a", "copy"]);
            }
        }

        Operation::ToGif { fps, width } => {
            let fps = fps.unwrap_or(settings.gif_fps);
            let width = width.unwrap_or(settings.gif_width);
            if fps == 0 || width == 0 {
                return Err(Error::InvalidInput("GIF frame rate and width must be positive".into()));
            }
            b.input();
            b.cmd.args([
                "-vf".to_string(),
                format!(
                    "fps={fps},scale={width}:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse"
                ),
                "-loop".to_string(),
                "0".to_string(),
            ]);
        }

        Operation::Screenshots { interval_secs } => {
            if *interval_secs == 0 {
                return Err(Error::InvalidInput("screenshot interval must be positive".into()));
            }
            b.input();
            b.cmd.args(["-vf".to_string(), format!("fps=1/{interval_secs}")]);
            let pattern = output.join(SCREENSHOT_PATTERN);
            b.cmd.path_arg(&pattern);
            return Ok(CommandPlan::single(
                label,
                b.cmd,
                output.to_path_buf(),
                Artifact::Directory,
            ));
        }

        Operation::ExtractFrame { at } => {
            if let Some(total) = media.duration {
                if *at >= total {
                    return Err(Error::InvalidInput(format!(
                        "timestamp {} is past the end of the media",
                        seconds(*at)
                    )));
                }
            }
            b.cmd.args(["-ss".to_string(), seconds(*at)]);
            b.input();
            b.cmd.args(["-frames:v", "1"]);
        }

        Operation::ConvertImage { format } => {
            b.input();
            if *format == ImageFormat::Jpg {
                b.cmd.args(["-q:v", "2"]);
            }
        }

        Operation::ConvertAudio { format, bitrate_kbps } => {
            b.input();
            b.cmd.arg("-vn");
            b.audio_codec(*format, *bitrate_kbps);
        }

        Operation::AdjustVolume { factor } => {
            if !factor.is_finite() || *factor < 0.0 {
                return Err(Error::InvalidInput(format!("invalid volume factor {factor}")));
            }
            require_audio(media)?;
            b.input();
            b.cmd.args(["-filter:a".to_string(), format!("volume={}", format_number(*factor))]);
            if media.kind == MediaKind::Video {
                b.cmd.args(["-c:v", "copy"]);
            }
        }
    }

    b.cmd.path_arg(output);
    Ok(CommandPlan::single(label, b.cmd, output.to_path_buf(), Artifact::File))
}

/// Two commands sharing one bitrate: an analysis pass into the null muxer and
/// the real encode.
fn target_size(
    size_mb: u64,
    media: &MediaDescriptor,
    output: &Path,
    settings: &EncodeSettings,
) -> Result<CommandPlan> {
    if size_mb == 0 {
        return Err(Error::InvalidInput("target size must be positive".into()));
    }
    let duration = media.duration_secs().ok_or(Error::DurationUnknown)?;
    let audio_kbps = if media.has_audio() {
        settings.audio_bitrate_kbps
    } else {
        0
    };
    let budget: SizeBudget = compute_budget(size_mb, duration, audio_kbps)?;
    let pass_log = PassLog::new()?;
    let video_rate = format!("{}k", budget.video_bitrate_kbps);

    let mut passes = [1u8, 2u8].map(|pass| {
        let mut b = Builder::new(settings, &media.path);
        b.input();
        b.cmd
            .args(["-c:v", "libx264"])
            .args(["-preset", settings.preset.as_str()])
            .args(["-b:v", video_rate.as_str()])
            .args(["-pass".to_string(), pass.to_string()])
            .arg("-passlogfile")
            .path_arg(pass_log.prefix());
        b.cmd
    });

    let [first, second] = &mut passes;
    first.args(["-an", "-f", "null", null_sink()]);
    if media.has_audio() {
        second.args([
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{audio_kbps}k"),
        ]);
    } else {
        second.arg("-an");
    }
    second.path_arg(output);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Size budget for {} MB over {} s: video {} kbps, audio {} kbps",
        size_mb,
        duration,
        budget.video_bitrate_kbps,
        budget.audio_bitrate_kbps
    );

    let [first, second] = passes;
    Ok(CommandPlan::two_pass(
        "target size",
        first,
        second,
        output.to_path_buf(),
        pass_log,
        budget,
    ))
}

struct Builder<'a> {
    cmd: ToolCommand,
    input: &'a Path,
    settings: &'a EncodeSettings,
}

impl<'a> Builder<'a> {
    fn new(settings: &'a EncodeSettings, input: &'a Path) -> Self {
        let mut cmd = ToolCommand::new(settings.ffmpeg.clone());
        // Overwriting was settled before assembly.
        cmd.args(["-hide_banner", "-y"]);
        Self { cmd, input, settings }
    }

    fn input(&mut self) {
        self.cmd.arg("-i").path_arg(self.input);
    }

    fn aac_audio(&mut self, media: &MediaDescriptor) {
        if media.has_audio() {
            self.cmd
                .args(["-c:a", "aac"])
                .args(["-b:a".to_string(), format!("{}k", self.settings.audio_bitrate_kbps)]);
        }
    }

    fn audio_codec(&mut self, format: AudioFormat, bitrate_kbps: Option<u32>) {
        self.cmd.args(["-c:a", format.ffmpeg_name()]);
        if !format.is_lossless() {
            if let Some(rate) = bitrate_kbps.or_else(|| format.default_bitrate_kbps()) {
                self.cmd.args(["-b:a".to_string(), format!("{rate}k")]);
            }
        }
    }
}

fn require_audio(media: &MediaDescriptor) -> Result<()> {
    if media.has_audio() {
        Ok(())
    } else {
        Err(Error::InvalidInput("input has no audio stream".into()))
    }
}

fn check_quality(name: &str, value: u8) -> Result<()> {
    if value > 51 {
        return Err(Error::InvalidInput(format!("{name} must be between 0 and 51, got {value}")));
    }
    Ok(())
}

/// Seconds with millisecond precision, as ffmpeg accepts them.
fn seconds(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}
