use clipforge_av::budget::DEFAULT_AUDIO_BITRATE_KBPS;
use clipforge_av::{ClassifyPolicy, EncodeSettings, EncoderProbeOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub encoding: EncodingConfig,

    #[serde(default)]
    pub hardware: HardwareConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Config {
    /// Assembler settings using the given resolved ffmpeg path.
    pub fn encode_settings(&self, ffmpeg: PathBuf) -> EncodeSettings {
        EncodeSettings {
            ffmpeg,
            audio_bitrate_kbps: self.encoding.audio_bitrate_kbps,
            default_crf: self.encoding.default_crf,
            default_hw_quality: self.encoding.hw_quality,
            preset: self.encoding.preset.clone(),
            gif_fps: self.encoding.gif_fps,
            gif_width: self.encoding.gif_width,
            vaapi_device: self.hardware.vaapi_device.clone(),
        }
    }

    pub fn encoder_probe_options(&self) -> EncoderProbeOptions {
        EncoderProbeOptions {
            verify: self.hardware.verify,
            vaapi_device: self.hardware.vaapi_device.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodingConfig {
    /// Audio bitrate for re-encoded audio and size budgets (kbps)
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate_kbps: u32,

    /// CRF for software compression (0-51, lower is better)
    #[serde(default = "default_crf")]
    pub default_crf: u8,

    /// Quality for hardware encoders (0-51)
    #[serde(default = "default_crf")]
    pub hw_quality: u8,

    /// x264/x265 preset
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default = "default_gif_fps")]
    pub gif_fps: u32,

    #[serde(default = "default_gif_width")]
    pub gif_width: u32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            audio_bitrate_kbps: default_audio_bitrate(),
            default_crf: default_crf(),
            hw_quality: default_crf(),
            preset: default_preset(),
            gif_fps: default_gif_fps(),
            gif_width: default_gif_width(),
        }
    }
}

fn default_audio_bitrate() -> u32 {
    DEFAULT_AUDIO_BITRATE_KBPS
}

fn default_crf() -> u8 {
    23
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_gif_fps() -> u32 {
    12
}

fn default_gif_width() -> u32 {
    480
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HardwareConfig {
    /// Offer hardware encoding at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Confirm a listed encoder with a short test encode
    #[serde(default = "default_true")]
    pub verify: bool,

    #[serde(default = "default_vaapi_device")]
    pub vaapi_device: String,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            verify: true,
            vaapi_device: default_vaapi_device(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_vaapi_device() -> String {
    "/dev/dri/renderD128".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// How video-only files are classified
    #[serde(default)]
    pub classification: ClassifyPolicy,
}
