//! Output formats and codecs offered by the operations.

use serde::{Deserialize, Serialize};

/// Containers a file can be remuxed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Matroska container
    Mkv,
    /// MPEG-4 Part 14 container
    Mp4,
    /// QuickTime container
    Mov,
    /// WebM container
    Webm,
    /// AVI container
    Avi,
    /// MPEG transport stream
    Ts,
    /// Audio-only MPEG-4
    M4a,
    /// Audio-only Matroska
    Mka,
}

impl Container {
    /// Get the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mkv => "mkv",
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
            Container::Webm => "webm",
            Container::Avi => "avi",
            Container::Ts => "ts",
            Container::M4a => "m4a",
            Container::Mka => "mka",
        }
    }

    /// Whether the container can carry a video stream.
    pub fn holds_video(&self) -> bool {
        !matches!(self, Container::M4a | Container::Mka)
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches('.') {
            "mkv" | "matroska" => Ok(Container::Mkv),
            "mp4" | "m4v" => Ok(Container::Mp4),
            "mov" | "quicktime" => Ok(Container::Mov),
            "webm" => Ok(Container::Webm),
            "avi" => Ok(Container::Avi),
            "ts" | "mpegts" => Ok(Container::Ts),
            "m4a" => Ok(Container::M4a),
            "mka" => Ok(Container::Mka),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}

/// Video codecs for re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
}

impl VideoCodec {
    /// Software encoder name.
    pub fn software_encoder(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::H265 => "libx265",
        }
    }
}

impl std::str::FromStr for VideoCodec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h264" | "avc" | "x264" => Ok(VideoCodec::H264),
            "h265" | "hevc" | "x265" => Ok(VideoCodec::H265),
            _ => Err(format!("Unknown video codec: {}", s)),
        }
    }
}

/// Audio output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Layer III
    Mp3,
    /// AAC in an M4A container
    Aac,
    /// FLAC (lossless)
    Flac,
    /// PCM WAV (uncompressed)
    Wav,
    /// Opus in Ogg
    Opus,
    /// Vorbis in Ogg
    Ogg,
}

impl AudioFormat {
    /// Get the file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "m4a",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "opus",
            AudioFormat::Ogg => "ogg",
        }
    }

    /// Get the ffmpeg encoder name.
    pub fn ffmpeg_name(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::Opus => "libopus",
            AudioFormat::Ogg => "libvorbis",
        }
    }

    /// Lossless and uncompressed formats take no bitrate.
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Flac | AudioFormat::Wav)
    }

    /// Bitrate used when the user does not pick one.
    pub fn default_bitrate_kbps(&self) -> Option<u32> {
        match self {
            AudioFormat::Mp3 => Some(192),
            AudioFormat::Aac => Some(192),
            AudioFormat::Opus => Some(128),
            AudioFormat::Ogg => Some(160),
            AudioFormat::Flac | AudioFormat::Wav => None,
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches('.') {
            "mp3" => Ok(AudioFormat::Mp3),
            "aac" | "m4a" => Ok(AudioFormat::Aac),
            "flac" => Ok(AudioFormat::Flac),
            "wav" => Ok(AudioFormat::Wav),
            "opus" => Ok(AudioFormat::Opus),
            "ogg" | "vorbis" => Ok(AudioFormat::Ogg),
            _ => Err(format!("Unknown audio format: {}", s)),
        }
    }
}

/// Still image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpg,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Get the file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().trim_start_matches('.') {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "webp" => Ok(ImageFormat::Webp),
            "bmp" => Ok(ImageFormat::Bmp),
            _ => Err(format!("Unknown image format: {}", s)),
        }
    }
}
