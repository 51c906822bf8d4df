use clap::{Parser, Subcommand};
use clipforge_av::actions::{AudioFormat, Container, ImageFormat, VideoCodec};
use clipforge_av::Operation;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "clipforge")]
#[command(author, version, about = "Builds and runs ffmpeg commands for everyday media tasks")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file and display its classification
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect hardware encoders
    Encoders {
        /// Trust the encoder listing without a test encode
        #[arg(long)]
        no_verify: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    CheckTools,

    /// Show how a playback speed is split into tempo stages
    SpeedPlan {
        /// Speed multiplier, e.g. 3 or 0.25
        factor: f64,
    },

    /// Compute the bitrates needed to hit a file size
    Budget {
        /// Target size in MB
        size_mb: u64,

        /// Media duration (seconds, MM:SS or HH:MM:SS)
        #[arg(value_parser = parse_timestamp)]
        duration: Duration,

        /// Audio bitrate to reserve (kbps)
        #[arg(long, default_value_t = clipforge_av::budget::DEFAULT_AUDIO_BITRATE_KBPS)]
        audio_kbps: u32,
    },

    /// Apply an operation to a file
    Run {
        /// Input file
        #[arg(required = true)]
        input: PathBuf,

        /// Output path (defaults to a name next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite and run without asking
        #[arg(short, long)]
        yes: bool,

        /// Show the command without executing it
        #[arg(long)]
        dry_run: bool,

        #[command(subcommand)]
        operation: OperationArgs,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum OperationArgs {
    /// Copy all streams into another container
    Remux {
        /// Target container (mkv, mp4, mov, webm, avi, ts, m4a, mka)
        container: Container,
    },

    /// Re-encode video in software
    Compress {
        #[arg(long, default_value = "h264")]
        codec: VideoCodec,

        /// Constant rate factor (0-51)
        #[arg(long)]
        crf: Option<u8>,
    },

    /// Re-encode video with the detected hardware encoder
    HwEncode {
        #[arg(long, default_value = "h264")]
        codec: VideoCodec,

        /// Encoder quality (0-51)
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Two-pass encode to a target size
    TargetSize {
        /// Target size in MB
        size_mb: u64,
    },

    /// Change playback speed
    Speed {
        /// Speed multiplier, e.g. 2 or 0.5
        factor: f64,
    },

    /// Save the audio track to its own file
    ExtractAudio {
        #[arg(long, default_value = "mp3")]
        format: AudioFormat,
    },

    /// Drop all audio
    RemoveAudio,

    /// Keep a time range
    Trim {
        /// Start time (seconds, MM:SS or HH:MM:SS)
        #[arg(long, value_parser = parse_timestamp, default_value = "0")]
        start: Duration,

        /// Length to keep; to the end if omitted
        #[arg(long, value_parser = parse_timestamp)]
        duration: Option<Duration>,
    },

    /// Resize, keeping aspect ratio unless a height is given
    Scale {
        width: u32,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Make an animated GIF
    Gif {
        #[arg(long)]
        fps: Option<u32>,

        #[arg(long)]
        width: Option<u32>,
    },

    /// Save a screenshot every few seconds
    Screenshots {
        /// Seconds between screenshots
        #[arg(long, default_value_t = 10)]
        interval: u32,
    },

    /// Save a single frame
    Frame {
        /// Timestamp (seconds, MM:SS or HH:MM:SS)
        #[arg(long, value_parser = parse_timestamp)]
        at: Duration,
    },

    /// Convert a still image
    ConvertImage { format: ImageFormat },

    /// Re-encode audio
    ConvertAudio {
        format: AudioFormat,

        /// Bitrate in kbps (ignored for lossless formats)
        #[arg(long)]
        bitrate: Option<u32>,
    },

    /// Change loudness by a factor
    Volume { factor: f64 },
}

impl From<OperationArgs> for Operation {
    fn from(args: OperationArgs) -> Self {
        match args {
            OperationArgs::Remux { container } => Operation::Remux { container },
            OperationArgs::Compress { codec, crf } => Operation::Compress { codec, crf },
            OperationArgs::HwEncode { codec, quality } => {
                Operation::HardwareEncode { codec, quality }
            }
            OperationArgs::TargetSize { size_mb } => Operation::TargetSize { size_mb },
            OperationArgs::Speed { factor } => Operation::ChangeSpeed { factor },
            OperationArgs::ExtractAudio { format } => Operation::ExtractAudio { format },
            OperationArgs::RemoveAudio => Operation::RemoveAudio,
            OperationArgs::Trim { start, duration } => Operation::Trim { start, duration },
            OperationArgs::Scale { width, height } => Operation::Scale { width, height },
            OperationArgs::Gif { fps, width } => Operation::ToGif { fps, width },
            OperationArgs::Screenshots { interval } => Operation::Screenshots {
                interval_secs: interval,
            },
            OperationArgs::Frame { at } => Operation::ExtractFrame { at },
            OperationArgs::ConvertImage { format } => Operation::ConvertImage { format },
            OperationArgs::ConvertAudio { format, bitrate } => Operation::ConvertAudio {
                format,
                bitrate_kbps: bitrate,
            },
            OperationArgs::Volume { factor } => Operation::AdjustVolume { factor },
        }
    }
}

/// Parse `90`, `1:30`, `01:02:03.5` into a duration.
pub fn parse_timestamp(s: &str) -> Result<Duration, String> {
    let mut secs = 0.0;
    for part in s.trim().split(':') {
        let value: f64 = part
            .parse()
            .map_err(|_| format!("invalid timestamp: {s}"))?;
        if value < 0.0 {
            return Err(format!("invalid timestamp: {s}"));
        }
        secs = secs * 60.0 + value;
    }
    if s.split(':').count() > 3 {
        return Err(format!("invalid timestamp: {s}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| format!("invalid timestamp: {s}"))
}
