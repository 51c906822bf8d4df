//! Command assembly.
//!
//! An [`Operation`] chosen by the user is checked against the input's
//! [`MediaKind`](crate::probe::MediaKind) and the detected
//! [`EncoderCapability`](crate::encoders::EncoderCapability), then turned into
//! a [`CommandPlan`] of one or two ffmpeg invocations.

mod assemble;
mod formats;
mod hardware;
mod operation;
mod output;
mod plan;

pub use assemble::{assemble, EncodeSettings, SCREENSHOT_PATTERN};
pub use formats::{AudioFormat, Container, ImageFormat, VideoCodec};
pub use operation::Operation;
pub use output::{check_output_path, confirm_output_path, OutputState};
pub use plan::{Artifact, CommandPlan};
