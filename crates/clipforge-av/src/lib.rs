//! # clipforge-av
//!
//! Command synthesis for ffmpeg-driven media operations.
//!
//! This crate never touches media bytes. It works out which arguments an
//! external ffmpeg needs for an operation and supervises running it:
//!
//! - [`probe`] classifies an input file with ffprobe
//! - [`encoders`] detects a usable hardware encoder
//! - [`speed`] splits a playback speed into bounded `atempo` stages
//! - [`budget`] turns a target file size into bitrates
//! - [`actions`] assembles a [`CommandPlan`] for an [`Operation`]
//! - [`supervisor`] previews, confirms and runs the plan
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use clipforge_av::{
//!     assemble, probe, ClassifyPolicy, EncodeSettings, EncoderCapability, Operation,
//! };
//! use std::path::Path;
//!
//! let media = probe(Path::new("clip.mp4"), ClassifyPolicy::default())?;
//! let op = Operation::ChangeSpeed { factor: 3.0 };
//! let output = op.default_output(&media);
//! let capability = EncoderCapability::unavailable();
//! let plan = assemble(&op, &media, &capability, &output, &EncodeSettings::default())?;
//! for cmd in plan.commands() {
//!     println!("{}", cmd.display());
//! }
//! # Ok::<(), clipforge_av::Error>(())
//! ```

pub mod actions;
pub mod budget;
mod command;
pub mod encoders;
mod error;
mod passlog;
pub mod probe;
pub mod speed;
pub mod supervisor;
pub mod tools;

// Re-exports
pub use actions::{assemble, Artifact, CommandPlan, EncodeSettings, Operation};
pub use budget::{compute_budget, SizeBudget};
pub use command::ToolCommand;
pub use encoders::{probe_encoders, EncoderCapability, EncoderProbeOptions, HwVendor};
pub use error::{Error, Result};
pub use passlog::PassLog;
pub use probe::{ClassifyPolicy, MediaDescriptor, MediaKind, Resolution};
pub use speed::{decompose, SpeedPlan};
pub use supervisor::{Console, ExecutionReport, PlanState, Supervisor};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};

/// Probe a media file with the `ffprobe` on `PATH`.
pub fn probe<P: AsRef<std::path::Path>>(
    path: P,
    policy: ClassifyPolicy,
) -> Result<MediaDescriptor> {
    probe::probe(path.as_ref(), policy)
}
