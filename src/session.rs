//! Per-run state: resolved tools, the current input and the cached
//! hardware capability.

use crate::config::Config;
use clipforge_av::actions::{check_output_path, confirm_output_path};
use clipforge_av::{
    assemble, get_tool_path, probe::probe_with_ffprobe, probe_encoders, CommandPlan, Console,
    EncoderCapability, ExecutionReport, MediaDescriptor, Operation, Result, Supervisor,
};
use std::path::{Path, PathBuf};

/// What to do once a plan is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Show the commands and stop.
    pub dry_run: bool,
    /// Skip overwrite and run confirmations.
    pub assume_yes: bool,
}

pub struct Session {
    config: Config,
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    media: Option<MediaDescriptor>,
    capability: Option<EncoderCapability>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let ffmpeg = resolve("ffmpeg", config.tools.ffmpeg_path.as_deref());
        let ffprobe = resolve("ffprobe", config.tools.ffprobe_path.as_deref());
        Self {
            config,
            ffmpeg,
            ffprobe,
            media: None,
            capability: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    /// Probe `path` and make it the current input, replacing any previous one.
    pub fn select_input(&mut self, path: &Path) -> Result<&MediaDescriptor> {
        let media = probe_with_ffprobe(&self.ffprobe, path, self.config.probe.classification)?;
        for warning in &media.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        tracing::debug!("Selected input: {:?}", media);
        Ok(self.media.insert(media))
    }

    /// Use an already known descriptor as the current input.
    pub fn set_media(&mut self, media: MediaDescriptor) {
        self.media = Some(media);
    }

    pub fn media(&self) -> Option<&MediaDescriptor> {
        self.media.as_ref()
    }

    /// Hardware capability, probed on first use and cached for the session.
    pub fn capability(&mut self) -> &EncoderCapability {
        let config = &self.config;
        let ffmpeg = &self.ffmpeg;
        self.capability.get_or_insert_with(|| {
            if config.hardware.enabled {
                probe_encoders(ffmpeg, &config.encoder_probe_options())
            } else {
                tracing::debug!("Hardware encoding disabled in config");
                EncoderCapability::unavailable()
            }
        })
    }

    /// Seed the capability cache, skipping detection.
    pub fn set_capability(&mut self, capability: EncoderCapability) {
        self.capability = Some(capability);
    }

    /// Validate the output path and assemble the plan for `operation` on the
    /// current input.
    ///
    /// The output check runs before anything else, so an output that is the
    /// input never reaches hardware detection or ffmpeg. A dry run writes
    /// nothing, so it never asks about overwriting.
    pub fn plan(
        &mut self,
        operation: &Operation,
        output: Option<&Path>,
        console: &mut dyn Console,
        mode: RunMode,
    ) -> Result<CommandPlan> {
        let media = self
            .media
            .clone()
            .ok_or_else(|| clipforge_av::Error::InvalidInput("no input selected".into()))?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| operation.default_output(&media));
        if mode.dry_run {
            check_output_path(&media.path, &output)?;
        } else {
            confirm_output_path(&media.path, &output, console, mode.assume_yes)?;
        }

        let capability = if operation.requires_hardware() {
            self.capability().clone()
        } else {
            EncoderCapability::unavailable()
        };

        let settings = self.config.encode_settings(self.ffmpeg.clone());
        assemble(operation, &media, &capability, &output, &settings)
    }

    /// Probe `input`, plan `operation` and hand the plan to the supervisor.
    ///
    /// Returns `None` for a dry run.
    pub fn run(
        &mut self,
        input: &Path,
        operation: &Operation,
        output: Option<&Path>,
        console: &mut dyn Console,
        mode: RunMode,
    ) -> Result<Option<ExecutionReport>> {
        // The default name only depends on the path here; plan() checks the
        // final one again once the kind is known.
        let provisional = MediaDescriptor::unknown(input, 0, "not inspected yet");
        let target = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| operation.default_output(&provisional));
        check_output_path(input, &target)?;

        self.select_input(input)?;
        self.run_selected(operation, output, console, mode)
    }

    /// Plan `operation` on the current input and preview or execute it.
    pub fn run_selected(
        &mut self,
        operation: &Operation,
        output: Option<&Path>,
        console: &mut dyn Console,
        mode: RunMode,
    ) -> Result<Option<ExecutionReport>> {
        let plan = self.plan(operation, output, console, mode)?;

        if mode.dry_run {
            Supervisor::new(console).preview(&plan);
            return Ok(None);
        }

        tracing::info!("Running {} on {:?}", operation, plan.output());
        let report = Supervisor::new(console)
            .assume_yes(mode.assume_yes)
            .execute(plan)?;
        Ok(Some(report))
    }
}

/// Configured path if set, else `PATH` lookup, else the bare name so the
/// failure surfaces when the tool is actually run.
fn resolve(name: &str, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(path) => path.to_path_buf(),
        None => get_tool_path(name, None).unwrap_or_else(|_| PathBuf::from(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clipforge_av::supervisor::ScriptedConsole;
    use clipforge_av::{Error, HwVendor, MediaKind};
    use std::time::Duration;
    use tempfile::TempDir;

    fn session_with(dir: &Path) -> Session {
        let mut config = Config::default();
        config.tools.ffmpeg_path = Some(dir.join("no-ffmpeg"));
        config.tools.ffprobe_path = Some(dir.join("no-ffprobe"));
        Session::new(config)
    }

    fn descriptor(path: PathBuf) -> MediaDescriptor {
        MediaDescriptor {
            path,
            kind: MediaKind::Video,
            video_codec: Some("h264".into()),
            audio_codec: Some("aac".into()),
            resolution: None,
            duration: Some(Duration::from_secs(60)),
            frame_count: None,
            extension: "mp4".into(),
            file_size: 1,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_output_equal_to_input_fails_before_probe() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();
        let mut session = session_with(dir.path());
        let mut console = ScriptedConsole::new([]);

        let result = session.run(
            &input,
            &Operation::RemoveAudio,
            Some(&input),
            &mut console,
            RunMode::default(),
        );
        assert_matches!(result, Err(Error::OutputIsInput { .. }));
        assert!(session.media().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_default_output_aliasing_input_fails_before_inspection() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"x").unwrap();
        std::os::unix::fs::symlink(&input, dir.path().join("clip_muted.mp4")).unwrap();
        let mut session = session_with(dir.path());
        let mut console = ScriptedConsole::new([]);

        let result = session.run(
            &input,
            &Operation::RemoveAudio,
            None,
            &mut console,
            RunMode::default(),
        );
        assert_matches!(result, Err(Error::OutputIsInput { .. }));
        assert!(session.media().is_none());
    }

    #[test]
    fn test_same_format_image_conversion_plans_sibling() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(dir.path());
        let mut pic = descriptor(dir.path().join("pic.png"));
        pic.kind = MediaKind::Image;
        pic.audio_codec = None;
        pic.extension = "png".into();
        session.set_media(pic);
        let mut console = ScriptedConsole::new([]);

        let op = Operation::ConvertImage {
            format: clipforge_av::actions::ImageFormat::Png,
        };
        let plan = session.plan(&op, None, &mut console, RunMode::default()).unwrap();
        assert_eq!(plan.output(), dir.path().join("pic_converted.png"));
    }

    #[test]
    fn test_dry_run_never_asks_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(dir.path());
        session.set_media(descriptor(dir.path().join("clip.mp4")));
        std::fs::write(dir.path().join("clip_muted.mp4"), b"old").unwrap();

        let mut console = ScriptedConsole::new([false]);
        let mode = RunMode {
            dry_run: true,
            assume_yes: false,
        };
        let report = session
            .run_selected(&Operation::RemoveAudio, None, &mut console, mode)
            .unwrap();
        assert!(report.is_none());
        assert!(console.questions().is_empty());
        assert!(!console.shown().is_empty());
    }

    #[test]
    fn test_dry_run_still_rejects_output_equal_to_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        let mut session = session_with(dir.path());
        session.set_media(descriptor(input.clone()));
        let mut console = ScriptedConsole::new([]);

        let mode = RunMode {
            dry_run: true,
            assume_yes: false,
        };
        assert_matches!(
            session.run_selected(&Operation::RemoveAudio, Some(&input), &mut console, mode),
            Err(Error::OutputIsInput { .. })
        );
    }

    #[test]
    fn test_plan_uses_default_output() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(dir.path());
        session.set_media(descriptor(dir.path().join("clip.mp4")));
        let mut console = ScriptedConsole::new([]);

        let op = Operation::ChangeSpeed { factor: 2.0 };
        let plan = session.plan(&op, None, &mut console, RunMode::default()).unwrap();
        assert_eq!(plan.output(), dir.path().join("clip_2x.mp4"));
        assert_eq!(plan.commands()[0].program(), dir.path().join("no-ffmpeg"));
    }

    #[test]
    fn test_declined_overwrite_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(dir.path());
        session.set_media(descriptor(dir.path().join("clip.mp4")));
        let existing = dir.path().join("clip_muted.mp4");
        std::fs::write(&existing, b"old").unwrap();

        let mut console = ScriptedConsole::new([false]);
        let err = session
            .plan(&Operation::RemoveAudio, None, &mut console, RunMode::default())
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_cached_capability_used_for_hardware() {
        let dir = TempDir::new().unwrap();
        let mut session = session_with(dir.path());
        session.set_media(descriptor(dir.path().join("clip.mp4")));
        let mut console = ScriptedConsole::new([]);

        let op = Operation::HardwareEncode {
            codec: clipforge_av::actions::VideoCodec::H264,
            quality: None,
        };
        session.set_capability(EncoderCapability::unavailable());
        assert_matches!(
            session.plan(&op, None, &mut console, RunMode::default()),
            Err(Error::MissingCapability { .. })
        );

        session.set_capability(EncoderCapability::from_vendor(HwVendor::Intel));
        let plan = session.plan(&op, None, &mut console, RunMode::default()).unwrap();
        assert_eq!(plan.commands()[0].value_of("-c:v"), Some("h264_qsv"));
    }

    #[test]
    fn test_disabled_hardware_never_probes() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.hardware.enabled = false;
        config.tools.ffmpeg_path = Some(dir.path().join("no-ffmpeg"));
        let mut session = Session::new(config);
        assert!(!session.capability().available);
    }
}
