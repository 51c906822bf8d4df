mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./clipforge.toml", "~/.config/clipforge/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    let enc = &config.encoding;

    if enc.default_crf > 51 {
        anyhow::bail!("encoding.default_crf must be between 0 and 51, got {}", enc.default_crf);
    }
    if enc.hw_quality > 51 {
        anyhow::bail!("encoding.hw_quality must be between 0 and 51, got {}", enc.hw_quality);
    }
    if enc.audio_bitrate_kbps == 0 {
        anyhow::bail!("encoding.audio_bitrate_kbps cannot be 0");
    }
    if enc.gif_fps == 0 || enc.gif_width == 0 {
        anyhow::bail!("encoding.gif_fps and encoding.gif_width must be positive");
    }
    if enc.preset.trim().is_empty() {
        anyhow::bail!("encoding.preset cannot be empty");
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_av::ClassifyPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = write_config(
            r#"
[encoding]
audio_bitrate_kbps = 96

[probe]
classification = "legacy"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.encoding.audio_bitrate_kbps, 96);
        assert_eq!(config.encoding.default_crf, 23);
        assert_eq!(config.probe.classification, ClassifyPolicy::Legacy);
        assert!(config.hardware.enabled);
        assert_eq!(config.hardware.vaapi_device, "/dev/dri/renderD128");
    }

    #[test]
    fn test_invalid_crf_rejected() {
        let file = write_config("[encoding]\ndefault_crf = 70\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("default_crf"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let file = write_config("[probe]\nclassification = \"guess\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_encode_settings_follow_config() {
        let mut config = Config::default();
        config.encoding.gif_width = 320;
        config.hardware.vaapi_device = "/dev/dri/renderD129".into();
        let settings = config.encode_settings("/opt/ffmpeg".into());
        assert_eq!(settings.gif_width, 320);
        assert_eq!(settings.vaapi_device, "/dev/dri/renderD129");
        assert_eq!(settings.ffmpeg, std::path::PathBuf::from("/opt/ffmpeg"));
    }
}
