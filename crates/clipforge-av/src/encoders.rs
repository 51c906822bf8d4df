//! Hardware encoder detection.
//!
//! ffmpeg lists every encoder it was built with, whether or not the machine
//! has the hardware behind it. Detection therefore reads the `-encoders`
//! listing and, optionally, confirms a vendor with a tiny test encode.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};

/// Hardware encoding vendors, in preference order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HwVendor {
    /// NVIDIA NVENC
    Nvidia,
    /// Intel Quick Sync Video
    Intel,
    /// VA-API (Linux, AMD/Intel)
    Vaapi,
}

impl HwVendor {
    /// All vendors, most preferred first.
    pub const PREFERENCE: [HwVendor; 3] = [HwVendor::Nvidia, HwVendor::Intel, HwVendor::Vaapi];

    /// ffmpeg encoder name for H.264.
    pub fn h264_encoder(&self) -> &'static str {
        match self {
            HwVendor::Nvidia => "h264_nvenc",
            HwVendor::Intel => "h264_qsv",
            HwVendor::Vaapi => "h264_vaapi",
        }
    }

    /// ffmpeg encoder name for HEVC.
    pub fn hevc_encoder(&self) -> &'static str {
        match self {
            HwVendor::Nvidia => "hevc_nvenc",
            HwVendor::Intel => "hevc_qsv",
            HwVendor::Vaapi => "hevc_vaapi",
        }
    }

    /// Name shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            HwVendor::Nvidia => "NVIDIA NVENC",
            HwVendor::Intel => "Intel Quick Sync",
            HwVendor::Vaapi => "VA-API",
        }
    }
}

/// Result of hardware encoder probing.
///
/// Computed once per session and passed explicitly to the command assembler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderCapability {
    /// Whether a hardware encoder can be used.
    pub available: bool,
    /// Detected vendor.
    pub vendor: Option<HwVendor>,
    /// H.264 encoder id understood by ffmpeg.
    pub encoder_id: String,
    /// HEVC encoder id understood by ffmpeg.
    pub hevc_encoder_id: String,
    /// Name shown to users.
    pub display_name: String,
}

impl EncoderCapability {
    /// No hardware acceleration.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Capability backed by the given vendor.
    pub fn from_vendor(vendor: HwVendor) -> Self {
        Self {
            available: true,
            vendor: Some(vendor),
            encoder_id: vendor.h264_encoder().to_string(),
            hevc_encoder_id: vendor.hevc_encoder().to_string(),
            display_name: vendor.display_name().to_string(),
        }
    }
}

/// Options controlling how hardware is probed.
#[derive(Debug, Clone)]
pub struct EncoderProbeOptions {
    /// Run a short test encode before accepting a listed vendor.
    pub verify: bool,
    /// Render node used when verifying VA-API.
    pub vaapi_device: String,
}

impl Default for EncoderProbeOptions {
    fn default() -> Self {
        Self {
            verify: true,
            vaapi_device: "/dev/dri/renderD128".to_string(),
        }
    }
}

/// Detect the best usable hardware encoder.
///
/// Never fails: if ffmpeg cannot be run or nothing is found the returned
/// capability is unavailable.
pub fn probe_encoders(ffmpeg: &Path, options: &EncoderProbeOptions) -> EncoderCapability {
    let listing = match Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) if output.status.success() => {
            String::from_utf8_lossy(&output.stdout).to_string()
        }
        Ok(_output) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("ffmpeg -encoders exited with {}", _output.status);
            return EncoderCapability::unavailable();
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Could not run ffmpeg for encoder detection: {}", _e);
            return EncoderCapability::unavailable();
        }
    };

    let listed = listed_encoders(&listing);
    let capability = select_vendor(&listed, |vendor| {
        !options.verify || verify_vendor(ffmpeg, vendor, &options.vaapi_device)
    });

    #[cfg(feature = "tracing")]
    {
        if capability.available {
            tracing::info!("Hardware encoding available: {}", capability.display_name);
        } else {
            tracing::info!("No hardware encoder detected; software encoding only");
        }
    }

    capability
}

/// Extract encoder names from `ffmpeg -encoders` output.
///
/// Lines look like ` V....D h264_nvenc           NVIDIA NVENC H.264 encoder`;
/// the header above the `------` separator is skipped.
pub fn listed_encoders(listing: &str) -> Vec<String> {
    let body = match listing.split_once("------") {
        Some((_, rest)) => rest,
        None => listing,
    };

    body.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            // Flag column is six characters such as "V....D" or "A....."
            if flags.len() == 6 && flags.chars().all(|c| c.is_ascii_alphabetic() || c == '.') {
                Some(name.to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Pick the first vendor, in preference order, whose H.264 encoder is listed
/// and that passes `usable`.
pub fn select_vendor(
    listed: &[String],
    mut usable: impl FnMut(HwVendor) -> bool,
) -> EncoderCapability {
    HwVendor::PREFERENCE
        .into_iter()
        .filter(|vendor| listed.iter().any(|name| name == vendor.h264_encoder()))
        .find(|&vendor| usable(vendor))
        .map(EncoderCapability::from_vendor)
        .unwrap_or_default()
}

/// Encode one second of a synthetic source with the vendor's encoder.
fn verify_vendor(ffmpeg: &Path, vendor: HwVendor, vaapi_device: &str) -> bool {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-hide_banner", "-loglevel", "error"]);
    if vendor == HwVendor::Vaapi {
        cmd.args(["-vaapi_device", vaapi_device]);
    }
    cmd.args(["-f", "lavfi", "-i", "color=c=black:s=256x256:d=1"]);
    if vendor == HwVendor::Vaapi {
        cmd.args(["-vf", "format=nv12,hwupload"]);
    }
    cmd.args(["-frames:v", "1", "-c:v", vendor.h264_encoder(), "-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let ok = cmd.status().map(|s| s.success()).unwrap_or(false);

    #[cfg(feature = "tracing")]
    tracing::debug!("Verification of {} encoder: {}", vendor.display_name(), ok);

    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D h264_qsv             H.264 / AVC (Intel Quick Sync Video acceleration) (codec h264)
 V....D h264_vaapi           H.264/AVC (VAAPI) (codec h264)
 V....D hevc_vaapi           H.265/HEVC (VAAPI) (codec hevc)
 A....D aac                  AAC (Advanced Audio Coding)
";

    #[test]
    fn test_listed_encoders_skips_header() {
        let names = listed_encoders(LISTING);
        assert!(names.contains(&"libx264".to_string()));
        assert!(names.contains(&"h264_qsv".to_string()));
        assert!(names.contains(&"aac".to_string()));
        assert!(!names.iter().any(|n| n == "="));
    }

    #[test]
    fn test_select_vendor_follows_preference_order() {
        let listed = listed_encoders(LISTING);
        let cap = select_vendor(&listed, |_| true);
        assert!(cap.available);
        assert_eq!(cap.vendor, Some(HwVendor::Intel));
        assert_eq!(cap.encoder_id, "h264_qsv");
        assert_eq!(cap.hevc_encoder_id, "hevc_qsv");
    }

    #[test]
    fn test_select_vendor_falls_through_failed_verification() {
        let listed = listed_encoders(LISTING);
        let cap = select_vendor(&listed, |v| v != HwVendor::Intel);
        assert_eq!(cap.vendor, Some(HwVendor::Vaapi));
        assert_eq!(cap.display_name, "VA-API");
    }

    #[test]
    fn test_nvidia_wins_when_listed() {
        let listed = vec!["h264_vaapi".to_string(), "h264_nvenc".to_string()];
        let cap = select_vendor(&listed, |_| true);
        assert_eq!(cap.vendor, Some(HwVendor::Nvidia));
    }

    #[test]
    fn test_nothing_listed_is_unavailable() {
        let listed = vec!["libx264".to_string()];
        let cap = select_vendor(&listed, |_| true);
        assert!(!cap.available);
        assert_eq!(cap, EncoderCapability::unavailable());
    }

    #[test]
    fn test_missing_ffmpeg_is_unavailable() {
        let cap = probe_encoders(
            Path::new("nonexistent_ffmpeg_12345"),
            &EncoderProbeOptions::default(),
        );
        assert!(!cap.available);
    }
}
