//! Vendor-specific argument shapes for hardware encoding.
//!
//! NVENC and Quick Sync take frames straight from the decoder. VA-API needs a
//! device handle declared before the input and frames uploaded to the GPU
//! in NV12 before encoding.

use super::formats::VideoCodec;
use crate::encoders::{EncoderCapability, HwVendor};

/// Arguments for a hardware encode, split around the `-i <input>` position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct HwArgs {
    pub before_input: Vec<String>,
    pub after_input: Vec<String>,
}

pub(crate) fn hardware_args(
    capability: &EncoderCapability,
    vendor: HwVendor,
    codec: VideoCodec,
    quality: u8,
    vaapi_device: &str,
) -> HwArgs {
    let encoder = match codec {
        VideoCodec::H264 => capability.encoder_id.clone(),
        VideoCodec::H265 => capability.hevc_encoder_id.clone(),
    };
    let q = quality.to_string();

    match vendor {
        HwVendor::Nvidia => HwArgs {
            before_input: Vec::new(),
            after_input: vec![
                "-c:v".into(),
                encoder,
                "-preset".into(),
                "p5".into(),
                "-rc".into(),
                "vbr".into(),
                "-cq".into(),
                q,
            ],
        },
        HwVendor::Intel => HwArgs {
            before_input: Vec::new(),
            after_input: vec!["-c:v".into(), encoder, "-global_quality".into(), q],
        },
        HwVendor::Vaapi => HwArgs {
            before_input: vec!["-vaapi_device".into(), vaapi_device.to_string()],
            after_input: vec![
                "-vf".into(),
                "format=nv12,hwupload".into(),
                "-c:v".into(),
                encoder,
                "-qp".into(),
                q,
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nvenc_has_no_device_handle() {
        let cap = EncoderCapability::from_vendor(HwVendor::Nvidia);
        let args = hardware_args(&cap, HwVendor::Nvidia, VideoCodec::H265, 24, "/dev/dri/x");
        assert!(args.before_input.is_empty());
        assert_eq!(&args.after_input[..2], &["-c:v", "hevc_nvenc"]);
        assert!(args.after_input.contains(&"24".to_string()));
    }

    #[test]
    fn test_qsv_global_quality() {
        let cap = EncoderCapability::from_vendor(HwVendor::Intel);
        let args = hardware_args(&cap, HwVendor::Intel, VideoCodec::H264, 23, "/dev/dri/x");
        assert_eq!(args.after_input, vec!["-c:v", "h264_qsv", "-global_quality", "23"]);
    }

    #[test]
    fn test_vaapi_uploads_frames() {
        let cap = EncoderCapability::from_vendor(HwVendor::Vaapi);
        let device = "/dev/dri/renderD129";
        let args = hardware_args(&cap, HwVendor::Vaapi, VideoCodec::H264, 20, device);
        assert_eq!(args.before_input, vec!["-vaapi_device", "/dev/dri/renderD129"]);
        assert_eq!(&args.after_input[..2], &["-vf", "format=nv12,hwupload"]);
        assert_eq!(&args.after_input[2..4], &["-c:v", "h264_vaapi"]);
    }
}
