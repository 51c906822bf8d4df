//! Bitrate budgeting for size-targeted encodes.
//!
//! Sizes use binary megabytes (1 MB = 8192 kilobits), the same convention
//! used when reporting output sizes. The result ignores container and muxing
//! overhead, so it is an estimate that a two-pass encode gets close to rather
//! than an exact guarantee.

use crate::{Error, Result};

/// Kilobits in one (binary) megabyte.
pub const KILOBITS_PER_MB: u64 = 8192;

/// Audio bitrate reserved when none is configured.
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;

/// Per-stream bitrate allocation for a target output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    /// Requested output size.
    pub target_size_mb: u64,
    /// Duration the budget was computed for.
    pub duration_secs: u64,
    /// Total bitrate available.
    pub total_bitrate_kbps: u64,
    /// Share reserved for audio.
    pub audio_bitrate_kbps: u32,
    /// What remains for video. Always positive.
    pub video_bitrate_kbps: u64,
}

impl SizeBudget {
    /// Expected size of an encode that hits this budget exactly, before
    /// container overhead.
    ///
    /// Saturates at `u64::MAX` for budgets not built by [`compute_budget`].
    pub fn estimated_size_bytes(&self) -> u64 {
        self.total_bitrate_kbps
            .saturating_mul(self.duration_secs)
            .saturating_mul(1024)
            / 8
    }
}

/// Allocate bitrates so that `duration_secs` of media fits `target_size_mb`.
///
/// # Errors
///
/// - [`Error::DurationUnknown`] if `duration_secs` is zero.
/// - [`Error::InvalidInput`] if `target_size_mb` is too large to express in
///   bits.
/// - [`Error::BudgetTooSmall`] if nothing is left for video once audio is
///   reserved.
pub fn compute_budget(
    target_size_mb: u64,
    duration_secs: u64,
    audio_bitrate_kbps: u32,
) -> Result<SizeBudget> {
    if duration_secs == 0 {
        return Err(Error::DurationUnknown);
    }

    let too_large = || Error::InvalidInput(format!("target size {target_size_mb} MB is too large"));

    let total_kilobits = target_size_mb
        .checked_mul(KILOBITS_PER_MB)
        .ok_or_else(too_large)?;
    let total_bitrate_kbps = total_kilobits / duration_secs;
    // The estimate multiplies back by the duration in bytes.
    total_bitrate_kbps
        .checked_mul(duration_secs)
        .and_then(|kilobits| kilobits.checked_mul(1024))
        .ok_or_else(too_large)?;
    let total = i64::try_from(total_bitrate_kbps).map_err(|_| too_large())?;

    let video = total - i64::from(audio_bitrate_kbps);
    if video <= 0 {
        return Err(Error::BudgetTooSmall {
            total_kbps: total,
            audio_kbps: audio_bitrate_kbps,
        });
    }

    Ok(SizeBudget {
        target_size_mb,
        duration_secs,
        total_bitrate_kbps,
        audio_bitrate_kbps,
        video_bitrate_kbps: video as u64,
    })
}
