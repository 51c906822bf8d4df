//! Playback speed decomposition.
//!
//! ffmpeg's `atempo` filter only accepts multipliers in `[0.5, 2.0]`. Any
//! other factor is realized as a chain of stages whose product is the
//! requested factor.

use crate::{Error, Result};

/// Smallest multiplier a single tempo stage accepts.
pub const MIN_STAGE: f64 = 0.5;

/// Largest multiplier a single tempo stage accepts.
pub const MAX_STAGE: f64 = 2.0;

/// An ordered chain of tempo stages. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedPlan {
    factor: f64,
    stages: Vec<f64>,
}

impl SpeedPlan {
    /// The requested overall factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Stage multipliers, rounded to 4 decimal places, in application order.
    pub fn stages(&self) -> &[f64] {
        &self.stages
    }

    /// Product of all stages.
    pub fn product(&self) -> f64 {
        self.stages.iter().product()
    }

    /// Audio filter chain, e.g. `atempo=2,atempo=1.5`.
    pub fn atempo_chain(&self) -> String {
        self.stages
            .iter()
            .map(|s| format!("atempo={}", format_number(*s)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Video timestamp filter for the whole factor, e.g. `setpts=PTS/3`.
    pub fn setpts_filter(&self) -> String {
        format!("setpts=PTS/{}", format_number(self.factor))
    }
}

/// Split `factor` into tempo stages within `[MIN_STAGE, MAX_STAGE]`.
///
/// Fails with [`Error::InvalidFactor`] unless `factor` is finite, positive
/// and still non-zero at 4 decimal places, the precision filters are
/// written with.
///
/// # Example
///
/// ```
/// use clipforge_av::speed::decompose;
///
/// let plan = decompose(3.0)?;
/// assert_eq!(plan.stages(), &[2.0, 1.5]);
/// # Ok::<(), clipforge_av::Error>(())
/// ```
pub fn decompose(factor: f64) -> Result<SpeedPlan> {
    if !factor.is_finite() || factor <= 0.0 || format_number(factor) == "0" {
        return Err(Error::InvalidFactor { factor });
    }

    let mut stages = Vec::new();
    let mut remaining = factor;

    if factor > 1.0 {
        while remaining > MAX_STAGE {
            stages.push(MAX_STAGE);
            remaining /= MAX_STAGE;
        }
    } else if factor < 1.0 {
        while remaining < MIN_STAGE {
            stages.push(MIN_STAGE);
            remaining /= MIN_STAGE;
        }
    }
    stages.push(remaining);

    Ok(SpeedPlan {
        factor,
        stages: stages.into_iter().map(round4).collect(),
    })
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Shortest decimal form: `2` rather than `2.0`, `1.5`, `0.3333`.
pub(crate) fn format_number(v: f64) -> String {
    let s = format!("{:.4}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn assert_valid(factor: f64) {
        let plan = decompose(factor).unwrap();
        assert!(!plan.stages().is_empty(), "empty plan for {factor}");
        for s in plan.stages() {
            assert!(
                (MIN_STAGE..=MAX_STAGE).contains(s),
                "stage {s} out of range for {factor}"
            );
        }
        let rel = (plan.product() - factor).abs() / factor;
        assert!(rel < 1e-3, "product {} != {factor}", plan.product());
    }

    #[test]
    fn test_identity() {
        assert_eq!(decompose(1.0).unwrap().stages(), &[1.0]);
    }

    #[test]
    fn test_powers_of_two() {
        assert_eq!(decompose(4.0).unwrap().stages(), &[2.0, 2.0]);
        assert_eq!(decompose(0.25).unwrap().stages(), &[0.5, 0.5]);
        assert_eq!(decompose(2.0).unwrap().stages(), &[2.0]);
        assert_eq!(decompose(0.5).unwrap().stages(), &[0.5]);
    }

    #[test]
    fn test_three_uses_minimal_stages() {
        assert_eq!(decompose(3.0).unwrap().stages(), &[2.0, 1.5]);
    }

    #[test]
    fn test_slow_down() {
        assert_eq!(decompose(0.3).unwrap().stages(), &[0.5, 0.6]);
        assert_eq!(decompose(0.75).unwrap().stages(), &[0.75]);
    }

    #[test]
    fn test_just_above_bound_does_not_add_stage() {
        let plan = decompose(2.000_000_1).unwrap();
        assert_eq!(plan.stages(), &[2.0, 1.0]);
        let plan = decompose(1.999_999_9).unwrap();
        assert_eq!(plan.stages().len(), 1);
    }

    #[test]
    fn test_many_factors_hold_invariants() {
        for factor in [
            0.01, 0.07, 0.1, 0.2, 0.33, 0.49, 0.5, 0.51, 0.9, 1.0, 1.1, 1.25, 1.5, 2.5, 3.0,
            5.0, 7.3, 10.0, 16.0, 33.3, 64.0, 99.9, 100.0,
        ] {
            assert_valid(factor);
        }
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_matches!(decompose(0.0), Err(Error::InvalidFactor { .. }));
        assert_matches!(decompose(-2.0), Err(Error::InvalidFactor { .. }));
        assert_matches!(decompose(f64::NAN), Err(Error::InvalidFactor { .. }));
        assert_matches!(decompose(f64::INFINITY), Err(Error::InvalidFactor { .. }));
    }

    #[test]
    fn test_rejects_factor_that_renders_as_zero() {
        assert_matches!(decompose(0.00004), Err(Error::InvalidFactor { .. }));

        let plan = decompose(0.0001).unwrap();
        assert_eq!(plan.setpts_filter(), "setpts=PTS/0.0001");
        assert!(plan.stages().iter().all(|s| (MIN_STAGE..=MAX_STAGE).contains(s)));
    }

    #[test]
    fn test_filter_rendering() {
        let plan = decompose(3.0).unwrap();
        assert_eq!(plan.atempo_chain(), "atempo=2,atempo=1.5");
        assert_eq!(plan.setpts_filter(), "setpts=PTS/3");

        let plan = decompose(0.25).unwrap();
        assert_eq!(plan.atempo_chain(), "atempo=0.5,atempo=0.5");
        assert_eq!(plan.setpts_filter(), "setpts=PTS/0.25");
    }
}
