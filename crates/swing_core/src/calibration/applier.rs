//! Online half of calibration: map a fresh analysis onto the reference scale.

use super::model::CalibrationCoefficients;
use super::trainer::TrackedMetric;
use crate::swing::{round_to, BodyAnalysisResult};

/// Return a copy of `result` with the four tracked metrics calibrated.
///
/// Raw peaks become `value·scale + offset` unrounded. Each 4B field is mapped
/// from its own summary value and re-rounded to its summary precision.
/// Timing, ratio, quality and the per-frame series are left as measured.
pub fn apply_calibration(
    result: &BodyAnalysisResult,
    coefficients: &CalibrationCoefficients,
) -> BodyAnalysisResult {
    let mut calibrated = result.clone();

    let four_b = &mut calibrated.four_b;
    four_b.pelvis_velocity = round_to(
        coefficients.apply(TrackedMetric::PelvisVelocity, four_b.pelvis_velocity),
        0,
    );
    four_b.torso_velocity = round_to(
        coefficients.apply(TrackedMetric::TorsoVelocity, four_b.torso_velocity),
        0,
    );
    four_b.x_factor = round_to(coefficients.apply(TrackedMetric::XFactor, four_b.x_factor), 1);
    four_b.stretch_rate = round_to(
        coefficients.apply(TrackedMetric::StretchRate, four_b.stretch_rate),
        0,
    );

    let peaks = &mut calibrated.peaks;

    peaks.peak_pelvis_velocity =
        coefficients.apply(TrackedMetric::PelvisVelocity, peaks.peak_pelvis_velocity);
    peaks.peak_torso_velocity =
        coefficients.apply(TrackedMetric::TorsoVelocity, peaks.peak_torso_velocity);
    peaks.peak_x_factor = coefficients.apply(TrackedMetric::XFactor, peaks.peak_x_factor);
    peaks.peak_stretch_rate =
        coefficients.apply(TrackedMetric::StretchRate, peaks.peak_stretch_rate);

    calibrated
}
