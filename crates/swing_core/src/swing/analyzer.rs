//! # Body Analysis Pipeline
//!
//! Pose frames → rotation → velocity → swing window → peaks → 4B summary.
//!
//! Missing signal degrades the result instead of failing: invalid frames
//! contribute zero velocity, and a clip without a detectable swing is scanned
//! end to end (`peaks.degraded == true`).

use serde::{Deserialize, Serialize};

use super::sequencing::{compute_peak_metrics, PeakMetrics, SequencingQuality};
use super::window::{detect_swing_window, SwingWindow};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::kinematics::{compute_rotation_frames, compute_velocities, RotationFrame, VelocityFrame};
use crate::pose::PoseFrame;

/// Round to a fixed number of decimals.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounded, scoring-ready body summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourBBodyInputs {
    /// deg/s, whole degrees
    pub pelvis_velocity: f64,
    /// deg/s, whole degrees
    pub torso_velocity: f64,
    /// degrees, one decimal
    pub x_factor: f64,
    /// deg/s, whole degrees
    pub stretch_rate: f64,
    /// percent, one decimal
    pub consistency_cv: f64,
    /// one decimal
    pub tp_ratio: f64,
    pub sequencing_quality: SequencingQuality,
}

impl FourBBodyInputs {
    pub fn from_peaks(peaks: &PeakMetrics) -> Self {
        Self {
            pelvis_velocity: round_to(peaks.peak_pelvis_velocity, 0),
            torso_velocity: round_to(peaks.peak_torso_velocity, 0),
            x_factor: round_to(peaks.peak_x_factor, 1),
            stretch_rate: round_to(peaks.peak_stretch_rate, 0),
            consistency_cv: round_to(peaks.consistency_cv, 1),
            tp_ratio: round_to(peaks.tp_ratio, 1),
            sequencing_quality: peaks.sequencing_quality,
        }
    }
}

/// Immutable snapshot of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyAnalysisResult {
    pub rotation_frames: Vec<RotationFrame>,
    pub velocity_frames: Vec<VelocityFrame>,
    pub swing_window: Option<SwingWindow>,
    #[serde(flatten)]
    pub peaks: PeakMetrics,
    pub total_frames: usize,
    pub valid_frames: usize,
    /// 0 - 100
    pub valid_frame_percent: f64,
    pub frame_rate: f64,
    pub four_b: FourBBodyInputs,
}

impl BodyAnalysisResult {
    pub fn swing_detected(&self) -> bool {
        self.swing_window.is_some()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "frames={} valid={:.1}% window={} pelvis={:.0} torso={:.0} gap={} tp={:.2} quality={}",
            self.total_frames,
            self.valid_frame_percent,
            match &self.swing_window {
                Some(w) => format!("{}..{}@{}", w.start_frame, w.end_frame, w.contact_frame),
                None => "none".to_string(),
            },
            self.peaks.peak_pelvis_velocity,
            self.peaks.peak_torso_velocity,
            self.peaks.sequencing_gap,
            self.peaks.tp_ratio,
            self.peaks.sequencing_quality.as_str(),
        )
    }
}

/// Count positions where frame numbers stop increasing or timestamps go
/// backwards. Each one is logged; analysis still runs over the clip as given.
fn count_order_violations(frames: &[PoseFrame]) -> usize {
    let mut violations = 0;
    for (i, pair) in frames.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.frame_number <= prev.frame_number || next.timestamp < prev.timestamp {
            log::warn!(
                "Frame order violation at index {}: frame {} @ {}ms follows frame {} @ {}ms",
                i + 1,
                next.frame_number,
                next.timestamp,
                prev.frame_number,
                prev.timestamp
            );
            violations += 1;
        }
    }
    violations
}

/// Run the full body analysis over a complete clip.
///
/// Frames are expected in capture order; out-of-order frames are logged and
/// analyzed in the order given.
///
/// # Errors
/// `InvalidParameter` when `frame_rate` is not positive and finite, since no
/// time step can be derived from it.
pub fn analyze_swing(
    frames: &[PoseFrame],
    frame_rate: f64,
    config: &AnalysisConfig,
) -> Result<BodyAnalysisResult> {
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "frame rate must be positive and finite, got {}",
            frame_rate
        )));
    }
    count_order_violations(frames);

    let rotation_frames = compute_rotation_frames(frames, &config.rotation);
    let velocity_frames = compute_velocities(&rotation_frames, frame_rate, &config.velocity);

    let swing_window = detect_swing_window(&velocity_frames, &config.window);
    if swing_window.is_none() {
        log::info!("No swing window detected in {} frames; scanning full clip", frames.len());
    }

    let peaks = compute_peak_metrics(
        &rotation_frames,
        &velocity_frames,
        swing_window.as_ref(),
        &config.sequencing,
    );

    let total_frames = rotation_frames.len();
    let valid_frames = rotation_frames.iter().filter(|r| r.is_valid).count();
    let valid_frame_percent = if total_frames > 0 {
        valid_frames as f64 / total_frames as f64 * 100.0
    } else {
        0.0
    };

    let four_b = FourBBodyInputs::from_peaks(&peaks);
    let result = BodyAnalysisResult {
        rotation_frames,
        velocity_frames,
        swing_window,
        peaks,
        total_frames,
        valid_frames,
        valid_frame_percent,
        frame_rate,
        four_b,
    };

    log::debug!("Body analysis: {}", result.summary());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSwing;
    use insta::assert_json_snapshot;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(612.4, 0), 612.0);
        assert_eq!(round_to(612.5, 0), 613.0);
        assert_eq!(round_to(1.2345, 1), 1.2);
        assert_eq!(round_to(-3.26, 1), -3.3);
    }

    #[test]
    fn test_rejects_bad_frame_rate() {
        let frames = SyntheticSwing::clean().render(30.0);
        for rate in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let err = analyze_swing(&frames, rate, &AnalysisConfig::default()).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidParameter(_)));
        }
    }

    #[test]
    fn test_unordered_frames_are_analyzed() {
        let mut frames = SyntheticSwing::clean().render(30.0);
        frames.swap(10, 11);
        assert_eq!(count_order_violations(&frames), 1);

        let result = analyze_swing(&frames, 30.0, &AnalysisConfig::default()).unwrap();
        assert_eq!(result.total_frames, 90);
        assert_eq!(result.rotation_frames[10].frame_number, 11);
        assert!(result.swing_detected());

        let mut stamps = SyntheticSwing::clean().render(30.0);
        stamps[40].timestamp = 0.0;
        assert_eq!(count_order_violations(&stamps), 1);
        assert!(analyze_swing(&stamps, 30.0, &AnalysisConfig::default()).is_ok());
        assert_eq!(count_order_violations(&SyntheticSwing::clean().render(30.0)), 0);
    }

    #[test]
    fn test_empty_clip_degrades() {
        let result = analyze_swing(&[], 30.0, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.total_frames, 0);
        assert_eq!(result.valid_frame_percent, 0.0);
        assert!(result.velocity_frames.is_empty());
        assert!(!result.swing_detected());
        assert!(result.peaks.degraded);
        assert_eq!(result.four_b.pelvis_velocity, 0.0);
    }

    #[test]
    fn test_occlusion_lowers_valid_percent() {
        let frames = SyntheticSwing::clean().with_occlusion(0..9).render(30.0);
        let result = analyze_swing(&frames, 30.0, &AnalysisConfig::default()).unwrap();

        assert_eq!(result.total_frames, 90);
        assert_eq!(result.valid_frames, 81);
        assert!((result.valid_frame_percent - 90.0).abs() < 1e-9);
        // Occluded frames before the swing do not hide it
        assert!(result.swing_detected());
    }

    #[test]
    fn test_standing_still_has_no_window() {
        let frames = SyntheticSwing::still(60).render(30.0);
        let result = analyze_swing(&frames, 30.0, &AnalysisConfig::default()).unwrap();

        assert!(result.swing_window.is_none());
        assert!(result.peaks.degraded);
        assert_eq!(result.velocity_frames.len(), 58);
        assert!(result.summary().contains("window=none"));
    }

    #[test]
    fn test_four_b_rounding_snapshot() {
        let peaks = PeakMetrics {
            peak_pelvis_velocity: 612.46,
            pelvis_peak_frame: 24,
            pelvis_peak_time_ms: 800.0,
            peak_torso_velocity: 801.5,
            torso_peak_frame: 30,
            torso_peak_time_ms: 1000.0,
            peak_x_factor: 38.26,
            peak_stretch_rate: 455.4,
            sequencing_gap: 6,
            sequencing_gap_ms: 200.0,
            tp_ratio: 1.3087,
            sequencing_quality: SequencingQuality::Good,
            consistency_cv: 24.349,
            degraded: false,
        };

        assert_json_snapshot!(FourBBodyInputs::from_peaks(&peaks), @r###"
        {
          "pelvis_velocity": 612.0,
          "torso_velocity": 802.0,
          "x_factor": 38.3,
          "stretch_rate": 455.0,
          "consistency_cv": 24.3,
          "tp_ratio": 1.3,
          "sequencing_quality": "good"
        }
        "###);
    }

    #[test]
    fn test_result_json_flattens_peaks() {
        let frames = SyntheticSwing::clean().render(30.0);
        let result = analyze_swing(&frames, 30.0, &AnalysisConfig::default()).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("peakPelvisVelocity").is_some());
        assert!(json.get("swingWindow").is_some());
        assert_eq!(json["fourB"]["sequencing_quality"], "good");

        let back: BodyAnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.four_b, result.four_b);
        assert_eq!(back.swing_window, result.swing_window);
    }
}
