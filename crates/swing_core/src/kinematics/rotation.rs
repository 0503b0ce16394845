//! # Rotation Frame Processor
//!
//! Converts one pose frame into pelvis and torso orientation.
//!
//! ## Algorithm
//! 1. Pelvis line: right hip → left hip; torso line: right shoulder → left shoulder
//! 2. Angle = atan2(Δy, Δx) in degrees, `None` if either landmark is below
//!    the visibility minimum
//! 3. Confidence = mean visibility of the four landmarks
//! 4. Valid = both angles present and confidence >= minimum

use serde::{Deserialize, Serialize};

use crate::config::RotationConfig;
use crate::pose::{LandmarkIndex, PoseFrame};

/// Body rotation state for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationFrame {
    /// Position in the input sequence
    pub frame_index: usize,
    pub frame_number: u32,
    /// Timestamp in milliseconds
    pub timestamp: f64,
    /// Hip line angle (degrees, camera-relative); 0 when unobtainable
    pub pelvis_angle: f64,
    /// Shoulder line angle (degrees, camera-relative); 0 when unobtainable
    pub torso_angle: f64,
    /// torso_angle - pelvis_angle
    pub x_factor: f64,
    /// Mean hip/shoulder visibility (0.0 - 1.0)
    pub confidence: f64,
    pub is_valid: bool,
}

/// Angle of the line from `right` to `left` landmark, in degrees.
///
/// Returns `None` if either landmark is missing or below `min_visibility`.
pub fn line_angle_deg(
    frame: &PoseFrame,
    left: LandmarkIndex,
    right: LandmarkIndex,
    min_visibility: f64,
) -> Option<f64> {
    let l = frame.landmark(left)?;
    let r = frame.landmark(right)?;

    if !l.is_visible(min_visibility) || !r.is_visible(min_visibility) {
        return None;
    }

    let dx = l.x - r.x;
    let dy = l.y - r.y;
    Some(dy.atan2(dx).to_degrees())
}

/// Compute the rotation state of one frame. Pure; never fails.
pub fn compute_rotation_frame(
    frame: &PoseFrame,
    frame_index: usize,
    config: &RotationConfig,
) -> RotationFrame {
    let pelvis = line_angle_deg(
        frame,
        LandmarkIndex::LeftHip,
        LandmarkIndex::RightHip,
        config.min_visibility,
    );
    let torso = line_angle_deg(
        frame,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
        config.min_visibility,
    );

    let visibility_sum: f64 = LandmarkIndex::CORE
        .iter()
        .map(|&idx| frame.visibility(idx))
        .sum();
    let confidence = (visibility_sum / LandmarkIndex::CORE.len() as f64).clamp(0.0, 1.0);

    let is_valid = pelvis.is_some() && torso.is_some() && confidence >= config.min_confidence;
    let pelvis_angle = pelvis.unwrap_or(0.0);
    let torso_angle = torso.unwrap_or(0.0);

    RotationFrame {
        frame_index,
        frame_number: frame.frame_number,
        timestamp: frame.timestamp,
        pelvis_angle,
        torso_angle,
        x_factor: torso_angle - pelvis_angle,
        confidence,
        is_valid,
    }
}

/// Map a whole sequence 1:1 to rotation frames.
pub fn compute_rotation_frames(frames: &[PoseFrame], config: &RotationConfig) -> Vec<RotationFrame> {
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| compute_rotation_frame(frame, i, config))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pose::PoseLandmark;
    use proptest::prelude::*;

    /// Frame whose hip and shoulder lines sit at the given angles.
    pub(crate) fn frame_with_angles(
        frame_number: u32,
        pelvis_deg: f64,
        torso_deg: f64,
        hip_vis: f64,
        shoulder_vis: f64,
    ) -> PoseFrame {
        let mut landmarks = vec![PoseLandmark::new(0.5, 0.5, 0.0, 0.9); LandmarkIndex::COUNT];
        let place = |center: (f64, f64), angle: f64, half_width: f64| {
            let (s, c) = angle.to_radians().sin_cos();
            let left = (center.0 + half_width * c, center.1 + half_width * s);
            let right = (center.0 - half_width * c, center.1 - half_width * s);
            (left, right)
        };

        let (lh, rh) = place((0.5, 0.6), pelvis_deg, 0.08);
        let (ls, rs) = place((0.5, 0.35), torso_deg, 0.12);
        landmarks[LandmarkIndex::LeftHip.as_usize()] = PoseLandmark::new(lh.0, lh.1, 0.0, hip_vis);
        landmarks[LandmarkIndex::RightHip.as_usize()] = PoseLandmark::new(rh.0, rh.1, 0.0, hip_vis);
        landmarks[LandmarkIndex::LeftShoulder.as_usize()] =
            PoseLandmark::new(ls.0, ls.1, 0.0, shoulder_vis);
        landmarks[LandmarkIndex::RightShoulder.as_usize()] =
            PoseLandmark::new(rs.0, rs.1, 0.0, shoulder_vis);

        PoseFrame::new(frame_number as f64 * 1000.0 / 30.0, frame_number, landmarks)
    }

    #[test]
    fn test_angles_and_x_factor() {
        let frame = frame_with_angles(0, 10.0, 35.0, 0.9, 0.9);
        let rot = compute_rotation_frame(&frame, 0, &RotationConfig::default());

        assert!(rot.is_valid);
        assert!((rot.pelvis_angle - 10.0).abs() < 1e-9, "pelvis: {}", rot.pelvis_angle);
        assert!((rot.torso_angle - 35.0).abs() < 1e-9, "torso: {}", rot.torso_angle);
        assert!((rot.x_factor - (rot.torso_angle - rot.pelvis_angle)).abs() < 1e-12);
        assert!((rot.confidence - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_right_to_left_direction() {
        // Left hip to the right of and level with the right hip: 0 degrees
        let mut landmarks = vec![PoseLandmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftHip.as_usize()] = PoseLandmark::new(0.6, 0.5, 0.0, 1.0);
        landmarks[LandmarkIndex::RightHip.as_usize()] = PoseLandmark::new(0.4, 0.5, 0.0, 1.0);
        let frame = PoseFrame::new(0.0, 0, landmarks);

        let angle = line_angle_deg(&frame, LandmarkIndex::LeftHip, LandmarkIndex::RightHip, 0.5);
        assert_eq!(angle, Some(0.0));

        let flipped = line_angle_deg(&frame, LandmarkIndex::RightHip, LandmarkIndex::LeftHip, 0.5)
            .unwrap();
        assert!((flipped - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_shoulder_visibility_invalidates() {
        let frame = frame_with_angles(0, 0.0, 20.0, 1.0, 0.45);
        let rot = compute_rotation_frame(&frame, 0, &RotationConfig::default());

        assert!(!rot.is_valid);
        assert_eq!(rot.torso_angle, 0.0);
        // Mean visibility (1.0 + 1.0 + 0.45 + 0.45) / 4 is above 0.5, still invalid
        assert!(rot.confidence >= 0.5);
    }

    #[test]
    fn test_low_mean_confidence_invalidates() {
        // All four pass the per-landmark minimum only because it was lowered
        let config = RotationConfig {
            min_visibility: 0.3,
            min_confidence: 0.5,
        };
        let frame = frame_with_angles(0, 0.0, 20.0, 0.4, 0.4);
        let rot = compute_rotation_frame(&frame, 0, &config);

        assert!(!rot.is_valid);
        assert!((rot.torso_angle - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_frame_is_invalid() {
        let frame = PoseFrame::new(0.0, 3, Vec::new());
        let rot = compute_rotation_frame(&frame, 3, &RotationConfig::default());

        assert!(!rot.is_valid);
        assert_eq!(rot.pelvis_angle, 0.0);
        assert_eq!(rot.torso_angle, 0.0);
        assert_eq!(rot.x_factor, 0.0);
        assert_eq!(rot.confidence, 0.0);
        assert_eq!(rot.frame_number, 3);
    }

    proptest! {
        #[test]
        fn prop_shoulder_below_minimum_is_never_valid(
            hip_vis in 0.0f64..=1.0,
            shoulder_vis in 0.0f64..0.5,
            pelvis in -80.0f64..80.0,
            torso in -80.0f64..80.0,
        ) {
            let frame = frame_with_angles(0, pelvis, torso, hip_vis, shoulder_vis);
            let rot = compute_rotation_frame(&frame, 0, &RotationConfig::default());
            prop_assert!(!rot.is_valid);
        }

        #[test]
        fn prop_confidence_clamped(
            hip_vis in -2.0f64..3.0,
            shoulder_vis in -2.0f64..3.0,
        ) {
            let frame = frame_with_angles(0, 5.0, 10.0, hip_vis, shoulder_vis);
            let rot = compute_rotation_frame(&frame, 0, &RotationConfig::default());
            prop_assert!((0.0..=1.0).contains(&rot.confidence));
        }

        #[test]
        fn prop_x_factor_is_difference_when_hips_visible(
            shoulder_vis in 0.0f64..=1.0,
            pelvis in -80.0f64..80.0,
            torso in -80.0f64..80.0,
        ) {
            let frame = frame_with_angles(0, pelvis, torso, 0.8, shoulder_vis);
            let rot = compute_rotation_frame(&frame, 0, &RotationConfig::default());
            prop_assert!((rot.x_factor - (rot.torso_angle - rot.pelvis_angle)).abs() < 1e-9);
        }
    }
}
