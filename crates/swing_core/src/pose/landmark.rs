//! # Pose Landmarks
//!
//! 33-point body topology as produced by BlazePose-style estimators.
//! Coordinates are frame-normalized (`x`, `y` in `[0, 1]`), `z` is relative depth.

use serde::{Deserialize, Serialize};

/// Anatomical landmark indices (33-point topology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    /// The four landmarks the rotation processor reads.
    pub const CORE: [LandmarkIndex; 4] = [
        LandmarkIndex::LeftHip,
        LandmarkIndex::RightHip,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::RightShoulder,
    ];

    #[inline]
    pub fn as_usize(self) -> usize {
        self as usize
    }
}

/// A single 2D landmark with visibility.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseLandmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Estimator visibility score (0.0 - 1.0)
    pub visibility: f64,
}

impl PoseLandmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// Visibility clamped to `[0, 1]`; NaN counts as invisible.
    pub fn clamped_visibility(&self) -> f64 {
        if self.visibility.is_nan() {
            0.0
        } else {
            self.visibility.clamp(0.0, 1.0)
        }
    }

    pub fn is_visible(&self, min_visibility: f64) -> bool {
        self.clamped_visibility() >= min_visibility
    }
}

/// One frame of landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseFrame {
    /// Timestamp in milliseconds, non-decreasing across a sequence
    pub timestamp: f64,
    /// 0-based frame number, strictly increasing across a sequence
    pub frame_number: u32,
    /// Index-addressed landmarks; may be empty when nothing was detected
    pub landmarks: Vec<PoseLandmark>,
}

impl PoseFrame {
    pub fn new(timestamp: f64, frame_number: u32, landmarks: Vec<PoseLandmark>) -> Self {
        Self {
            timestamp,
            frame_number,
            landmarks,
        }
    }

    /// Look up a landmark; `None` if the estimator returned fewer slots.
    pub fn landmark(&self, index: LandmarkIndex) -> Option<&PoseLandmark> {
        self.landmarks.get(index.as_usize())
    }

    /// Visibility of a landmark, 0.0 when the slot is missing.
    pub fn visibility(&self, index: LandmarkIndex) -> f64 {
        self.landmark(index)
            .map(PoseLandmark::clamped_visibility)
            .unwrap_or(0.0)
    }
}
