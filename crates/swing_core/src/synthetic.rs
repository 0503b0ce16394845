//! Synthetic swing clips.
//!
//! Renders pose frames whose hip and shoulder lines follow scripted
//! per-frame rotation increments. Used by tests, benches and the CLI `synth`
//! command to exercise the pipeline without a pose estimator.

use std::ops::Range;

use crate::pose::{LandmarkIndex, PoseFrame, PoseLandmark};

/// Scripted rotation of pelvis and torso over a clip.
#[derive(Debug, Clone)]
pub struct SyntheticSwing {
    pub frame_count: usize,
    /// Pelvis angle before the swing (degrees)
    pub pelvis_base: f64,
    /// First frame of pelvis rotation
    pub pelvis_onset: usize,
    /// Pelvis increment per frame from the onset (degrees)
    pub pelvis_deltas: Vec<f64>,
    pub torso_base: f64,
    pub torso_onset: usize,
    pub torso_deltas: Vec<f64>,
    /// Visibility of every landmark outside occluded frames
    pub visibility: f64,
    occluded: Vec<Range<usize>>,
}

impl SyntheticSwing {
    /// 90-frame clip: pelvis fires at frame 20-35, torso at 26-40, and the
    /// torso keeps accelerating until contact around frame 39.
    pub fn clean() -> Self {
        Self {
            frame_count: 90,
            pelvis_base: -50.0,
            pelvis_onset: 20,
            pelvis_deltas: vec![
                8.0, 10.0, 12.0, 14.0, 14.0, 12.0, 10.0, 8.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 1.0,
            ],
            torso_base: -85.0,
            torso_onset: 26,
            torso_deltas: vec![
                2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 24.0, 28.0,
            ],
            visibility: 0.9,
            occluded: Vec::new(),
        }
    }

    /// A clip with no rotation at all.
    pub fn still(frame_count: usize) -> Self {
        Self {
            frame_count,
            pelvis_deltas: Vec::new(),
            torso_deltas: Vec::new(),
            ..Self::clean()
        }
    }

    /// Same script over a different clip length.
    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count;
        self
    }

    /// Drop hip and shoulder visibility to 0.2 for the given frames.
    pub fn with_occlusion(mut self, frames: Range<usize>) -> Self {
        self.occluded.push(frames);
        self
    }

    fn angle_at(base: f64, onset: usize, deltas: &[f64], frame: usize) -> f64 {
        let applied = frame.saturating_sub(onset).min(deltas.len());
        base + deltas[..applied].iter().sum::<f64>()
    }

    fn is_occluded(&self, frame: usize) -> bool {
        self.occluded.iter().any(|r| r.contains(&frame))
    }

    /// Render the clip at the given frame rate.
    pub fn render(&self, frame_rate: f64) -> Vec<PoseFrame> {
        (0..self.frame_count)
            .map(|f| {
                let pelvis = Self::angle_at(self.pelvis_base, self.pelvis_onset, &self.pelvis_deltas, f);
                let torso = Self::angle_at(self.torso_base, self.torso_onset, &self.torso_deltas, f);
                let core_visibility = if self.is_occluded(f) { 0.2 } else { self.visibility };

                let mut landmarks =
                    vec![PoseLandmark::new(0.5, 0.5, 0.0, self.visibility); LandmarkIndex::COUNT];
                set_line(
                    &mut landmarks,
                    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
                    (0.5, 0.62),
                    0.08,
                    pelvis,
                    core_visibility,
                );
                set_line(
                    &mut landmarks,
                    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
                    (0.5, 0.36),
                    0.12,
                    torso,
                    core_visibility,
                );

                PoseFrame::new(f as f64 * 1000.0 / frame_rate, f as u32, landmarks)
            })
            .collect()
    }
}

/// Place a left/right landmark pair so the right→left line sits at `angle_deg`.
fn set_line(
    landmarks: &mut [PoseLandmark],
    (left, right): (LandmarkIndex, LandmarkIndex),
    center: (f64, f64),
    half_width: f64,
    angle_deg: f64,
    visibility: f64,
) {
    let (s, c) = angle_deg.to_radians().sin_cos();
    landmarks[left.as_usize()] =
        PoseLandmark::new(center.0 + half_width * c, center.1 + half_width * s, 0.0, visibility);
    landmarks[right.as_usize()] =
        PoseLandmark::new(center.0 - half_width * c, center.1 - half_width * s, 0.0, visibility);
}
