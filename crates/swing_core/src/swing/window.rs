//! # Swing Window Detector
//!
//! One-shot scan over the smoothed velocity sequence.
//!
//! ## Algorithm
//! 1. Start: first frame whose pelvis velocity exceeds the start threshold
//! 2. Contact: maximum torso velocity within the search window after start
//! 3. End: contact + follow-through, clipped to the last frame
//! 4. Stride: start + floor(stride_fraction · (contact - start))
//! 5. Reject candidates shorter than the minimum duration
//!
//! Starts are sharp threshold crossings; contact is a smooth peak and needs a
//! max search instead.

use serde::{Deserialize, Serialize};

use crate::config::SwingWindowConfig;
use crate::kinematics::VelocityFrame;

/// Detected swing phase boundaries, as indices into the input sequence.
///
/// `start_frame < stride_frame < contact_frame <= end_frame`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingWindow {
    pub start_frame: usize,
    pub stride_frame: usize,
    pub contact_frame: usize,
    pub end_frame: usize,
}

impl SwingWindow {
    /// Start-to-contact length in frames.
    pub fn duration_frames(&self) -> usize {
        self.contact_frame - self.start_frame
    }

    pub fn contains(&self, frame_index: usize) -> bool {
        frame_index >= self.start_frame && frame_index <= self.end_frame
    }
}

/// Locate swing start, contact and end.
///
/// Returns `None` when no frame crosses the start threshold or the candidate
/// is shorter than the minimum duration. Neither is an error.
pub fn detect_swing_window(
    velocities: &[VelocityFrame],
    config: &SwingWindowConfig,
) -> Option<SwingWindow> {
    let start = velocities
        .iter()
        .position(|v| v.pelvis_velocity > config.start_threshold_dps)?;

    let search_end = (start + config.max_window_frames.max(1)).min(velocities.len());
    let mut contact = start;
    let mut max_torso = velocities[start].torso_velocity;
    for (i, v) in velocities.iter().enumerate().take(search_end).skip(start + 1) {
        if v.torso_velocity > max_torso {
            max_torso = v.torso_velocity;
            contact = i;
        }
    }

    let duration = contact - start;
    if duration < config.min_duration_frames || duration == 0 {
        log::debug!(
            "Swing candidate at velocity frame {} rejected: {} frames to contact (min {})",
            velocities[start].frame_index,
            duration,
            config.min_duration_frames
        );
        return None;
    }

    let last = velocities.len() - 1;
    let end = (contact + config.follow_through_frames).min(last);
    let stride = start + (config.stride_fraction * duration as f64).floor() as usize;
    // Keep the strict ordering even for extreme fractions
    let stride = stride.clamp(start + 1, contact.saturating_sub(1).max(start + 1));

    Some(SwingWindow {
        start_frame: velocities[start].frame_index,
        stride_frame: velocities[stride].frame_index,
        contact_frame: velocities[contact].frame_index,
        end_frame: velocities[end].frame_index,
    })
}
