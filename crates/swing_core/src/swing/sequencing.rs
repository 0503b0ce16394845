//! # Peak & Sequencing Analyzer
//!
//! Extracts peak angular velocities inside the swing window and judges
//! kinetic-chain order: the pelvis should peak first and the torso should
//! amplify it.
//!
//! ## Classification (default rule table, first match wins)
//!
//! | Quality | Gap (frames) | T:P ratio |
//! |---------|--------------|-----------|
//! | good    | > 2          | > 1.0     |
//! | average | >= 0         | >= 0.9    |
//! | poor    | otherwise    |           |

use serde::{Deserialize, Serialize};

use super::window::SwingWindow;
use crate::config::{SequencingConfig, Threshold};
use crate::kinematics::{RotationFrame, VelocityFrame};

/// Kinetic sequencing quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencingQuality {
    Good,
    Average,
    Poor,
}

impl SequencingQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequencingQuality::Good => "good",
            SequencingQuality::Average => "average",
            SequencingQuality::Poor => "poor",
        }
    }
}

/// One row of the sequencing rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencingRule {
    pub quality: SequencingQuality,
    /// Condition on torso_peak_frame - pelvis_peak_frame
    pub min_gap: Threshold,
    /// Condition on peak torso / peak pelvis velocity
    pub min_ratio: Threshold,
}

impl SequencingRule {
    pub fn matches(&self, gap: i64, ratio: f64) -> bool {
        self.min_gap.matches(gap as f64) && self.min_ratio.matches(ratio)
    }
}

pub fn default_sequencing_rules() -> Vec<SequencingRule> {
    vec![
        // Pelvis clearly leads, torso amplifies
        SequencingRule {
            quality: SequencingQuality::Good,
            min_gap: Threshold::Above(2.0),
            min_ratio: Threshold::Above(1.0),
        },
        // Acceptable order, comparable magnitude
        SequencingRule {
            quality: SequencingQuality::Average,
            min_gap: Threshold::AtLeast(0.0),
            min_ratio: Threshold::AtLeast(0.9),
        },
    ]
}

/// Classify sequencing through an ordered rule table; no match is `Poor`.
pub fn classify_sequencing(gap: i64, ratio: f64, rules: &[SequencingRule]) -> SequencingQuality {
    rules
        .iter()
        .find(|rule| rule.matches(gap, ratio))
        .map(|rule| rule.quality)
        .unwrap_or(SequencingQuality::Poor)
}

/// Coefficient of variation (stddev / mean × 100) of the values above `floor`.
///
/// Uses the population standard deviation. Returns 0 with fewer than two
/// qualifying samples or a zero mean.
pub fn consistency_cv(values: impl IntoIterator<Item = f64>, floor: f64) -> f64 {
    let samples: Vec<f64> = values.into_iter().filter(|&v| v > floor).collect();
    if samples.len() < 2 {
        return 0.0;
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = samples.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean * 100.0
}

/// Raw (unrounded) peak and timing metrics of one swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakMetrics {
    pub peak_pelvis_velocity: f64,
    pub pelvis_peak_frame: usize,
    pub pelvis_peak_time_ms: f64,
    pub peak_torso_velocity: f64,
    pub torso_peak_frame: usize,
    pub torso_peak_time_ms: f64,
    /// Largest |x-factor| over valid frames (degrees)
    pub peak_x_factor: f64,
    /// Largest positive x-factor velocity (deg/s)
    pub peak_stretch_rate: f64,
    /// torso_peak_frame - pelvis_peak_frame
    pub sequencing_gap: i64,
    pub sequencing_gap_ms: f64,
    pub tp_ratio: f64,
    pub sequencing_quality: SequencingQuality,
    pub consistency_cv: f64,
    /// True when no swing window was found and the whole clip was scanned
    pub degraded: bool,
}

/// First frame holding the maximum of `value`: (frame_index, timestamp, value).
fn peak_of(frames: &[VelocityFrame], value: impl Fn(&VelocityFrame) -> f64) -> (usize, f64, f64) {
    let mut best: Option<(usize, f64, f64)> = None;
    for f in frames {
        let v = value(f);
        match best {
            Some((_, _, b)) if v <= b => {}
            _ => best = Some((f.frame_index, f.timestamp, v)),
        }
    }
    best.unwrap_or((0, 0.0, 0.0))
}

/// Compute peaks, timing and sequencing quality.
///
/// With a window, only frames inside `[start_frame, end_frame]` are scanned;
/// without one the whole sequence is used (degraded mode).
pub fn compute_peak_metrics(
    rotations: &[RotationFrame],
    velocities: &[VelocityFrame],
    window: Option<&SwingWindow>,
    config: &SequencingConfig,
) -> PeakMetrics {
    let in_scope = |frame_index: usize| window.map_or(true, |w| w.contains(frame_index));

    let scoped_velocities: Vec<VelocityFrame> = velocities
        .iter()
        .filter(|v| in_scope(v.frame_index))
        .copied()
        .collect();

    let (pelvis_frame, pelvis_time, peak_pelvis) =
        peak_of(&scoped_velocities, |v| v.pelvis_velocity);
    let (torso_frame, torso_time, peak_torso) = peak_of(&scoped_velocities, |v| v.torso_velocity);

    let peak_x_factor = rotations
        .iter()
        .filter(|r| r.is_valid && in_scope(r.frame_index))
        .map(|r| r.x_factor.abs())
        .fold(0.0, f64::max);

    let peak_stretch_rate = scoped_velocities
        .iter()
        .map(|v| v.x_factor_velocity)
        .fold(0.0, f64::max);

    let sequencing_gap = torso_frame as i64 - pelvis_frame as i64;
    let tp_ratio = if peak_pelvis > 0.0 {
        peak_torso / peak_pelvis
    } else {
        1.0
    };
    let sequencing_quality = classify_sequencing(sequencing_gap, tp_ratio, &config.rules);

    let consistency = consistency_cv(
        scoped_velocities.iter().map(|v| v.pelvis_velocity),
        config.cv_noise_floor_dps,
    );

    PeakMetrics {
        peak_pelvis_velocity: peak_pelvis,
        pelvis_peak_frame: pelvis_frame,
        pelvis_peak_time_ms: pelvis_time,
        peak_torso_velocity: peak_torso,
        torso_peak_frame: torso_frame,
        torso_peak_time_ms: torso_time,
        peak_x_factor,
        peak_stretch_rate,
        sequencing_gap,
        sequencing_gap_ms: torso_time - pelvis_time,
        tp_ratio,
        sequencing_quality,
        consistency_cv: consistency,
        degraded: window.is_none(),
    }
}
