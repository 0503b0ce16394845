//! # Velocity Engine
//!
//! Differentiates rotation angles into angular velocities.
//!
//! ## Algorithm
//! 1. For each interior frame i (1..n-2): v = (angle[i+1] - angle[i-1]) / (2·dt)
//! 2. Pelvis/torso report magnitude, x-factor keeps its sign
//!    (stretch = positive, contraction = negative)
//! 3. Frames without a valid center get an explicit zero record (optionally
//!    also frames next to an invalid one)
//! 4. Symmetric moving average over all three channels, clipped at the edges
//!
//! Output length is always `n - 2`, index-aligned starting at frame 1.

use serde::{Deserialize, Serialize};

use super::rotation::RotationFrame;
use crate::config::VelocityConfig;

/// Angular velocity of one interior frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityFrame {
    /// Position of the source frame in the input sequence
    pub frame_index: usize,
    pub frame_number: u32,
    pub timestamp: f64,
    /// deg/s, always >= 0
    pub pelvis_velocity: f64,
    /// deg/s, always >= 0
    pub torso_velocity: f64,
    /// deg/s, signed
    pub x_factor_velocity: f64,
}

impl VelocityFrame {
    fn zero(source: &RotationFrame) -> Self {
        Self {
            frame_index: source.frame_index,
            frame_number: source.frame_number,
            timestamp: source.timestamp,
            ..Default::default()
        }
    }
}

/// Wrap an angle difference into (-180, 180].
#[inline]
fn wrap_delta(delta: f64) -> f64 {
    let mut d = delta % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Raw central-difference velocities (no smoothing).
pub fn differentiate(
    rotations: &[RotationFrame],
    frame_rate: f64,
    config: &VelocityConfig,
) -> Vec<VelocityFrame> {
    if rotations.len() < 3 {
        return Vec::new();
    }
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        log::warn!("Cannot differentiate at frame rate {}", frame_rate);
        return rotations[1..rotations.len() - 1]
            .iter()
            .map(VelocityFrame::zero)
            .collect();
    }

    let two_dt = 2.0 / frame_rate;
    let delta = |a: f64, b: f64| {
        let d = b - a;
        if config.wrap_angles {
            wrap_delta(d)
        } else {
            d
        }
    };

    rotations
        .windows(3)
        .map(|w| {
            let (prev, center, next) = (&w[0], &w[1], &w[2]);
            let neighbour_invalid = !prev.is_valid || !next.is_valid;
            if !center.is_valid || (config.zero_invalid_neighbours && neighbour_invalid) {
                return VelocityFrame::zero(center);
            }

            VelocityFrame {
                frame_index: center.frame_index,
                frame_number: center.frame_number,
                timestamp: center.timestamp,
                pelvis_velocity: (delta(prev.pelvis_angle, next.pelvis_angle) / two_dt).abs(),
                torso_velocity: (delta(prev.torso_angle, next.torso_angle) / two_dt).abs(),
                x_factor_velocity: delta(prev.x_factor, next.x_factor) / two_dt,
            }
        })
        .collect()
}

/// Symmetric moving average over all three channels.
///
/// The window is clipped at sequence edges, so edge frames average fewer
/// samples instead of reading out of range. A window of 0 or 1 is a no-op.
pub fn smooth_velocities(frames: &[VelocityFrame], window: usize) -> Vec<VelocityFrame> {
    if window <= 1 || frames.len() < 2 {
        return frames.to_vec();
    }

    let half = window / 2;
    let last = frames.len() - 1;

    (0..frames.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half).min(last);
            let span = &frames[lo..=hi];
            let count = span.len() as f64;

            let (p, t, x) = span.iter().fold((0.0, 0.0, 0.0), |acc, f| {
                (
                    acc.0 + f.pelvis_velocity,
                    acc.1 + f.torso_velocity,
                    acc.2 + f.x_factor_velocity,
                )
            });

            VelocityFrame {
                pelvis_velocity: p / count,
                torso_velocity: t / count,
                x_factor_velocity: x / count,
                ..frames[i]
            }
        })
        .collect()
}

/// Differentiate and smooth a rotation sequence.
pub fn compute_velocities(
    rotations: &[RotationFrame],
    frame_rate: f64,
    config: &VelocityConfig,
) -> Vec<VelocityFrame> {
    let raw = differentiate(rotations, frame_rate, config);
    smooth_velocities(&raw, config.smoothing_window)
}
