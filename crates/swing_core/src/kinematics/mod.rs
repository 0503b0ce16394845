//! # Kinematics Module
//!
//! Per-frame body rotation and its time derivative.
//!
//! - `rotation` - Pelvis/torso line angles, x-factor and frame validity
//! - `velocity` - Central-difference angular velocity with smoothing

pub mod rotation;
pub mod velocity;

pub use rotation::{compute_rotation_frame, compute_rotation_frames, line_angle_deg, RotationFrame};
pub use velocity::{compute_velocities, smooth_velocities, VelocityFrame};
