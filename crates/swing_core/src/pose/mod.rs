//! # Pose Module
//!
//! Input types handed to the analysis core by an external pose estimator.
//!
//! - `landmark` - Landmark, frame and anatomical index definitions
//! - `estimator` - Capability trait for plugging in a concrete estimator

pub mod estimator;
pub mod landmark;

pub use estimator::{collect_pose_frames, PoseEstimator};
pub use landmark::{LandmarkIndex, PoseFrame, PoseLandmark};
