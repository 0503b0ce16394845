//! # swing_core - Swing Kinetic-Sequencing Analysis Engine
//!
//! Turns a clip of 2D body-pose estimates into biomechanical timing and
//! velocity metrics, aligns them with a 3D reference system through learned
//! linear calibration, and fuses them with bat-sensor data.
//!
//! ## Features
//! - Pelvis/torso rotation, x-factor and angular velocity per frame
//! - Swing window detection (start, stride, contact, end)
//! - Kinetic sequencing quality (good / average / poor)
//! - Offline least-squares calibration trainer and online applier
//! - Unified 4B scoring input and heuristic motor-profile classifier
//!
//! Every stage is a pure, synchronous function over immutable input.
//!
//! ```rust
//! use swing_core::{analyze_swing, AnalysisConfig, SequencingQuality};
//! use swing_core::synthetic::SyntheticSwing;
//!
//! let frames = SyntheticSwing::clean().render(30.0);
//! let result = analyze_swing(&frames, 30.0, &AnalysisConfig::default()).unwrap();
//! assert!(result.swing_detected());
//! assert_eq!(result.four_b.sequencing_quality, SequencingQuality::Good);
//! ```

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Index loops mirror the frame-index formulas
#![allow(clippy::needless_range_loop)]

pub mod calibration;
pub mod config;
pub mod error;
pub mod fusion;
pub mod kinematics;
pub mod pose;
pub mod swing;
pub mod synthetic;

pub use error::{AnalysisError, CalibrationError, Result};

pub use config::{AnalysisConfig, Threshold};
pub use pose::{LandmarkIndex, PoseEstimator, PoseFrame, PoseLandmark};

pub use kinematics::{RotationFrame, VelocityFrame};
pub use swing::{
    analyze_swing, BodyAnalysisResult, FourBBodyInputs, PeakMetrics, SequencingQuality,
    SwingWindow,
};

pub use calibration::{
    apply_calibration, deserialize_model, serialize_model, train_calibration, train_metric,
    validate_dataset, CalibrationCoefficients, CalibrationModel, DatasetValidation,
    MetricBundle, RegressionResult, TrainingDataset, TrainingPair,
};

pub use fusion::{
    classify_motor_profile, BatSensorMetrics, BodyMetricsBundle, FusionConfig, MotorProfile,
    MotorProfileConfig, MotorProfileResult, UnifiedFourBInputs, UnifiedInputBuilder,
};
