//! # Calibration
//!
//! Offline trainer and online applier mapping 2D video estimates onto a 3D
//! reference measurement system.
//!
//! - `regression`: per-metric least-squares fit
//! - `trainer`: dataset → [`CalibrationModel`]
//! - `dataset`: advisory dataset validation
//! - `model`: model/coefficients types and JSON round-trip
//! - `applier`: coefficients × analysis result → calibrated result

pub mod applier;
pub mod dataset;
pub mod model;
pub mod regression;
pub mod trainer;

pub use applier::apply_calibration;
pub use dataset::{validate_dataset, DatasetIssue, DatasetValidation};
pub use model::{
    deserialize_model, serialize_model, CalibrationCoefficients, CalibrationMetrics,
    CalibrationModel, LOW_SAMPLE_COUNT,
};
pub use regression::{train_metric, RegressionResult, MIN_REGRESSION_PAIRS};
pub use trainer::{
    train_calibration, train_calibration_at, MetricBundle, TrackedMetric, TrainingDataset,
    TrainingPair,
};
