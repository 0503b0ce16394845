//! # Calibration Trainer
//!
//! Offline batch job: paired (2D estimate, 3D ground truth) observations in,
//! immutable [`CalibrationModel`] out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{CalibrationCoefficients, CalibrationMetrics, CalibrationModel, LOW_SAMPLE_COUNT};
use super::regression::{train_metric, RegressionResult};
use crate::error::CalibrationError;
use crate::swing::FourBBodyInputs;

/// Metrics the trainer fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackedMetric {
    PelvisVelocity,
    TorsoVelocity,
    XFactor,
    StretchRate,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 4] = [
        TrackedMetric::PelvisVelocity,
        TrackedMetric::TorsoVelocity,
        TrackedMetric::XFactor,
        TrackedMetric::StretchRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TrackedMetric::PelvisVelocity => "pelvis_velocity",
            TrackedMetric::TorsoVelocity => "torso_velocity",
            TrackedMetric::XFactor => "x_factor",
            TrackedMetric::StretchRate => "stretch_rate",
        }
    }
}

/// The four tracked values from one measurement system.
///
/// Missing fields read as 0, which the trainer treats as "unmeasured".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricBundle {
    pub pelvis_velocity: f64,
    pub torso_velocity: f64,
    pub x_factor: f64,
    pub stretch_rate: f64,
}

impl MetricBundle {
    pub fn get(&self, metric: TrackedMetric) -> f64 {
        match metric {
            TrackedMetric::PelvisVelocity => self.pelvis_velocity,
            TrackedMetric::TorsoVelocity => self.torso_velocity,
            TrackedMetric::XFactor => self.x_factor,
            TrackedMetric::StretchRate => self.stretch_rate,
        }
    }
}

impl From<&FourBBodyInputs> for MetricBundle {
    fn from(inputs: &FourBBodyInputs) -> Self {
        Self {
            pelvis_velocity: inputs.pelvis_velocity,
            torso_velocity: inputs.torso_velocity,
            x_factor: inputs.x_factor,
            stretch_rate: inputs.stretch_rate,
        }
    }
}

/// One paired observation of the same swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPair {
    pub session_id: String,
    pub player_id: String,
    pub recorded_at: DateTime<Utc>,
    /// Cheap 2D video estimate
    pub estimate: MetricBundle,
    /// High-fidelity 3D measurement
    pub ground_truth: MetricBundle,
}

/// Append-only collection of training pairs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub pairs: Vec<TrainingPair>,
}

impl TrainingDataset {
    pub fn new(pairs: Vec<TrainingPair>) -> Self {
        Self { pairs }
    }

    pub fn push(&mut self, pair: TrainingPair) {
        self.pairs.push(pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `(estimate, ground_truth)` series for one metric.
    pub fn metric_pairs(&self, metric: TrackedMetric) -> Vec<(f64, f64)> {
        self.pairs
            .iter()
            .map(|p| (p.estimate.get(metric), p.ground_truth.get(metric)))
            .collect()
    }
}

/// Sample-count-weighted mean: Σ(value·n) / Σn.
///
/// Metrics with n = 0 carry no weight (and cannot turn an infinite MAE
/// into NaN).
fn weighted_mean(results: &[RegressionResult], value: impl Fn(&RegressionResult) -> f64) -> f64 {
    let (sum, weight) = results
        .iter()
        .filter(|r| r.n > 0)
        .fold((0.0, 0usize), |(sum, weight), r| (sum + value(r) * r.n as f64, weight + r.n));
    if weight == 0 {
        0.0
    } else {
        sum / weight as f64
    }
}

/// Train a model, stamping it with the current time.
pub fn train_calibration(
    dataset: &TrainingDataset,
    version: &str,
) -> Result<CalibrationModel, CalibrationError> {
    train_calibration_at(dataset, version, Utc::now())
}

/// Train a model with an explicit training timestamp.
///
/// # Errors
/// `InsufficientPairs` when the dataset holds fewer than 3 pairs. A small
/// dataset (< 10 pairs) still trains; check [`CalibrationModel::is_low_sample`].
pub fn train_calibration_at(
    dataset: &TrainingDataset,
    version: &str,
    trained_at: DateTime<Utc>,
) -> Result<CalibrationModel, CalibrationError> {
    if dataset.len() < LOW_SAMPLE_COUNT {
        log::warn!(
            "Training calibration {} on only {} pairs (recommend >= {})",
            version,
            dataset.len(),
            LOW_SAMPLE_COUNT
        );
    }

    let metrics = CalibrationMetrics {
        pelvis_velocity: train_metric(&dataset.metric_pairs(TrackedMetric::PelvisVelocity))?,
        torso_velocity: train_metric(&dataset.metric_pairs(TrackedMetric::TorsoVelocity))?,
        x_factor: train_metric(&dataset.metric_pairs(TrackedMetric::XFactor))?,
        stretch_rate: train_metric(&dataset.metric_pairs(TrackedMetric::StretchRate))?,
    };

    let all = metrics.as_array();
    let overall_r2 = weighted_mean(&all, |r| r.r2);
    let overall_mae = weighted_mean(&all, |r| r.mae);

    for metric in TrackedMetric::ALL {
        let r = metrics.get(metric);
        log::debug!(
            "{}: y = {:.4}x + {:.3} (r2={:.3}, mae={:.2}, n={})",
            metric.name(),
            r.scale,
            r.offset,
            r.r2,
            r.mae,
            r.n
        );
    }

    let model = CalibrationModel {
        version: version.to_string(),
        trained_at,
        sample_count: dataset.len(),
        coefficients: CalibrationCoefficients::from_metrics(&metrics),
        metrics,
        overall_r2,
        overall_mae,
    };

    log::info!(
        "Trained calibration {} on {} pairs: overall r2={:.3}, mae={:.2}",
        model.version,
        model.sample_count,
        model.overall_r2,
        model.overall_mae
    );
    Ok(model)
}
