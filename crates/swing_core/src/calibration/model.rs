//! Trained calibration model and its JSON form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::regression::{infinite_as_null, RegressionResult};
use super::trainer::TrackedMetric;
use crate::error::CalibrationError;

/// Below this many pairs a model is usable but flagged as low-sample.
pub const LOW_SAMPLE_COUNT: usize = 10;

/// One regression per tracked metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationMetrics {
    pub pelvis_velocity: RegressionResult,
    pub torso_velocity: RegressionResult,
    pub x_factor: RegressionResult,
    pub stretch_rate: RegressionResult,
}

impl CalibrationMetrics {
    pub fn get(&self, metric: TrackedMetric) -> &RegressionResult {
        match metric {
            TrackedMetric::PelvisVelocity => &self.pelvis_velocity,
            TrackedMetric::TorsoVelocity => &self.torso_velocity,
            TrackedMetric::XFactor => &self.x_factor,
            TrackedMetric::StretchRate => &self.stretch_rate,
        }
    }

    pub fn as_array(&self) -> [RegressionResult; 4] {
        [self.pelvis_velocity, self.torso_velocity, self.x_factor, self.stretch_rate]
    }
}

/// Flat scale/offset pairs; the only part of a model kept in production.
///
/// Missing JSON fields fall back to the identity mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalibrationCoefficients {
    pub pelvis_velocity_scale: f64,
    pub pelvis_velocity_offset: f64,
    pub torso_velocity_scale: f64,
    pub torso_velocity_offset: f64,
    pub x_factor_scale: f64,
    pub x_factor_offset: f64,
    pub stretch_rate_scale: f64,
    pub stretch_rate_offset: f64,
}

impl Default for CalibrationCoefficients {
    fn default() -> Self {
        Self::identity()
    }
}

impl CalibrationCoefficients {
    pub const fn identity() -> Self {
        Self {
            pelvis_velocity_scale: 1.0,
            pelvis_velocity_offset: 0.0,
            torso_velocity_scale: 1.0,
            torso_velocity_offset: 0.0,
            x_factor_scale: 1.0,
            x_factor_offset: 0.0,
            stretch_rate_scale: 1.0,
            stretch_rate_offset: 0.0,
        }
    }

    pub fn from_metrics(metrics: &CalibrationMetrics) -> Self {
        Self {
            pelvis_velocity_scale: metrics.pelvis_velocity.scale,
            pelvis_velocity_offset: metrics.pelvis_velocity.offset,
            torso_velocity_scale: metrics.torso_velocity.scale,
            torso_velocity_offset: metrics.torso_velocity.offset,
            x_factor_scale: metrics.x_factor.scale,
            x_factor_offset: metrics.x_factor.offset,
            stretch_rate_scale: metrics.stretch_rate.scale,
            stretch_rate_offset: metrics.stretch_rate.offset,
        }
    }

    /// `(scale, offset)` for one metric.
    pub fn line(&self, metric: TrackedMetric) -> (f64, f64) {
        match metric {
            TrackedMetric::PelvisVelocity => (self.pelvis_velocity_scale, self.pelvis_velocity_offset),
            TrackedMetric::TorsoVelocity => (self.torso_velocity_scale, self.torso_velocity_offset),
            TrackedMetric::XFactor => (self.x_factor_scale, self.x_factor_offset),
            TrackedMetric::StretchRate => (self.stretch_rate_scale, self.stretch_rate_offset),
        }
    }

    #[inline]
    pub fn apply(&self, metric: TrackedMetric, value: f64) -> f64 {
        let (scale, offset) = self.line(metric);
        value * scale + offset
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Immutable output of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationModel {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub sample_count: usize,
    pub metrics: CalibrationMetrics,
    /// n-weighted mean R² across metrics
    #[serde(rename = "overallR2")]
    pub overall_r2: f64,
    /// n-weighted mean MAE across metrics
    #[serde(rename = "overallMAE", with = "infinite_as_null")]
    pub overall_mae: f64,
    pub coefficients: CalibrationCoefficients,
}

impl CalibrationModel {
    /// Trained on fewer pairs than recommended.
    pub fn is_low_sample(&self) -> bool {
        self.sample_count < LOW_SAMPLE_COUNT
    }
}

/// Model → pretty JSON (ISO-8601 `trainedAt`).
pub fn serialize_model(model: &CalibrationModel) -> Result<String, CalibrationError> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// JSON → model, re-hydrating `trainedAt` into a `DateTime<Utc>`.
pub fn deserialize_model(json: &str) -> Result<CalibrationModel, CalibrationError> {
    let model: CalibrationModel = serde_json::from_str(json)?;
    log::debug!("Loaded calibration {} ({} pairs)", model.version, model.sample_count);
    Ok(model)
}
