//! # Unified 4B Input
//!
//! Merges body metrics (calibrated and/or raw video) with bat-sensor metrics
//! into a single scoring record. Every field always holds a usable value;
//! `sources` records where each one came from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::source::{resolve_metric, resolve_metric_or, MetricSource, ResolvedMetric};
use crate::swing::{FourBBodyInputs, SequencingQuality};

/// Reference constants for the efficiency ratios and neutral placeholders.
///
/// The reference values are heuristic elite-level figures, kept overridable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// deg/s
    pub reference_pelvis_velocity: f64,
    /// deg/s
    pub reference_torso_velocity: f64,
    /// mph
    pub reference_bat_speed: f64,
    /// Timing CV used when the sensor does not report one (15 = average)
    pub default_timing_cv: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            reference_pelvis_velocity: 750.0,
            reference_torso_velocity: 900.0,
            reference_bat_speed: 70.0,
            default_timing_cv: 15.0,
        }
    }
}

/// Body-side metrics; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyMetricsBundle {
    pub pelvis_velocity: Option<f64>,
    pub torso_velocity: Option<f64>,
    pub x_factor: Option<f64>,
    pub stretch_rate: Option<f64>,
    pub tp_ratio: Option<f64>,
    pub consistency_cv: Option<f64>,
    pub sequencing_quality: Option<SequencingQuality>,
}

impl From<&FourBBodyInputs> for BodyMetricsBundle {
    fn from(inputs: &FourBBodyInputs) -> Self {
        Self {
            pelvis_velocity: Some(inputs.pelvis_velocity),
            torso_velocity: Some(inputs.torso_velocity),
            x_factor: Some(inputs.x_factor),
            stretch_rate: Some(inputs.stretch_rate),
            tp_ratio: Some(inputs.tp_ratio),
            consistency_cv: Some(inputs.consistency_cv),
            sequencing_quality: Some(inputs.sequencing_quality),
        }
    }
}

/// Externally supplied bat-sensor metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatSensorMetrics {
    pub bat_speed_mph: Option<f64>,
    pub attack_angle_deg: Option<f64>,
    pub attack_direction_deg: Option<f64>,
    pub hand_to_bat_ratio: Option<f64>,
    /// Swing-to-swing timing variability (%)
    pub timing_cv: Option<f64>,
}

/// Named fields of the fused record, used as rule keys and audit keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusedMetric {
    PelvisVelocity,
    TorsoVelocity,
    XFactor,
    StretchRate,
    TpRatio,
    ConsistencyCv,
    BatSpeedMph,
    AttackAngleDeg,
    AttackDirectionDeg,
    HandToBatRatio,
    TimingCv,
    BodyToBatEfficiency,
    TorsoToBatEfficiency,
}

impl FusedMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusedMetric::PelvisVelocity => "pelvis_velocity",
            FusedMetric::TorsoVelocity => "torso_velocity",
            FusedMetric::XFactor => "x_factor",
            FusedMetric::StretchRate => "stretch_rate",
            FusedMetric::TpRatio => "tp_ratio",
            FusedMetric::ConsistencyCv => "consistency_cv",
            FusedMetric::BatSpeedMph => "bat_speed_mph",
            FusedMetric::AttackAngleDeg => "attack_angle_deg",
            FusedMetric::AttackDirectionDeg => "attack_direction_deg",
            FusedMetric::HandToBatRatio => "hand_to_bat_ratio",
            FusedMetric::TimingCv => "timing_cv",
            FusedMetric::BodyToBatEfficiency => "body_to_bat_efficiency",
            FusedMetric::TorsoToBatEfficiency => "torso_to_bat_efficiency",
        }
    }
}

/// Fused scoring record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedFourBInputs {
    pub pelvis_velocity: f64,
    pub torso_velocity: f64,
    pub x_factor: f64,
    pub stretch_rate: f64,
    pub tp_ratio: f64,
    pub consistency_cv: f64,
    pub sequencing_quality: Option<SequencingQuality>,
    pub bat_speed_mph: f64,
    pub attack_angle_deg: f64,
    pub attack_direction_deg: f64,
    pub hand_to_bat_ratio: f64,
    pub timing_cv: f64,
    pub has_video_data: bool,
    pub has_sensor_data: bool,
    /// (bat / ref bat) / (pelvis / ref pelvis); both sides present and nonzero
    pub body_to_bat_efficiency: Option<f64>,
    /// (bat / ref bat) / (torso / ref torso); both sides present and nonzero
    pub torso_to_bat_efficiency: Option<f64>,
    pub sources: BTreeMap<FusedMetric, MetricSource>,
}

impl UnifiedFourBInputs {
    /// Measured value of a field; `None` when it holds a placeholder.
    pub fn metric(&self, metric: FusedMetric) -> Option<f64> {
        let value = match metric {
            FusedMetric::BodyToBatEfficiency => return self.body_to_bat_efficiency,
            FusedMetric::TorsoToBatEfficiency => return self.torso_to_bat_efficiency,
            FusedMetric::PelvisVelocity => self.pelvis_velocity,
            FusedMetric::TorsoVelocity => self.torso_velocity,
            FusedMetric::XFactor => self.x_factor,
            FusedMetric::StretchRate => self.stretch_rate,
            FusedMetric::TpRatio => self.tp_ratio,
            FusedMetric::ConsistencyCv => self.consistency_cv,
            FusedMetric::BatSpeedMph => self.bat_speed_mph,
            FusedMetric::AttackAngleDeg => self.attack_angle_deg,
            FusedMetric::AttackDirectionDeg => self.attack_direction_deg,
            FusedMetric::HandToBatRatio => self.hand_to_bat_ratio,
            FusedMetric::TimingCv => self.timing_cv,
        };
        match self.sources.get(&metric) {
            Some(MetricSource::Default) | None => None,
            Some(_) => Some(value),
        }
    }

    pub fn source(&self, metric: FusedMetric) -> Option<MetricSource> {
        self.sources.get(&metric).copied()
    }
}

/// Builder for [`UnifiedFourBInputs`].
#[derive(Debug, Default)]
pub struct UnifiedInputBuilder {
    calibrated: Option<BodyMetricsBundle>,
    raw: Option<BodyMetricsBundle>,
    sensor: Option<BatSensorMetrics>,
    config: FusionConfig,
}

impl UnifiedInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: FusionConfig) -> Self {
        self.config = config;
        self
    }

    /// Preferred body source.
    pub fn with_calibrated_body(mut self, body: BodyMetricsBundle) -> Self {
        self.calibrated = Some(body);
        self
    }

    /// Fallback body source for fields the calibrated bundle lacks.
    pub fn with_raw_body(mut self, body: BodyMetricsBundle) -> Self {
        self.raw = Some(body);
        self
    }

    pub fn with_sensor(mut self, sensor: BatSensorMetrics) -> Self {
        self.sensor = Some(sensor);
        self
    }

    fn body_candidates(
        &self,
        field: impl Fn(&BodyMetricsBundle) -> Option<f64>,
    ) -> [(MetricSource, Option<f64>); 2] {
        [
            (MetricSource::CalibratedVideo, self.calibrated.as_ref().and_then(&field)),
            (MetricSource::RawVideo, self.raw.as_ref().and_then(&field)),
        ]
    }

    fn sensor_candidate(
        &self,
        field: impl Fn(&BatSensorMetrics) -> Option<f64>,
    ) -> [(MetricSource, Option<f64>); 1] {
        [(MetricSource::Sensor, self.sensor.as_ref().and_then(field))]
    }

    pub fn build(self) -> UnifiedFourBInputs {
        let mut sources = BTreeMap::new();
        let mut take = |metric: FusedMetric, resolved: ResolvedMetric| {
            sources.insert(metric, resolved.source);
            resolved.value
        };

        let pelvis = resolve_metric(&self.body_candidates(|b| b.pelvis_velocity));
        let torso = resolve_metric(&self.body_candidates(|b| b.torso_velocity));
        let bat = resolve_metric(&self.sensor_candidate(|s| s.bat_speed_mph));

        let has_video_data = pelvis.is_some();
        let has_sensor_data = bat.is_some();

        let body_to_bat_efficiency = efficiency(
            bat.map(|r| r.value),
            pelvis.map(|r| r.value),
            self.config.reference_bat_speed,
            self.config.reference_pelvis_velocity,
        );
        let torso_to_bat_efficiency = efficiency(
            bat.map(|r| r.value),
            torso.map(|r| r.value),
            self.config.reference_bat_speed,
            self.config.reference_torso_velocity,
        );

        let neutral = |resolved: Option<ResolvedMetric>, default: f64| {
            resolved.unwrap_or(ResolvedMetric { value: default, source: MetricSource::Default })
        };

        let pelvis_velocity = take(FusedMetric::PelvisVelocity, neutral(pelvis, 0.0));
        let torso_velocity = take(FusedMetric::TorsoVelocity, neutral(torso, 0.0));
        let x_factor = take(
            FusedMetric::XFactor,
            resolve_metric_or(&self.body_candidates(|b| b.x_factor), 0.0),
        );
        let stretch_rate = take(
            FusedMetric::StretchRate,
            resolve_metric_or(&self.body_candidates(|b| b.stretch_rate), 0.0),
        );
        let tp_ratio = take(
            FusedMetric::TpRatio,
            resolve_metric_or(&self.body_candidates(|b| b.tp_ratio), 1.0),
        );
        let consistency_cv = take(
            FusedMetric::ConsistencyCv,
            resolve_metric_or(&self.body_candidates(|b| b.consistency_cv), 0.0),
        );
        let bat_speed_mph = take(FusedMetric::BatSpeedMph, neutral(bat, 0.0));
        let attack_angle_deg = take(
            FusedMetric::AttackAngleDeg,
            resolve_metric_or(&self.sensor_candidate(|s| s.attack_angle_deg), 0.0),
        );
        let attack_direction_deg = take(
            FusedMetric::AttackDirectionDeg,
            resolve_metric_or(&self.sensor_candidate(|s| s.attack_direction_deg), 0.0),
        );
        let hand_to_bat_ratio = take(
            FusedMetric::HandToBatRatio,
            resolve_metric_or(&self.sensor_candidate(|s| s.hand_to_bat_ratio), 0.0),
        );
        let timing_cv = take(
            FusedMetric::TimingCv,
            resolve_metric_or(
                &self.sensor_candidate(|s| s.timing_cv),
                self.config.default_timing_cv,
            ),
        );

        let sequencing_quality = self
            .calibrated
            .as_ref()
            .and_then(|b| b.sequencing_quality)
            .or_else(|| self.raw.as_ref().and_then(|b| b.sequencing_quality));

        if body_to_bat_efficiency.is_some() {
            sources.insert(FusedMetric::BodyToBatEfficiency, MetricSource::Sensor);
        }
        if torso_to_bat_efficiency.is_some() {
            sources.insert(FusedMetric::TorsoToBatEfficiency, MetricSource::Sensor);
        }

        log::debug!(
            "Fused 4B inputs: video={} sensor={} efficiency={:?}",
            has_video_data,
            has_sensor_data,
            body_to_bat_efficiency
        );

        UnifiedFourBInputs {
            pelvis_velocity,
            torso_velocity,
            x_factor,
            stretch_rate,
            tp_ratio,
            consistency_cv,
            sequencing_quality,
            bat_speed_mph,
            attack_angle_deg,
            attack_direction_deg,
            hand_to_bat_ratio,
            timing_cv,
            has_video_data,
            has_sensor_data,
            body_to_bat_efficiency,
            torso_to_bat_efficiency,
            sources,
        }
    }
}

/// Normalized bat speed over normalized body velocity.
fn efficiency(bat: Option<f64>, body: Option<f64>, ref_bat: f64, ref_body: f64) -> Option<f64> {
    let (bat, body) = (bat?, body?);
    if bat == 0.0 || body == 0.0 || ref_bat == 0.0 || ref_body == 0.0 {
        return None;
    }
    Some((bat / ref_bat) / (body / ref_body))
}
