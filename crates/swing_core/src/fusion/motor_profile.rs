//! # Motor Profile Classifier
//!
//! Heuristic archetype label for a player's power-generation pattern.
//!
//! Each rule adds points to one profile when its metric crosses a fixed
//! threshold and leaves an evidence line. Rules whose metric was not
//! measured are skipped. The highest score wins unless it is below
//! `min_score`, in which case the result is `Unknown`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::unified::{FusedMetric, UnifiedFourBInputs};
use crate::config::Threshold;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorProfile {
    /// Rotational, pelvis-driven
    Spinner,
    /// Arms and hands whip the barrel
    Whipper,
    /// Elastic hip-shoulder separation
    Slingshotter,
    /// Raw strength and speed
    Titan,
    Unknown,
}

impl MotorProfile {
    /// Scored profiles; ties resolve to the earliest.
    pub const SCORED: [MotorProfile; 4] = [
        MotorProfile::Spinner,
        MotorProfile::Whipper,
        MotorProfile::Slingshotter,
        MotorProfile::Titan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotorProfile::Spinner => "spinner",
            MotorProfile::Whipper => "whipper",
            MotorProfile::Slingshotter => "slingshotter",
            MotorProfile::Titan => "titan",
            MotorProfile::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorProfileRule {
    pub profile: MotorProfile,
    pub metric: FusedMetric,
    pub comparison: Threshold,
    pub points: f64,
    pub evidence: String,
}

impl MotorProfileRule {
    pub fn new(
        profile: MotorProfile,
        metric: FusedMetric,
        comparison: Threshold,
        points: f64,
        evidence: &str,
    ) -> Self {
        Self {
            profile,
            metric,
            comparison,
            points,
            evidence: evidence.to_string(),
        }
    }
}

pub fn default_motor_profile_rules() -> Vec<MotorProfileRule> {
    use FusedMetric::*;
    use MotorProfile::*;

    vec![
        MotorProfileRule::new(Spinner, PelvisVelocity, Threshold::Above(650.0), 30.0, "Elite pelvis rotation speed"),
        MotorProfileRule::new(Spinner, AttackAngleDeg, Threshold::Below(10.0), 20.0, "Flat, level attack angle"),
        MotorProfileRule::new(Whipper, BodyToBatEfficiency, Threshold::Above(1.1), 30.0, "Bat speed outpaces body rotation"),
        MotorProfileRule::new(Whipper, TpRatio, Threshold::Above(1.4), 20.0, "Strong torso amplification"),
        MotorProfileRule::new(Slingshotter, StretchRate, Threshold::Above(800.0), 35.0, "High hip-shoulder stretch rate"),
        MotorProfileRule::new(Slingshotter, XFactor, Threshold::Above(30.0), 25.0, "Large hip-shoulder separation"),
        MotorProfileRule::new(Titan, BatSpeedMph, Threshold::Above(72.0), 25.0, "High raw bat speed"),
        MotorProfileRule::new(Titan, TorsoVelocity, Threshold::Above(900.0), 25.0, "Powerful torso rotation"),
    ]
}

/// Classifier rule table and cut-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorProfileConfig {
    pub rules: Vec<MotorProfileRule>,
    /// Scores below this yield `Unknown`
    pub min_score: f64,
}

impl Default for MotorProfileConfig {
    fn default() -> Self {
        Self {
            rules: default_motor_profile_rules(),
            min_score: 30.0,
        }
    }
}

impl MotorProfileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorProfileResult {
    pub primary: MotorProfile,
    /// Winning score on a 0 - 100 scale
    pub confidence: f64,
    pub scores: BTreeMap<MotorProfile, f64>,
    pub evidence: Vec<String>,
}

/// Score every profile and pick the strongest.
pub fn classify_motor_profile(
    inputs: &UnifiedFourBInputs,
    config: &MotorProfileConfig,
) -> MotorProfileResult {
    let mut scores: BTreeMap<MotorProfile, f64> =
        MotorProfile::SCORED.iter().map(|&p| (p, 0.0)).collect();
    let mut evidence = Vec::new();

    for rule in &config.rules {
        let Some(value) = inputs.metric(rule.metric) else {
            continue;
        };
        if rule.comparison.matches(value) {
            *scores.entry(rule.profile).or_insert(0.0) += rule.points;
            evidence.push(format!(
                "{}: {} {:.1} {} (+{} {})",
                rule.evidence,
                rule.metric.as_str(),
                value,
                rule.comparison.describe(),
                rule.points,
                rule.profile.as_str()
            ));
        }
    }

    let (best, best_score) = MotorProfile::SCORED
        .iter()
        .map(|p| (*p, scores.get(p).copied().unwrap_or(0.0)))
        .fold((MotorProfile::Unknown, f64::MIN), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        });

    let primary = if best_score < config.min_score {
        MotorProfile::Unknown
    } else {
        best
    };

    log::debug!(
        "Motor profile: {} (score {:.0}, {} rule(s) fired)",
        primary.as_str(),
        best_score,
        evidence.len()
    );

    MotorProfileResult {
        primary,
        confidence: best_score.clamp(0.0, 100.0),
        scores,
        evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::unified::{BatSensorMetrics, BodyMetricsBundle, UnifiedInputBuilder};

    fn unified(body: Option<BodyMetricsBundle>, sensor: Option<BatSensorMetrics>) -> UnifiedFourBInputs {
        let mut builder = UnifiedInputBuilder::new();
        if let Some(body) = body {
            builder = builder.with_calibrated_body(body);
        }
        if let Some(sensor) = sensor {
            builder = builder.with_sensor(sensor);
        }
        builder.build()
    }

    #[test]
    fn test_spinner() {
        let body = BodyMetricsBundle {
            pelvis_velocity: Some(700.0),
            torso_velocity: Some(760.0),
            x_factor: Some(22.0),
            stretch_rate: Some(500.0),
            tp_ratio: Some(1.1),
            ..Default::default()
        };
        let sensor = BatSensorMetrics {
            bat_speed_mph: Some(66.0),
            attack_angle_deg: Some(6.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(Some(body), Some(sensor)), &MotorProfileConfig::default());

        assert_eq!(result.primary, MotorProfile::Spinner);
        assert_eq!(result.confidence, 50.0);
        assert_eq!(result.scores[&MotorProfile::Spinner], 50.0);
        assert_eq!(result.evidence.len(), 2);
        assert!(result.evidence[0].starts_with("Elite pelvis rotation speed: pelvis_velocity 700.0 > 650"));
    }

    #[test]
    fn test_slingshotter() {
        let body = BodyMetricsBundle {
            pelvis_velocity: Some(540.0),
            stretch_rate: Some(880.0),
            x_factor: Some(41.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(Some(body), None), &MotorProfileConfig::default());
        assert_eq!(result.primary, MotorProfile::Slingshotter);
        assert_eq!(result.confidence, 60.0);
    }

    #[test]
    fn test_weak_signal_is_unknown() {
        let body = BodyMetricsBundle {
            pelvis_velocity: Some(400.0),
            x_factor: Some(34.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(Some(body), None), &MotorProfileConfig::default());
        assert_eq!(result.primary, MotorProfile::Unknown);
        assert_eq!(result.scores[&MotorProfile::Slingshotter], 25.0);
        assert_eq!(result.confidence, 25.0);
    }

    #[test]
    fn test_absent_metrics_skipped() {
        // No sensor: attack angle placeholder 0 must not read as "flat"
        let body = BodyMetricsBundle {
            pelvis_velocity: Some(300.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(Some(body), None), &MotorProfileConfig::default());
        assert!(result.evidence.is_empty());
        assert_eq!(result.primary, MotorProfile::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.scores.len(), 4);
    }

    #[test]
    fn test_confidence_clamped() {
        let config = MotorProfileConfig {
            rules: vec![
                MotorProfileRule::new(MotorProfile::Titan, FusedMetric::BatSpeedMph, Threshold::Above(60.0), 80.0, "fast"),
                MotorProfileRule::new(MotorProfile::Titan, FusedMetric::BatSpeedMph, Threshold::Above(70.0), 80.0, "faster"),
            ],
            min_score: 30.0,
        };
        let sensor = BatSensorMetrics {
            bat_speed_mph: Some(78.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(None, Some(sensor)), &config);
        assert_eq!(result.primary, MotorProfile::Titan);
        assert_eq!(result.scores[&MotorProfile::Titan], 160.0);
        assert_eq!(result.confidence, 100.0);
    }

    #[test]
    fn test_tie_goes_to_first_profile() {
        let config = MotorProfileConfig {
            rules: vec![
                MotorProfileRule::new(MotorProfile::Titan, FusedMetric::TorsoVelocity, Threshold::Above(0.0), 40.0, "t"),
                MotorProfileRule::new(MotorProfile::Whipper, FusedMetric::PelvisVelocity, Threshold::Above(0.0), 40.0, "w"),
            ],
            min_score: 30.0,
        };
        let body = BodyMetricsBundle {
            pelvis_velocity: Some(500.0),
            torso_velocity: Some(600.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(Some(body), None), &config);
        assert_eq!(result.primary, MotorProfile::Whipper);
    }

    #[test]
    fn test_yaml_rule_table() {
        let yaml = r#"
min_score: 10.0
rules:
  - profile: titan
    metric: bat_speed_mph
    comparison: { op: at_least, value: 65.0 }
    points: 15.0
    evidence: Strong bat speed
"#;
        let config = MotorProfileConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules[0].comparison, Threshold::AtLeast(65.0));

        let sensor = BatSensorMetrics {
            bat_speed_mph: Some(65.0),
            ..Default::default()
        };
        let result = classify_motor_profile(&unified(None, Some(sensor)), &config);
        assert_eq!(result.primary, MotorProfile::Titan);
        assert_eq!(result.confidence, 15.0);
    }
}
