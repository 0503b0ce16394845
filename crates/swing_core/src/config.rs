//! Centralized Analysis Configuration
//!
//! Every tuning constant of the body analysis pipeline lives here instead of
//! inline in the algorithms. Defaults reproduce the reference thresholds.
//!
//! ## Usage
//!
//! ```rust
//! use swing_core::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::default();
//! assert_eq!(config.window.start_threshold_dps, 200.0);
//!
//! let yaml = "window:\n  start_threshold_dps: 150.0\n";
//! let tuned = AnalysisConfig::from_yaml_str(yaml).unwrap();
//! assert_eq!(tuned.window.start_threshold_dps, 150.0);
//! assert_eq!(tuned.window.max_window_frames, 60);
//! ```
//!
//! ## Environment Variables
//!
//! - `SWING_ANALYSIS_CONFIG`: path to a YAML file overriding the defaults

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

use crate::error::Result;
use crate::swing::sequencing::{default_sequencing_rules, SequencingRule};

pub const CONFIG_PATH_ENV: &str = "SWING_ANALYSIS_CONFIG";

/// Comparison against a fixed threshold, used by the rule tables.
///
/// In YAML a threshold is written as `{ op: above, value: 2.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "value")]
pub enum Threshold {
    /// value > t
    Above(f64),
    /// value >= t
    AtLeast(f64),
    /// value < t
    Below(f64),
    /// value <= t
    AtMost(f64),
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Threshold::Above(t) => value > t,
            Threshold::AtLeast(t) => value >= t,
            Threshold::Below(t) => value < t,
            Threshold::AtMost(t) => value <= t,
        }
    }

    /// Short operator form for evidence strings.
    pub fn describe(&self) -> String {
        match *self {
            Threshold::Above(t) => format!("> {}", t),
            Threshold::AtLeast(t) => format!(">= {}", t),
            Threshold::Below(t) => format!("< {}", t),
            Threshold::AtMost(t) => format!("<= {}", t),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub rotation: RotationConfig,
    pub velocity: VelocityConfig,
    pub window: SwingWindowConfig,
    pub sequencing: SequencingConfig,
}

impl AnalysisConfig {
    /// Parse a (possibly partial) YAML document; missing keys keep defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from the file named by `SWING_ANALYSIS_CONFIG`, or use default
    pub fn from_env_or_default() -> Self {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(yaml) => match Self::from_yaml_str(&yaml) {
                Ok(config) => {
                    log::info!("Loaded analysis config from {}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring invalid analysis config {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read analysis config {}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Rotation frame thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Minimum visibility for a landmark pair to yield an angle (0.0 - 1.0)
    pub min_visibility: f64,
    /// Minimum mean hip/shoulder visibility for a frame to be valid (0.0 - 1.0)
    pub min_confidence: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            min_confidence: 0.5,
        }
    }
}

/// Velocity engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    /// Symmetric moving-average window (frames, odd)
    pub smoothing_window: usize,
    /// Wrap angle deltas into (-180, 180] before differentiating
    pub wrap_angles: bool,
    /// Also emit a zero record when either neighbour of a valid frame is invalid
    pub zero_invalid_neighbours: bool,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 3,
            wrap_angles: true,
            zero_invalid_neighbours: false,
        }
    }
}

/// Swing window detector thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingWindowConfig {
    /// Pelvis velocity that marks swing start (deg/s)
    pub start_threshold_dps: f64,
    /// Frames after start searched for the contact peak
    pub max_window_frames: usize,
    /// Minimum start-to-contact distance (frames)
    pub min_duration_frames: usize,
    /// Frames of follow-through after contact
    pub follow_through_frames: usize,
    /// Stride position as a fraction of start-to-contact
    pub stride_fraction: f64,
}

impl Default for SwingWindowConfig {
    fn default() -> Self {
        Self {
            start_threshold_dps: 200.0,
            max_window_frames: 60,
            min_duration_frames: 10,
            follow_through_frames: 10,
            stride_fraction: 0.35,
        }
    }
}

/// Sequencing classification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencingConfig {
    /// Ordered rule table; first match wins, no match is `poor`
    pub rules: Vec<SequencingRule>,
    /// Pelvis velocities at or below this are excluded from the CV (deg/s)
    pub cv_noise_floor_dps: f64,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            rules: default_sequencing_rules(),
            cv_noise_floor_dps: 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swing::sequencing::SequencingQuality;

    #[test]
    fn test_threshold_matches() {
        assert!(Threshold::Above(2.0).matches(2.5));
        assert!(!Threshold::Above(2.0).matches(2.0));
        assert!(Threshold::AtLeast(0.9).matches(0.9));
        assert!(Threshold::Below(10.0).matches(9.99));
        assert!(Threshold::AtMost(10.0).matches(10.0));
        assert_eq!(Threshold::AtLeast(0.9).describe(), ">= 0.9");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "rotation:\n  min_visibility: 0.6\nvelocity:\n  smoothing_window: 5\n";
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.rotation.min_visibility, 0.6);
        assert_eq!(config.rotation.min_confidence, 0.5);
        assert_eq!(config.velocity.smoothing_window, 5);
        assert_eq!(config.window, SwingWindowConfig::default());
        assert_eq!(config.sequencing.rules.len(), 2);
    }

    #[test]
    fn test_yaml_rule_table_override() {
        let yaml = r#"
sequencing:
  rules:
    - quality: good
      min_gap: { op: at_least, value: 1.0 }
      min_ratio:
        op: above
        value: 1.1
"#;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.sequencing.rules.len(), 1);
        assert_eq!(config.sequencing.rules[0].quality, SequencingQuality::Good);
        assert_eq!(config.sequencing.rules[0].min_gap, Threshold::AtLeast(1.0));
        assert_eq!(config.sequencing.rules[0].min_ratio, Threshold::Above(1.1));
        assert_eq!(config.sequencing.cv_noise_floor_dps, 50.0);
    }

    #[test]
    fn test_threshold_yaml_shape() {
        let yaml = serde_yaml::to_string(&Threshold::Below(10.0)).unwrap();
        assert!(yaml.contains("op: below"), "{}", yaml);
        assert!(yaml.contains("value: 10.0"), "{}", yaml);

        let parsed: Threshold = serde_yaml::from_str("op: at_most\nvalue: 3\n").unwrap();
        assert_eq!(parsed, Threshold::AtMost(3.0));
        assert!(serde_yaml::from_str::<Threshold>("op: roughly\nvalue: 3\n").is_err());
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = AnalysisConfig::from_yaml_str("window: [1, 2").unwrap_err();
        assert!(err.to_string().starts_with("Config error"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnalysisConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(AnalysisConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
