//! # Fusion
//!
//! Body metrics + bat-sensor metrics → unified 4B input → motor profile.
//!
//! - `source`: priority-ordered lookup with source audit
//! - `unified`: [`UnifiedInputBuilder`] and the fused record
//! - `motor_profile`: rule-table archetype classifier

pub mod motor_profile;
pub mod source;
pub mod unified;

pub use motor_profile::{
    classify_motor_profile, default_motor_profile_rules, MotorProfile, MotorProfileConfig,
    MotorProfileResult, MotorProfileRule,
};
pub use source::{resolve_metric, resolve_metric_or, MetricSource, ResolvedMetric};
pub use unified::{
    BatSensorMetrics, BodyMetricsBundle, FusedMetric, FusionConfig, UnifiedFourBInputs,
    UnifiedInputBuilder,
};
