//! Priority-ordered metric lookup with an audit of which source won.

use serde::{Deserialize, Serialize};

/// Where a fused value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// Video estimate after calibration
    CalibratedVideo,
    /// Uncalibrated video estimate
    RawVideo,
    /// External bat sensor
    Sensor,
    /// Neutral placeholder; nothing measured
    Default,
}

/// A resolved value plus its source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    pub value: f64,
    pub source: MetricSource,
}

/// First candidate holding a finite value, in the order given.
pub fn resolve_metric(candidates: &[(MetricSource, Option<f64>)]) -> Option<ResolvedMetric> {
    candidates.iter().find_map(|&(source, value)| {
        value
            .filter(|v| v.is_finite())
            .map(|value| ResolvedMetric { value, source })
    })
}

/// Like [`resolve_metric`], falling back to `default` tagged [`MetricSource::Default`].
pub fn resolve_metric_or(candidates: &[(MetricSource, Option<f64>)], default: f64) -> ResolvedMetric {
    resolve_metric(candidates).unwrap_or(ResolvedMetric {
        value: default,
        source: MetricSource::Default,
    })
}
