//! Advisory checks on a training dataset before it is used for training.
//!
//! Never fails. Issues are reported; once a dataset holds enough pairs it is
//! considered usable regardless of them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::LOW_SAMPLE_COUNT;
use super::trainer::TrainingDataset;

/// Pair count at which a dataset is valid regardless of issues.
pub const RECOMMENDED_SAMPLE_COUNT: usize = 30;
/// Minimum distinct players before the dataset stops looking single-subject.
pub const MIN_PLAYER_COUNT: usize = 3;
/// Outlier cut-off in population standard deviations.
pub const OUTLIER_SIGMA: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetIssue {
    LowSampleCount {
        count: usize,
        recommended: usize,
    },
    /// Indices of pairs whose estimated pelvis velocity is > 3σ from the mean
    PelvisOutliers {
        indices: Vec<usize>,
        mean: f64,
        std_dev: f64,
    },
    LowPlayerDiversity {
        players: usize,
        required: usize,
    },
}

impl DatasetIssue {
    pub fn message(&self) -> String {
        match self {
            DatasetIssue::LowSampleCount { count, recommended } => format!(
                "Only {} training pairs; at least {} recommended",
                count, recommended
            ),
            DatasetIssue::PelvisOutliers { indices, mean, std_dev } => format!(
                "{} pelvis velocity outlier(s) beyond {}σ of {:.0} ± {:.0} deg/s",
                indices.len(),
                OUTLIER_SIGMA,
                mean,
                std_dev
            ),
            DatasetIssue::LowPlayerDiversity { players, required } => format!(
                "Only {} distinct player(s); at least {} needed to avoid overfitting one movement pattern",
                players, required
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetValidation {
    pub is_valid: bool,
    pub issues: Vec<DatasetIssue>,
}

impl DatasetValidation {
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(DatasetIssue::message).collect()
    }
}

fn pelvis_outliers(dataset: &TrainingDataset) -> Option<DatasetIssue> {
    let values: Vec<f64> = dataset.pairs.iter().map(|p| p.estimate.pelvis_velocity).collect();
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    if std_dev == 0.0 {
        return None;
    }

    let indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| (**v - mean).abs() > OUTLIER_SIGMA * std_dev)
        .map(|(i, _)| i)
        .collect();

    (!indices.is_empty()).then_some(DatasetIssue::PelvisOutliers { indices, mean, std_dev })
}

/// Run the advisory checks.
pub fn validate_dataset(dataset: &TrainingDataset) -> DatasetValidation {
    let mut issues = Vec::new();

    if dataset.len() < LOW_SAMPLE_COUNT {
        issues.push(DatasetIssue::LowSampleCount {
            count: dataset.len(),
            recommended: RECOMMENDED_SAMPLE_COUNT,
        });
    }

    if let Some(outliers) = pelvis_outliers(dataset) {
        issues.push(outliers);
    }

    let players: HashSet<&str> = dataset.pairs.iter().map(|p| p.player_id.as_str()).collect();
    if players.len() < MIN_PLAYER_COUNT {
        issues.push(DatasetIssue::LowPlayerDiversity {
            players: players.len(),
            required: MIN_PLAYER_COUNT,
        });
    }

    let is_valid = issues.is_empty() || dataset.len() >= RECOMMENDED_SAMPLE_COUNT;
    for issue in &issues {
        log::warn!("Dataset issue: {}", issue.message());
    }

    DatasetValidation { is_valid, issues }
}
