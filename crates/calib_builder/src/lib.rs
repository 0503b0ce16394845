//! Calibration Builder Library
//!
//! File-level batch jobs around `swing_core`:
//! training dataset JSON → validated, trained calibration model JSON,
//! pose frames JSON → (calibrated) body analysis JSON,
//! body + sensor JSON → unified 4B input and motor profile.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use swing_core::calibration::{train_calibration, validate_dataset, DatasetValidation};
use swing_core::fusion::{
    classify_motor_profile, BatSensorMetrics, BodyMetricsBundle, MotorProfileConfig,
    MotorProfileResult, UnifiedFourBInputs, UnifiedInputBuilder,
};
use swing_core::synthetic::SyntheticSwing;
use swing_core::{
    analyze_swing, apply_calibration, deserialize_model, serialize_model, AnalysisConfig,
    BodyAnalysisResult, CalibrationCoefficients, CalibrationModel, PoseFrame, TrainingDataset,
};

/// Result of a training job.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: CalibrationModel,
    pub validation: DatasetValidation,
}

/// Fused record and its motor profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileReport {
    pub unified: UnifiedFourBInputs,
    pub profile: MotorProfileResult,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse {} JSON: {}", what, path.display()))
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    write_text(path, &json)
}

/// Load a training dataset (`{"pairs": [...]}`).
pub fn load_dataset(path: &Path) -> Result<TrainingDataset> {
    read_json(path, "dataset")
}

/// Run the advisory dataset checks.
pub fn validate_file(dataset_path: &Path) -> Result<DatasetValidation> {
    let dataset = load_dataset(dataset_path)?;
    Ok(validate_dataset(&dataset))
}

/// Validate, train and write the model JSON.
///
/// Validation issues are reported, not fatal; training itself fails only when
/// the dataset holds fewer than 3 pairs.
pub fn train_from_file(dataset_path: &Path, out: &Path, version: &str) -> Result<TrainOutcome> {
    let dataset = load_dataset(dataset_path)?;
    let validation = validate_dataset(&dataset);

    let model = train_calibration(&dataset, version)
        .with_context(|| format!("Failed to train calibration from {}", dataset_path.display()))?;

    let json = serialize_model(&model).context("Failed to serialize calibration model")?;
    write_text(out, &json)?;
    log::info!("Wrote calibration {} to {}", model.version, out.display());

    Ok(TrainOutcome { model, validation })
}

/// Read coefficients from either a full model file or a bare coefficients file.
pub fn load_coefficients(path: &Path) -> Result<CalibrationCoefficients> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read calibration file: {}", path.display()))?;

    let value: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse calibration JSON: {}", path.display()))?;

    if value.get("coefficients").is_some() {
        let model = deserialize_model(&json)
            .with_context(|| format!("Invalid calibration model: {}", path.display()))?;
        log::info!("Using calibration {} trained {}", model.version, model.trained_at);
        return Ok(model.coefficients);
    }
    serde_json::from_value(value)
        .with_context(|| format!("Invalid calibration coefficients: {}", path.display()))
}

/// Analyze a pose-frame file, optionally calibrating and writing the result.
pub fn analyze_file(
    frames_path: &Path,
    frame_rate: f64,
    calibration: Option<&Path>,
    out: Option<&Path>,
) -> Result<BodyAnalysisResult> {
    let frames: Vec<PoseFrame> = read_json(frames_path, "pose frames")?;
    let config = AnalysisConfig::from_env_or_default();

    let mut result = analyze_swing(&frames, frame_rate, &config)
        .with_context(|| format!("Failed to analyze {}", frames_path.display()))?;

    if let Some(calibration_path) = calibration {
        let coefficients = load_coefficients(calibration_path)?;
        result = apply_calibration(&result, &coefficients);
    }

    if let Some(out) = out {
        write_json(out, &result)?;
    }
    Ok(result)
}

/// Fuse body and/or sensor metrics and classify the motor profile.
pub fn profile_files(body: Option<&Path>, sensor: Option<&Path>) -> Result<ProfileReport> {
    if body.is_none() && sensor.is_none() {
        bail!("Need at least one of a body metrics file or a sensor metrics file");
    }

    let mut builder = UnifiedInputBuilder::new();
    if let Some(path) = body {
        let bundle: BodyMetricsBundle = read_json(path, "body metrics")?;
        builder = builder.with_calibrated_body(bundle);
    }
    if let Some(path) = sensor {
        let metrics: BatSensorMetrics = read_json(path, "sensor metrics")?;
        builder = builder.with_sensor(metrics);
    }

    let unified = builder.build();
    let profile = classify_motor_profile(&unified, &MotorProfileConfig::default());
    Ok(ProfileReport { unified, profile })
}

/// Write a synthetic clean-swing clip for smoke-testing the pipeline.
pub fn write_synthetic_frames(out: &Path, frame_rate: f64, frame_count: usize) -> Result<usize> {
    let frames = SyntheticSwing::clean()
        .with_frame_count(frame_count)
        .render(frame_rate);
    write_json(out, &frames)?;
    Ok(frames.len())
}
