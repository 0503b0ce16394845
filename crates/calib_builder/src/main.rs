//! Calibration Builder CLI
//!
//! Offline batch jobs: train / validate calibration datasets, analyze pose
//! frame files, fuse and profile metrics, render synthetic clips.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "calib_builder")]
#[command(about = "Train swing calibration models and run offline analyses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Train a calibration model from a paired dataset
    Train {
        /// Training dataset JSON ({"pairs": [...]})
        #[arg(long)]
        dataset: PathBuf,

        /// Output model JSON file path
        #[arg(long)]
        out: PathBuf,

        /// Model version tag
        #[arg(long, default_value = "v1")]
        model_version: String,
    },

    /// Check a dataset for size, outliers and player diversity
    Validate {
        /// Training dataset JSON
        #[arg(long)]
        dataset: PathBuf,
    },

    /// Analyze a pose-frame JSON file
    Analyze {
        /// Pose frames JSON (array of frames)
        #[arg(long)]
        frames: PathBuf,

        /// Capture frame rate (frames/second)
        #[arg(long)]
        fps: f64,

        /// Calibration model or coefficients JSON
        #[arg(long)]
        calibration: Option<PathBuf>,

        /// Write the full analysis result JSON here
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fuse body and sensor metrics and classify the motor profile
    Profile {
        /// Body metrics JSON (4B body inputs)
        #[arg(long)]
        body: Option<PathBuf>,

        /// Bat sensor metrics JSON
        #[arg(long)]
        sensor: Option<PathBuf>,
    },

    /// Render a synthetic clean swing as pose frames
    Synth {
        /// Output pose frames JSON
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "30")]
        fps: f64,

        #[arg(long, default_value = "90")]
        frames: usize,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            dataset,
            out,
            model_version,
        } => {
            println!("🔨 Training calibration...");
            println!("   Dataset: {}", dataset.display());
            println!("   Output:  {}", out.display());
            println!("   Version: {}", model_version);

            let outcome = calib_builder::train_from_file(&dataset, &out, &model_version)?;
            print_validation(&outcome.validation);
            print_model(&outcome.model);
        }

        Commands::Validate { dataset } => {
            println!("🔍 Validating dataset {}...", dataset.display());
            let validation = calib_builder::validate_file(&dataset)?;
            print_validation(&validation);
            if !validation.is_valid {
                anyhow::bail!("❌ Dataset is not usable for training yet");
            }
        }

        Commands::Analyze {
            frames,
            fps,
            calibration,
            out,
        } => {
            println!("🔨 Analyzing {} at {} fps...", frames.display(), fps);
            let result = calib_builder::analyze_file(
                &frames,
                fps,
                calibration.as_deref(),
                out.as_deref(),
            )?;

            println!("\n✅ {}", result.summary());
            println!("   4B inputs: {}", serde_json::to_string(&result.four_b)?);
            if let Some(out) = out {
                println!("\n📄 Result saved to: {}", out.display());
            }
        }

        Commands::Profile { body, sensor } => {
            let report = calib_builder::profile_files(body.as_deref(), sensor.as_deref())?;
            println!(
                "🧬 Motor profile: {} (confidence {:.0})",
                report.profile.primary.as_str(),
                report.profile.confidence
            );
            for line in &report.profile.evidence {
                println!("   - {}", line);
            }
            if let Some(efficiency) = report.unified.body_to_bat_efficiency {
                println!("   Body→bat efficiency: {:.2}", efficiency);
            }
        }

        Commands::Synth { out, fps, frames } => {
            let count = calib_builder::write_synthetic_frames(&out, fps, frames)?;
            println!("✅ Wrote {} synthetic frames to {}", count, out.display());
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_validation(validation: &swing_core::DatasetValidation) {
    if validation.issues.is_empty() {
        println!("\n✅ Dataset checks passed");
        return;
    }
    println!("\n⚠️  Dataset issues (usable: {}):", validation.is_valid);
    for message in validation.messages() {
        println!("   - {}", message);
    }
}

#[cfg(feature = "cli")]
fn print_model(model: &swing_core::CalibrationModel) {
    println!("\n✅ Calibration trained!");
    println!("   Samples:     {}{}", model.sample_count, if model.is_low_sample() { " (low)" } else { "" });
    println!("   Overall R²:  {:.3}", model.overall_r2);
    println!("   Overall MAE: {:.2}", model.overall_mae);
    for metric in swing_core::calibration::TrackedMetric::ALL {
        let fit = model.metrics.get(metric);
        println!(
            "   {:<16} y = {:.4}x {:+.2}  (r2 {:.3}, n {})",
            metric.name(),
            fit.scale,
            fit.offset,
            fit.r2,
            fit.n
        );
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("calib_builder CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
