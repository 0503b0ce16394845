//! # Swing Module
//!
//! Swing event detection and kinetic-chain analysis.
//!
//! - `window` - Start/stride/contact/end detection over the velocity stream
//! - `sequencing` - Peak extraction and sequencing quality rules
//! - `analyzer` - Full pipeline from pose frames to `BodyAnalysisResult`

pub mod analyzer;
pub mod sequencing;
pub mod window;

pub use analyzer::{analyze_swing, round_to, BodyAnalysisResult, FourBBodyInputs};
pub use sequencing::{
    classify_sequencing, compute_peak_metrics, consistency_cv, default_sequencing_rules,
    PeakMetrics, SequencingQuality, SequencingRule,
};
pub use window::{detect_swing_window, SwingWindow};
