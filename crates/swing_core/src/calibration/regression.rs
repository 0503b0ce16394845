//! # Per-Metric Linear Regression
//!
//! Fits `y = a·x + b` mapping a cheap 2D estimate (`x`) onto a ground-truth
//! measurement (`y`).
//!
//! ## Algorithm
//! 1. Fewer than 3 total pairs: caller error
//! 2. Keep pairs where both sides are > 0 (zero/negative = unmeasured)
//! 3. Fewer than 3 valid pairs: identity with r2 = 0, mae = ∞, mape = 100
//! 4. Otherwise ordinary least squares via the 2×2 normal equations

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Minimum number of pairs for a regression call and for a real fit.
pub const MIN_REGRESSION_PAIRS: usize = 3;

/// Fit result for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// a in y = a·x + b
    pub scale: f64,
    /// b in y = a·x + b
    pub offset: f64,
    /// Coefficient of determination (0 when not fitted)
    pub r2: f64,
    /// Mean absolute error; +∞ when not fitted (JSON `null`)
    #[serde(with = "infinite_as_null")]
    pub mae: f64,
    /// Mean absolute percentage error (0 - 100+)
    pub mape: f64,
    /// Valid pairs used
    pub n: usize,
}

impl RegressionResult {
    /// Identity mapping reported when there is not enough valid data.
    pub fn identity(n: usize) -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            r2: 0.0,
            mae: f64::INFINITY,
            mape: 100.0,
            n,
        }
    }

    /// Whether `scale`/`offset` come from an actual fit.
    pub fn is_fitted(&self) -> bool {
        self.n >= MIN_REGRESSION_PAIRS && self.mae.is_finite()
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.scale * x + self.offset
    }
}

/// Serialize non-finite values as `null`, read `null` back as +∞.
pub(crate) mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Solve the normal equations for (a, b).
///
/// A constant `x` makes the system singular; the fit then degrades to a pure
/// shift (`a = 1`, `b = mean(y) - mean(x)`).
fn fit_least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let sx: f64 = xs.iter().sum();
    let sy: f64 = ys.iter().sum();
    let sxx: f64 = xs.iter().map(|x| x * x).sum();
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

    let mean_x = sx / n;
    let var_x = sxx / n - mean_x * mean_x;
    if var_x <= 1e-12 * mean_x.abs().max(1.0).powi(2) {
        log::debug!("Singular regression (constant estimate {:.3}); using offset only", mean_x);
        return (1.0, sy / n - mean_x);
    }

    let normal = Matrix2::new(sxx, sx, sx, n);
    let rhs = Vector2::new(sxy, sy);
    match normal.lu().solve(&rhs) {
        Some(solution) => (solution[0], solution[1]),
        None => (1.0, sy / n - mean_x),
    }
}

/// Fit one metric from `(estimate, ground_truth)` pairs.
///
/// # Errors
/// `InsufficientPairs` when fewer than 3 pairs are provided in total. Too
/// few *valid* pairs is not an error; the identity result is returned.
pub fn train_metric(pairs: &[(f64, f64)]) -> Result<RegressionResult, CalibrationError> {
    if pairs.len() < MIN_REGRESSION_PAIRS {
        return Err(CalibrationError::InsufficientPairs {
            found: pairs.len(),
            required: MIN_REGRESSION_PAIRS,
        });
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs
        .iter()
        .filter(|(x, y)| *x > 0.0 && *y > 0.0)
        .copied()
        .unzip();

    let n = xs.len();
    if n < MIN_REGRESSION_PAIRS {
        return Ok(RegressionResult::identity(n));
    }

    let (scale, offset) = fit_least_squares(&xs, &ys);
    let predict = |x: f64| scale * x + offset;

    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| (y - predict(x)).powi(2))
        .sum();
    let r2 = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    let mae = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| (predict(x) - y).abs())
        .sum::<f64>()
        / n as f64;

    let (pct_sum, pct_count) = xs
        .iter()
        .zip(&ys)
        .filter(|(_, y)| **y != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&x, &y)| {
            (sum + ((predict(x) - y) / y).abs(), count + 1)
        });
    let mape = if pct_count > 0 {
        pct_sum / pct_count as f64 * 100.0
    } else {
        0.0
    };

    Ok(RegressionResult {
        scale,
        offset,
        r2,
        mae,
        mape,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_recovers_noiseless_line() {
        let pairs: Vec<(f64, f64)> = [100.0, 200.0, 350.0, 500.0, 720.0]
            .iter()
            .map(|&x| (x, 2.0 * x + 5.0))
            .collect();
        let fit = train_metric(&pairs).unwrap();

        assert!((fit.scale - 2.0).abs() < 1e-9, "scale {}", fit.scale);
        assert!((fit.offset - 5.0).abs() < 1e-6, "offset {}", fit.offset);
        assert!((fit.r2 - 1.0).abs() < 1e-9);
        assert!(fit.mae < 1e-6);
        assert!(fit.mape < 1e-6);
        assert_eq!(fit.n, 5);
        assert!(fit.is_fitted());
    }

    #[test]
    fn test_two_valid_pairs_returns_identity() {
        let pairs = [(300.0, 420.0), (0.0, 500.0), (450.0, 610.0)];
        let fit = train_metric(&pairs).unwrap();

        assert_eq!(fit.n, 2);
        assert_eq!(fit.r2, 0.0);
        assert_eq!(fit.mae, f64::INFINITY);
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset, 0.0);
        assert_eq!(fit.mape, 100.0);
        assert!(!fit.is_fitted());
    }

    #[test]
    fn test_fewer_than_three_total_is_error() {
        let err = train_metric(&[(1.0, 2.0), (2.0, 4.0)]).unwrap_err();
        assert!(matches!(err, CalibrationError::InsufficientPairs { found: 2, required: 3 }));
        assert!(train_metric(&[]).is_err());
    }

    #[test]
    fn test_filters_non_positive_on_either_side() {
        let pairs = [
            (100.0, 210.0),
            (200.0, 410.0),
            (300.0, 610.0),
            (400.0, 0.0),
            (-5.0, 300.0),
        ];
        let fit = train_metric(&pairs).unwrap();
        assert_eq!(fit.n, 3);
        assert!((fit.scale - 2.0).abs() < 1e-9);
        assert!((fit.offset - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_ground_truth_r2_zero() {
        let pairs = [(100.0, 50.0), (200.0, 50.0), (300.0, 50.0)];
        let fit = train_metric(&pairs).unwrap();
        assert_eq!(fit.r2, 0.0);
        assert!(fit.scale.abs() < 1e-9);
        assert!((fit.offset - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_constant_estimate_falls_back_to_shift() {
        let pairs = [(100.0, 120.0), (100.0, 130.0), (100.0, 140.0)];
        let fit = train_metric(&pairs).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert!((fit.offset - 30.0).abs() < 1e-9);
        assert!(fit.r2.abs() < 1e-9);
    }

    #[test]
    fn test_error_metrics_with_noise() {
        let pairs = [(100.0, 110.0), (200.0, 190.0), (300.0, 310.0), (400.0, 390.0)];
        let fit = train_metric(&pairs).unwrap();
        assert!(fit.r2 > 0.98 && fit.r2 < 1.0);
        assert!(fit.mae > 0.0 && fit.mae < 10.0);
        assert!(fit.mape > 0.0 && fit.mape < 10.0);
    }

    #[test]
    fn test_infinite_mae_round_trips_as_null() {
        let identity = RegressionResult::identity(2);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"mae\":null"));

        let back: RegressionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }

    proptest! {
        #[test]
        fn prop_recovers_any_positive_line(
            a in 0.5f64..3.0,
            b in -50.0f64..50.0,
            xs in proptest::collection::vec(200.0f64..1000.0, 5..40),
        ) {
            // Need some spread in x for a well-posed fit
            let spread = xs.iter().cloned().fold(f64::MIN, f64::max)
                - xs.iter().cloned().fold(f64::MAX, f64::min);
            prop_assume!(spread > 10.0);

            let pairs: Vec<(f64, f64)> = xs.iter().map(|&x| (x, a * x + b)).collect();
            let fit = train_metric(&pairs).unwrap();

            prop_assert!((fit.scale - a).abs() < 1e-6);
            prop_assert!((fit.offset - b).abs() < 1e-3);
            prop_assert!(fit.r2 > 0.999_999);
            prop_assert_eq!(fit.n, xs.len());
        }
    }
}
