use nalgebra::DVector;
use serde::Serialize;

/// Distance of a paired sample from the identity line on the [0, 1] scale.
///
///   diff  = Σ |a - b|
///   total = Σ |a + b - 1|
///   correlation                 = 1 - diff / total
///   least-absolutes correlation = (total - diff) / (total + diff)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationScore {
    diff: f64,
    total: f64,
    correlation: f64,
    least_absolutes_correlation: f64,
}

impl CorrelationScore {
    pub fn from_columns(column_0: &[f64], column_1: &[f64]) -> CorrelationScore {
        let a = DVector::from_column_slice(column_0);
        let b = DVector::from_column_slice(column_1);
        let diff = (&a - &b).abs().sum();
        let total = (&a + &b).add_scalar(-1.0).abs().sum();
        CorrelationScore::new(diff, total)
    }

    pub fn new(diff: f64, total: f64) -> CorrelationScore {
        // total == 0 means every pair sits on the anti-diagonal.
        let correlation = if total == 0.0 {
            if diff == 0.0 { 1.0 } else { f64::NEG_INFINITY }
        } else {
            1.0 - diff / total
        };
        let least_absolutes_correlation = if total + diff == 0.0 {
            1.0
        } else {
            (total - diff) / (total + diff)
        };
        CorrelationScore { diff, total, correlation, least_absolutes_correlation }
    }

    pub fn diff(&self) -> f64 {
        self.diff
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn correlation(&self) -> f64 {
        self.correlation
    }

    pub fn least_absolutes_correlation(&self) -> f64 {
        self.least_absolutes_correlation
    }
}
