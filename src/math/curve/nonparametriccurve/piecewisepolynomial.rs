use serde::{
    Deserialize,
    Serialize
};

use crate::equalizationerror::{
    EqualizationError,
    Result
};
use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────

/// One interval's polynomial in Horner form around its left node:
/// coefs = [c_n, ..., c_1, c_0] for Σ c_i·(x - lhs_x)^i.
struct Subpolynomial {
    coefs: Vec<f64>,
    deriv_coefs: Vec<f64>,
    lhs_x: f64,
}

impl Subpolynomial {
    fn new(coefs: Vec<f64>, lhs_x: f64) -> Subpolynomial {
        let deriv_coefs = Self::compute_deriv_coefs(&coefs);
        Subpolynomial { coefs, deriv_coefs, lhs_x }
    }

    fn compute_deriv_coefs(coefs: &[f64]) -> Vec<f64> {
        let order = coefs.len() - 1;
        if order == 0 {
            vec![0.0]
        } else {
            (0..order)
                .map(|i| (order - i) as f64 * coefs[i])
                .collect()
        }
    }

    fn value(&self, x: f64) -> f64 {
        self.evaluate(&self.coefs, x)
    }

    fn derivative(&self, x: f64) -> f64 {
        self.evaluate(&self.deriv_coefs, x)
    }

    fn evaluate(&self, coefs: &[f64], x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let mut result = coefs[0];
        for &beta in &coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }
}

// ─────────────────────────────────────────────
// Linear
// ─────────────────────────────────────────────

fn generate_linear_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    points
        .windows(2)
        .map(|pair| vec![Point2D::slope(&pair[0], &pair[1]), pair[0].y()])
        .collect()
}

// ─────────────────────────────────────────────
// PCHIP (Fritsch-Carlson, shape preserving)
// ─────────────────────────────────────────────
//
// Interior slopes are weighted harmonic means of the neighbouring secants,
// zero where the secants change sign or one of them is flat. End slopes use
// the one-sided three-point formula, clipped to keep monotonicity.

fn cubic_coefs_from_hermite(points: &[Point2D], h: &[f64], t: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let dy = points[i + 1].y() - points[i].y();
            let a = points[i].y();
            let b = t[i];
            let c = (3.0 * dy / h[i] - 2.0 * t[i] - t[i + 1]) / h[i];
            let d = (-2.0 * dy / h[i] + t[i] + t[i + 1]) / (h[i] * h[i]);
            vec![d, c, b, a]
        })
        .collect()
}

fn pchip_end_slope(h0: f64, h1: f64, s0: f64, s1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * s0 - h0 * s1) / (h0 + h1);
    if s0 == 0.0 || raw.signum() != s0.signum() {
        0.0
    } else if s0.signum() != s1.signum() && raw.abs() > 3.0 * s0.abs() {
        3.0 * s0
    } else {
        raw
    }
}

fn generate_pchip_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    let n = points.len() - 1;
    let h: Vec<f64> = points.windows(2).map(|pair| pair[1].x() - pair[0].x()).collect();
    let s: Vec<f64> = points.windows(2).map(|pair| Point2D::slope(&pair[0], &pair[1])).collect();

    let mut t = vec![0.0_f64; n + 1];

    if n == 1 {
        t[0] = s[0];
        t[1] = s[0];
        return cubic_coefs_from_hermite(points, &h, &t);
    }

    for i in 1..n {
        if s[i - 1] * s[i] <= 0.0 {
            t[i] = 0.0;
        } else {
            let w1 = 2.0 * h[i] + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            t[i] = (w1 + w2) / (w1 / s[i - 1] + w2 / s[i]);
        }
    }

    t[0] = pchip_end_slope(h[0], h[1], s[0], s[1]);
    t[n] = pchip_end_slope(h[n - 1], h[n - 2], s[n - 1], s[n - 2]);

    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolynomialType {
    /// Straight segments between nodes, the same rule used to fill the grid.
    #[default]
    Linear,
    /// Monotone cubic Hermite (PCHIP).
    PiecewiseCubicHermite,
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

pub struct PiecewisePolynomial {
    max_x: f64,
    polynomial_type: PolynomialType,
    subpolynomial_list: Vec<Subpolynomial>,
}

impl PiecewisePolynomial {
    /// Nodes must have strictly increasing `x`; at least two are required.
    pub fn new(polynomial_type: PolynomialType, points: Vec<Point2D>) -> Result<PiecewisePolynomial> {
        if points.len() < 2 {
            return Err(EqualizationError::InsufficientData { rows: points.len() });
        }
        if let Some(pair) = points.windows(2).find(|pair| !(pair[1].x() > pair[0].x())) {
            return Err(EqualizationError::precision_violation("non-increasing node x", pair[1].x()));
        }

        let coef_list = match polynomial_type {
            PolynomialType::Linear                => generate_linear_coef_list(&points),
            PolynomialType::PiecewiseCubicHermite => generate_pchip_coef_list(&points),
        };

        let subpolynomial_list = coef_list
            .into_iter()
            .zip(points.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x()))
            .collect();

        Ok(PiecewisePolynomial {
            subpolynomial_list,
            max_x: points[points.len() - 1].x(),
            polynomial_type,
        })
    }

    pub fn polynomial_type(&self) -> PolynomialType {
        self.polynomial_type
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x) - 1
        }
    }
}

impl NonparametricCurve for PiecewisePolynomial {
    fn points(&self) -> Vec<Point2D> {
        let mut pts: Vec<Point2D> = self
            .subpolynomial_list
            .iter()
            .map(|s| Point2D::new(s.lhs_x, s.value(s.lhs_x)))
            .collect();
        if let Some(last) = self.subpolynomial_list.last() {
            pts.push(Point2D::new(self.max_x, last.value(self.max_x)));
        }
        pts
    }

    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }

    fn max_x(&self) -> f64 {
        self.max_x
    }
}

impl Curve for PiecewisePolynomial {
    fn value(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].value(x)
    }

    fn derivative(&self, x: f64) -> f64 {
        let i = self.find_segment(x);
        self.subpolynomial_list[i].derivative(x)
    }
}
