use crate::equalizationerror::Result;
use crate::interpolation::interpolationbuilder::InterpolationCurve;
use crate::math::curve::curve::Curve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    NonparametricCurve,
    Point2D
};
use crate::math::curve::nonparametriccurve::piecewisepolynomial::{
    PiecewisePolynomial,
    PolynomialType
};
use crate::sample::sample::NUM_FIELDS;

// Keeps the first node of every run with equal or receding x.
fn strictly_increasing(points: impl IntoIterator<Item = Point2D>) -> Vec<Point2D> {
    let mut nodes: Vec<Point2D> = Vec::new();
    for pt in points {
        match nodes.last() {
            Some(last) if pt.x() <= last.x() => {}
            _ => nodes.push(pt),
        }
    }
    nodes
}

struct FieldMapping {
    to_transformed: PiecewisePolynomial,
    to_original: PiecewisePolynomial,
}

/// Continuous maps over an [`InterpolationCurve`]: each field's original
/// scale to the shared transformed scale and back, and field 0's original
/// scale to field 1's original scale and back.
pub struct InterpolatedMapping {
    fields: Vec<FieldMapping>,
    forward: PiecewisePolynomial,
    inverse: PiecewisePolynomial,
}

impl InterpolatedMapping {
    pub fn new(curve: &InterpolationCurve, polynomial_type: PolynomialType) -> Result<InterpolatedMapping> {
        let mut fields = Vec::with_capacity(NUM_FIELDS);
        for field in 0..NUM_FIELDS {
            let known: Vec<Point2D> = curve
                .field(field)
                .points()
                .iter()
                .filter_map(|p| p.original().map(|x| Point2D::new(x, p.transformed())))
                .collect();
            fields.push(FieldMapping {
                to_transformed: PiecewisePolynomial::new(polynomial_type, strictly_increasing(known.iter().copied()))?,
                to_original: PiecewisePolynomial::new(
                    polynomial_type,
                    strictly_increasing(known.iter().map(Point2D::transposed))
                )?,
            });
        }

        let merged: Vec<Point2D> = curve
            .merged()
            .iter()
            .map(|p| Point2D::new(p.original(0), p.original(1)))
            .collect();
        let forward = PiecewisePolynomial::new(polynomial_type, strictly_increasing(merged.iter().copied()))?;
        let mut transposed: Vec<Point2D> = merged.iter().map(Point2D::transposed).collect();
        transposed.sort_by(|a, b| a.x().total_cmp(&b.x()));
        let inverse = PiecewisePolynomial::new(polynomial_type, strictly_increasing(transposed))?;

        Ok(InterpolatedMapping { fields, forward, inverse })
    }

    /// Field value on its original scale to the shared [0, 1] scale.
    pub fn to_transformed(&self, field: usize, original: f64) -> f64 {
        self.fields[field].to_transformed.value(original)
    }

    /// Shared [0, 1] scale back to the field's original scale.
    pub fn to_original(&self, field: usize, transformed: f64) -> f64 {
        self.fields[field].to_original.value(transformed)
    }

    /// Field 0 original value to the matching field 1 original value.
    pub fn forward(&self, original_0: f64) -> f64 {
        self.forward.value(original_0)
    }

    /// `forward` over a batch of field 0 values.
    pub fn forward_all(&self, originals_0: &[f64]) -> Vec<f64> {
        self.forward.values(originals_0)
    }

    /// Field 1 original value to the matching field 0 original value.
    pub fn inverse(&self, original_1: f64) -> f64 {
        self.inverse.value(original_1)
    }

    /// Local rate of change of field 1 per unit of field 0.
    pub fn forward_slope(&self, original_0: f64) -> f64 {
        self.forward.derivative(original_0)
    }

    /// Field 0 range covered by the merged curve.
    pub fn domain(&self) -> (f64, f64) {
        (self.forward.min_x(), self.forward.max_x())
    }

    /// Nodes of the field 0 to field 1 map.
    pub fn nodes(&self) -> Vec<Point2D> {
        self.forward.points()
    }
}
