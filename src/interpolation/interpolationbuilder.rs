use std::collections::HashSet;

use serde::Serialize;
use tracing::{
    debug,
    warn
};

use crate::sample::sample::{
    NUM_FIELDS,
    Sample
};
use crate::transform::segmenttransformer::TransformedColumns;

/// A node of a field curve. `original` is `None` for synthetic grid points
/// that could not be filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    original: Option<f64>,
    transformed: f64,
}

impl CurvePoint {
    pub fn new(original: Option<f64>, transformed: f64) -> CurvePoint {
        CurvePoint { original, transformed }
    }

    pub fn original(&self) -> Option<f64> {
        self.original
    }

    pub fn transformed(&self) -> f64 {
        self.transformed
    }
}

/// One field's (original, transformed) pairs merged with the synthetic grid,
/// duplicate-free and sorted by transformed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCurve {
    field: usize,
    points: Vec<CurvePoint>,
}

impl FieldCurve {
    pub fn field(&self) -> usize {
        self.field
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }
}

/// A point of the merged curve: both fields' original values at one shared
/// transformed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergedPoint {
    transformed: f64,
    original_0: f64,
    original_1: f64,
}

impl MergedPoint {
    pub fn transformed(&self) -> f64 {
        self.transformed
    }

    pub fn original(&self, field: usize) -> f64 {
        if field == 0 { self.original_0 } else { self.original_1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolationCurve {
    fields: [FieldCurve; NUM_FIELDS],
    merged: Vec<MergedPoint>,
}

impl InterpolationCurve {
    pub fn field(&self, field: usize) -> &FieldCurve {
        &self.fields[field]
    }

    pub fn merged(&self) -> &[MergedPoint] {
        &self.merged
    }
}

pub struct InterpolationBuilder {
    grid_steps: usize,
}

impl InterpolationBuilder {
    pub fn new(grid_steps: usize) -> InterpolationBuilder {
        InterpolationBuilder { grid_steps }
    }

    pub fn build_curve<K>(&self, sample: &Sample<K>, columns: &TransformedColumns) -> InterpolationCurve {
        let fields = [
            self.build_field_curve(&sample.column(0), columns.xot(0), 0),
            self.build_field_curve(&sample.column(1), columns.xot(1), 1),
        ];
        let merged = merge(&fields[0], &fields[1]);
        debug!(
            points_0 = fields[0].points.len(),
            points_1 = fields[1].points.len(),
            merged = merged.len(),
            "built interpolation curve"
        );
        InterpolationCurve { fields, merged }
    }

    /// `originals[row]` and `transformed[row]` are in original row order.
    pub fn build_field_curve(&self, originals: &[f64], transformed: &[f64], field: usize) -> FieldCurve {
        let grid = (0..=self.grid_steps).map(|step| CurvePoint::new(None, step as f64 / self.grid_steps as f64));

        // Real points come first so they win over an equal grid value.
        let mut seen = HashSet::new();
        let mut points: Vec<CurvePoint> = originals
            .iter()
            .zip(transformed)
            .map(|(&original, &t)| CurvePoint::new(Some(original), t))
            .chain(grid)
            .filter(|point| seen.insert((point.transformed + 0.0).to_bits()))
            .collect();
        points.sort_by(|a, b| a.transformed.total_cmp(&b.transformed));

        let filled = (0..points.len())
            .map(|index| CurvePoint::new(fill_original(&points, index), points[index].transformed))
            .collect();
        FieldCurve { field, points: filled }
    }
}

// Fills a grid point from its nearest known neighbours on each side:
//   x = x1 + (x1 - x2) * (y - y1) / (y1 - y2)
// Known points and the two edge rows are returned unchanged.
fn fill_original(points: &[CurvePoint], index: usize) -> Option<f64> {
    let current = points[index];
    if current.original.is_some() || index == 0 || index == points.len() - 1 {
        return current.original;
    }
    let mut left = index - 1;
    while points[left].original.is_none() && left > 0 {
        left -= 1;
    }
    let right = (index + 1..points.len()).find(|&i| points[i].original.is_some());

    match (points[left].original, right) {
        (Some(x1), Some(right)) => {
            let y1 = points[left].transformed;
            let y2 = points[right].transformed;
            let x2 = points[right].original?;
            let y = current.transformed;
            Some(x1 + (x1 - x2) * (y - y1) / (y1 - y2))
        }
        _ => None,
    }
}

// Inner join on equal transformed values, in ascending transformed order.
fn merge(curve_0: &FieldCurve, curve_1: &FieldCurve) -> Vec<MergedPoint> {
    let mut merged = Vec::new();
    let mut dropped = 0;
    let mut j = 0;
    for point_0 in &curve_0.points {
        while j < curve_1.points.len() && curve_1.points[j].transformed < point_0.transformed {
            j += 1;
        }
        if j == curve_1.points.len() {
            break;
        }
        let point_1 = curve_1.points[j];
        if point_1.transformed != point_0.transformed {
            continue;
        }
        match (point_0.original, point_1.original) {
            (Some(original_0), Some(original_1)) => merged.push(MergedPoint {
                transformed: point_0.transformed,
                original_0,
                original_1,
            }),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, "merged curve skipped points without a known original value");
    }
    merged
}
