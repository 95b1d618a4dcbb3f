use tracing::debug;

use crate::equalizationerror::{
    EqualizationError,
    Result
};
use crate::sample::sample::{
    NUM_FIELDS,
    Sample
};

/// One field sorted ascending and min-max scaled to [0, 1].
///
/// `values[r]` is the normalized value at rank position `r`,
/// `order_map[r]` the original row position that holds that rank.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedColumn {
    values: Vec<f64>,
    order_map: Vec<usize>,
    min: f64,
    max: f64,
}

impl NormalizedColumn {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn order_map(&self) -> &[usize] {
        &self.order_map
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw minimum of the field before scaling.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Raw maximum of the field before scaling.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Scatters rank-ordered values back into original row order.
    pub fn to_original_order(&self, rank_ordered: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; rank_ordered.len()];
        for (rank, &row) in self.order_map.iter().enumerate() {
            result[row] = rank_ordered[rank];
        }
        result
    }

    /// Normalized values in original row order.
    pub fn original_order_values(&self) -> Vec<f64> {
        self.to_original_order(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSample {
    columns: [NormalizedColumn; NUM_FIELDS],
}

impl NormalizedSample {
    pub fn column(&self, field: usize) -> &NormalizedColumn {
        &self.columns[field]
    }

    pub fn columns(&self) -> &[NormalizedColumn; NUM_FIELDS] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns[0].is_empty()
    }
}

pub struct RankNormalizer;

impl RankNormalizer {
    pub fn normalize<K>(sample: &Sample<K>) -> Result<NormalizedSample> {
        if sample.len() < 2 {
            return Err(EqualizationError::InsufficientData { rows: sample.len() });
        }
        let column_0 = Self::normalize_column(&sample.column(0), 0)?;
        let column_1 = Self::normalize_column(&sample.column(1), 1)?;
        Ok(NormalizedSample { columns: [column_0, column_1] })
    }

    /// Stable ascending sort (ties keep original row order) and min-max scaling.
    pub fn normalize_column(raw: &[f64], field: usize) -> Result<NormalizedColumn> {
        let mut order_map: Vec<usize> = (0..raw.len()).collect();
        order_map.sort_by(|&a, &b| raw[a].total_cmp(&raw[b]));

        let min = raw[order_map[0]];
        let max = raw[order_map[order_map.len() - 1]];
        let range = max - min;
        if range == 0.0 {
            return Err(EqualizationError::DegenerateRange { field, value: min });
        }

        let values = order_map
            .iter()
            .map(|&row| (raw[row] - min) / range)
            .collect();

        debug!(field, rows = raw.len(), min, max, "rank-normalized column");

        Ok(NormalizedColumn { values, order_map, min, max })
    }
}
