use serde::Serialize;

use crate::equalizationerror::{
    EqualizationError,
    Result
};

/// Inclusive range `[row1, row2]` of rank positions sharing one warp parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    row1: usize,
    row2: usize,
}

impl Segment {
    pub fn new(row1: usize, row2: usize) -> Segment {
        Segment { row1, row2 }
    }

    pub fn row1(&self) -> usize {
        self.row1
    }

    pub fn row2(&self) -> usize {
        self.row2
    }

    pub fn row_count(&self) -> usize {
        self.row2 + 1 - self.row1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.row1..=self.row2
    }

    /// Splits `0..rows` into `num_parts` contiguous segments. The first
    /// `rows % num_parts` segments take one extra row.
    pub fn partition(rows: usize, num_parts: usize) -> Result<Vec<Segment>> {
        if num_parts == 0 || num_parts > rows {
            return Err(EqualizationError::invalid_configuration(format!(
                "cannot split {} rows into {} parts",
                rows, num_parts
            )));
        }
        let base = rows / num_parts;
        let extra = rows % num_parts;
        let mut segments = Vec::with_capacity(num_parts);
        let mut row1 = 0;
        for part in 0..num_parts {
            let size = if part < extra { base + 1 } else { base };
            segments.push(Segment::new(row1, row1 + size - 1));
            row1 += size;
        }
        Ok(segments)
    }
}
