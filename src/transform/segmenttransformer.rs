use serde::Serialize;
use tracing::debug;

use crate::equalizationerror::Result;
use crate::math::warp::transform_by_range;
use crate::sample::ranknormalizer::NormalizedSample;
use crate::sample::sample::NUM_FIELDS;
use crate::solver::warpsolver::{
    WarpSolution,
    WarpSolver
};
use crate::transform::segment::Segment;

/// The warp parameter found for one (segment, field) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSolution {
    segment: Segment,
    field: usize,
    solution: WarpSolution,
}

impl SegmentSolution {
    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn field(&self) -> usize {
        self.field
    }

    pub fn solution(&self) -> &WarpSolution {
        &self.solution
    }

    pub fn k(&self) -> f64 {
        self.solution.k()
    }
}

/// Both fields after the per-segment warp, in rank order (`xt`) and in
/// original row order (`xot`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformedColumns {
    num_parts: usize,
    xt: [Vec<f64>; NUM_FIELDS],
    xot: [Vec<f64>; NUM_FIELDS],
    solutions: Vec<SegmentSolution>,
}

impl TransformedColumns {
    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn xt(&self, field: usize) -> &[f64] {
        &self.xt[field]
    }

    pub fn xot(&self, field: usize) -> &[f64] {
        &self.xot[field]
    }

    pub fn solutions(&self) -> &[SegmentSolution] {
        &self.solutions
    }

    pub fn len(&self) -> usize {
        self.xt[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.xt[0].is_empty()
    }
}

pub struct SegmentTransformer<'a> {
    solver: &'a WarpSolver,
}

impl<'a> SegmentTransformer<'a> {
    pub fn new(solver: &'a WarpSolver) -> SegmentTransformer<'a> {
        SegmentTransformer { solver }
    }

    pub fn transform(&self, normalized: &NormalizedSample, num_parts: usize) -> Result<TransformedColumns> {
        let rows = normalized.len();
        let segments = Segment::partition(rows, num_parts)?;

        let mut xt = [vec![0.0; rows], vec![0.0; rows]];
        let mut xot = [vec![0.0; rows], vec![0.0; rows]];
        let mut solutions = Vec::with_capacity(num_parts * NUM_FIELDS);

        for segment in &segments {
            for field in 0..NUM_FIELDS {
                let column = normalized.column(field);
                let values = column.values();
                let value_min = values[segment.row1()];
                let value_max = values[segment.row2()];
                let solution = self.solver.solve_k(values, segment.row1(), segment.row2())?;

                for rank in segment.rows() {
                    let transformed = transform_by_range(values[rank], value_min, value_max, solution.k())?;
                    xt[field][rank] = transformed;
                    xot[field][column.order_map()[rank]] = transformed;
                }
                solutions.push(SegmentSolution { segment: *segment, field, solution });
            }
        }

        debug!(num_parts, rows, "transformed sample");

        Ok(TransformedColumns { num_parts, xt, xot, solutions })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::configuration::SolverKind;
    use crate::sample::ranknormalizer::RankNormalizer;
    use crate::sample::sample::Sample;
    use crate::solver::warpsolver::mean_warp;

    fn solver() -> WarpSolver {
        WarpSolver::new(1e-9, 10_000, SolverKind::Heuristic)
    }

    fn normalized(pairs: &[(f64, f64)]) -> NormalizedSample {
        let sample = Sample::from_pairs(pairs.iter().enumerate().map(|(i, &(a, b))| (i, a, b))).unwrap();
        RankNormalizer::normalize(&sample).unwrap()
    }

    #[test]
    fn test_linear_data_is_left_unchanged() {
        let pairs: Vec<(f64, f64)> = (1..=10).map(|i| (i as f64, (11 - i) as f64)).collect();
        let normalized = normalized(&pairs);
        let solver = solver();
        let transformed = SegmentTransformer::new(&solver).transform(&normalized, 1).unwrap();

        assert_eq!(transformed.solutions().len(), 2);
        for solution in transformed.solutions() {
            assert_abs_diff_eq!(solution.k(), 1.0, epsilon = 1e-12);
        }
        for field in 0..NUM_FIELDS {
            for (t, v) in transformed.xt(field).iter().zip(normalized.column(field).values()) {
                assert_abs_diff_eq!(*t, *v, epsilon = 1e-12);
            }
        }
        // field 1 descends in original order
        assert_abs_diff_eq!(transformed.xot(1)[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(transformed.xot(1)[9], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segments_keep_their_endpoints_and_hit_target_mean() {
        let pairs: Vec<(f64, f64)> = (0..12)
            .map(|i| {
                let x = i as f64;
                (x * x, (x + 1.0).ln())
            })
            .collect();
        let normalized = normalized(&pairs);
        let solver = solver();
        let transformed = SegmentTransformer::new(&solver).transform(&normalized, 3).unwrap();

        assert_eq!(transformed.num_parts(), 3);
        assert_eq!(transformed.solutions().len(), 6);
        for segment_solution in transformed.solutions() {
            let field = segment_solution.field();
            let segment = segment_solution.segment();
            let values = normalized.column(field).values();
            let xt = transformed.xt(field);
            assert_eq!(xt[segment.row1()], values[segment.row1()]);
            assert_eq!(xt[segment.row2()], values[segment.row2()]);
            let mean = mean_warp(values, segment.row1(), segment.row2(), segment_solution.k()).unwrap();
            assert_abs_diff_eq!(mean, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_transformed_values_stay_monotone_in_rank_order() {
        let pairs = [(5.0, 1.0), (1.0, 4.0), (3.0, 9.0), (8.0, 2.0), (2.0, 7.0), (13.0, 3.0), (4.0, 8.0)];
        let normalized = normalized(&pairs);
        let solver = solver();
        let transformed = SegmentTransformer::new(&solver).transform(&normalized, 2).unwrap();
        for field in 0..NUM_FIELDS {
            for pair in transformed.xt(field).windows(2) {
                assert!(pair[0] <= pair[1]);
            }
            let scattered = normalized.column(field).to_original_order(transformed.xt(field));
            assert_eq!(scattered.as_slice(), transformed.xot(field));
        }
    }

    #[test]
    fn test_too_many_parts_rejected() {
        let normalized = normalized(&[(1.0, 2.0), (2.0, 1.0), (3.0, 3.0)]);
        let solver = solver();
        assert!(SegmentTransformer::new(&solver).transform(&normalized, 4).is_err());
    }
}
