use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use tracing::info;

use crate::equalizationerror::{
    EqualizationError,
    Result
};
use crate::sample::ranknormalizer::NormalizedSample;
use crate::selection::correlation::CorrelationScore;
use crate::transform::segmenttransformer::TransformedColumns;

/// One swept segment count with its transformed columns and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationCandidate {
    columns: TransformedColumns,
    score: CorrelationScore,
}

impl TransformationCandidate {
    pub fn new(columns: TransformedColumns) -> TransformationCandidate {
        let score = CorrelationScore::from_columns(columns.xot(0), columns.xot(1));
        TransformationCandidate { columns, score }
    }

    pub fn num_parts(&self) -> usize {
        self.columns.num_parts()
    }

    pub fn columns(&self) -> &TransformedColumns {
        &self.columns
    }

    pub fn score(&self) -> &CorrelationScore {
        &self.score
    }
}

/// Score table of a selection run: the untransformed baseline, every
/// candidate in ascending segment-count order, and the winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    baseline: CorrelationScore,
    scores: Vec<(usize, CorrelationScore)>,
    best_num_parts: usize,
}

impl SelectionReport {
    pub fn baseline(&self) -> &CorrelationScore {
        &self.baseline
    }

    pub fn scores(&self) -> &[(usize, CorrelationScore)] {
        &self.scores
    }

    pub fn best_num_parts(&self) -> usize {
        self.best_num_parts
    }
}

impl Display for SelectionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "-".repeat(82);
        writeln!(f, "{:<17} {:<24} {:<24}", "transformation", "1 - diff / total", "(total - diff) / (total + diff)")?;
        writeln!(f, "{:<17} {:<24} {:<24}", "", "correlation", "least-absolutes correlation")?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<17} {:<24} {:<24}",
            "original data",
            self.baseline.correlation(),
            self.baseline.least_absolutes_correlation()
        )?;
        for (num_parts, score) in &self.scores {
            writeln!(
                f,
                "{:<17} {:<24} {:<24}",
                format!("divided in {}", num_parts),
                score.correlation(),
                score.least_absolutes_correlation()
            )?;
        }
        writeln!(f, "{}", rule)?;
        write!(f, "Best transformation is {}", self.best_num_parts)
    }
}

#[derive(Debug, Clone)]
pub struct Selection {
    report: SelectionReport,
    candidates: BTreeMap<usize, TransformationCandidate>,
}

impl Selection {
    pub fn report(&self) -> &SelectionReport {
        &self.report
    }

    pub fn candidates(&self) -> &BTreeMap<usize, TransformationCandidate> {
        &self.candidates
    }

    pub fn best_num_parts(&self) -> usize {
        self.report.best_num_parts
    }

    pub fn best(&self) -> &TransformationCandidate {
        &self.candidates[&self.report.best_num_parts]
    }
}

pub struct TransformationSelector;

impl TransformationSelector {
    /// Scores the untransformed baseline and every candidate, then keeps the
    /// highest correlation. A later candidate only wins when strictly greater.
    pub fn select_best(normalized: &NormalizedSample, candidates: Vec<TransformedColumns>) -> Result<Selection> {
        let baseline = CorrelationScore::from_columns(
            &normalized.column(0).original_order_values(),
            &normalized.column(1).original_order_values()
        );
        info!(
            correlation = baseline.correlation(),
            least_absolutes_correlation = baseline.least_absolutes_correlation(),
            "baseline score"
        );

        let candidates: BTreeMap<usize, TransformationCandidate> = candidates
            .into_iter()
            .map(|columns| (columns.num_parts(), TransformationCandidate::new(columns)))
            .collect();

        let mut best: Option<(usize, f64)> = None;
        let mut scores = Vec::with_capacity(candidates.len());
        for (&num_parts, candidate) in &candidates {
            let score = *candidate.score();
            info!(
                num_parts,
                correlation = score.correlation(),
                least_absolutes_correlation = score.least_absolutes_correlation(),
                "candidate score"
            );
            scores.push((num_parts, score));
            let improves = match best {
                None => true,
                Some((_, best_correlation)) => score.correlation() > best_correlation,
            };
            if improves {
                best = Some((num_parts, score.correlation()));
            }
        }

        let (best_num_parts, best_correlation) = best
            .ok_or_else(|| EqualizationError::invalid_configuration("no transformation candidates to select from"))?;
        info!(best_num_parts, correlation = best_correlation, "selected transformation");

        Ok(Selection {
            report: SelectionReport { baseline, scores, best_num_parts },
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::SolverKind;
    use crate::sample::ranknormalizer::RankNormalizer;
    use crate::sample::sample::Sample;
    use crate::solver::warpsolver::WarpSolver;
    use crate::transform::segmenttransformer::SegmentTransformer;

    fn sweep(pairs: &[(f64, f64)], parts: std::ops::RangeInclusive<usize>) -> (NormalizedSample, Vec<TransformedColumns>) {
        let sample = Sample::from_pairs(pairs.iter().enumerate().map(|(i, &(a, b))| (i, a, b))).unwrap();
        let normalized = RankNormalizer::normalize(&sample).unwrap();
        let solver = WarpSolver::new(1e-9, 10_000, SolverKind::Heuristic);
        let transformer = SegmentTransformer::new(&solver);
        let columns = parts.map(|n| transformer.transform(&normalized, n).unwrap()).collect();
        (normalized, columns)
    }

    #[test]
    fn test_identical_fields_tie_keeps_first() {
        let pairs: Vec<(f64, f64)> = (0..8).map(|i| ((i * i) as f64, (i * i) as f64)).collect();
        let (normalized, columns) = sweep(&pairs, 1..=3);
        let selection = TransformationSelector::select_best(&normalized, columns).unwrap();
        let report = selection.report();
        assert_eq!(report.scores().len(), 3);
        for (_, score) in report.scores() {
            assert_eq!(score.correlation(), 1.0);
        }
        assert_eq!(selection.best_num_parts(), 1);
        assert_eq!(selection.best().num_parts(), 1);
        assert_eq!(report.baseline().correlation(), 1.0);
    }

    #[test]
    fn test_best_has_highest_correlation() {
        let pairs = [
            (1.0, 2.0), (2.0, 1.5), (3.0, 5.0), (4.0, 3.0), (5.0, 8.0),
            (6.0, 7.5), (7.0, 6.0), (8.0, 11.0), (9.0, 9.5), (10.0, 14.0),
        ];
        let (normalized, columns) = sweep(&pairs, 1..=4);
        let selection = TransformationSelector::select_best(&normalized, columns).unwrap();
        let best = selection.best().score().correlation();
        for candidate in selection.candidates().values() {
            assert!(candidate.score().correlation() <= best);
        }
        let first_best = selection
            .candidates()
            .values()
            .find(|c| c.score().correlation() == best)
            .unwrap();
        assert_eq!(first_best.num_parts(), selection.best_num_parts());
    }

    #[test]
    fn test_report_lists_every_candidate() {
        let pairs = [(1.0, 3.0), (2.0, 1.0), (3.0, 4.0), (4.0, 2.0), (5.0, 6.0), (6.0, 5.0)];
        let (normalized, columns) = sweep(&pairs, 1..=3);
        let selection = TransformationSelector::select_best(&normalized, columns).unwrap();
        let rendered = selection.report().to_string();
        assert!(rendered.contains("original data"));
        assert!(rendered.contains("divided in 1"));
        assert!(rendered.contains("divided in 3"));
        assert!(rendered.ends_with(&format!("Best transformation is {}", selection.best_num_parts())));
    }

    #[test]
    fn test_empty_candidates_rejected() {
        let (normalized, _) = sweep(&[(1.0, 2.0), (2.0, 1.0)], 1..=1);
        assert!(TransformationSelector::select_best(&normalized, Vec::new()).is_err());
    }
}
