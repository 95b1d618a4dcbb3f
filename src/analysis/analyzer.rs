use serde::Serialize;
use tracing::info;

use crate::analysis::figure::Figure;
use crate::configuration::Configuration;
use crate::equalizationerror::Result;
use crate::interpolation::interpolatedmapping::InterpolatedMapping;
use crate::interpolation::interpolationbuilder::{
    InterpolationBuilder,
    InterpolationCurve
};
use crate::math::curve::nonparametriccurve::piecewisepolynomial::PolynomialType;
use crate::sample::ranknormalizer::RankNormalizer;
use crate::sample::sample::Sample;
use crate::selection::transformationselector::{
    Selection,
    SelectionReport,
    TransformationCandidate,
    TransformationSelector
};
use crate::solver::warpsolver::WarpSolver;
use crate::transform::segmenttransformer::{
    SegmentTransformer,
    TransformedColumns
};

/// Artifacts handed to the output side.
#[derive(Debug, Clone, Serialize)]
pub struct Figures {
    pub overview: Figure,
    pub detail: Figure,
    pub overlay: Figure,
}

pub struct Analysis {
    rows: usize,
    selection: Selection,
    curve: InterpolationCurve,
    figures: Figures,
}

impl Analysis {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn best_num_parts(&self) -> usize {
        self.selection.best_num_parts()
    }

    pub fn best(&self) -> &TransformationCandidate {
        self.selection.best()
    }

    pub fn report(&self) -> &SelectionReport {
        self.selection.report()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn curve(&self) -> &InterpolationCurve {
        &self.curve
    }

    pub fn figures(&self) -> &Figures {
        &self.figures
    }

    pub fn mapping(&self, polynomial_type: PolynomialType) -> Result<InterpolatedMapping> {
        InterpolatedMapping::new(&self.curve, polynomial_type)
    }
}

pub struct Analyzer {
    configuration: Configuration,
}

impl Analyzer {
    pub fn new(configuration: Configuration) -> Analyzer {
        Analyzer { configuration }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Normalize, sweep every segment count, select the best transform and
    /// build its interpolation curve. Any failing candidate fails the run.
    pub fn analyze<K>(&self, sample: &Sample<K>) -> Result<Analysis> {
        self.configuration.validate(sample.len())?;
        info!(rows = sample.len(), "total number of points");

        let normalized = RankNormalizer::normalize(sample)?;
        let solver = WarpSolver::from_configuration(&self.configuration);
        let transformer = SegmentTransformer::new(&solver);

        let candidates = self
            .configuration
            .num_parts_range()
            .map(|num_parts| transformer.transform(&normalized, num_parts))
            .collect::<Result<Vec<TransformedColumns>>>()?;

        let selection = TransformationSelector::select_best(&normalized, candidates)?;
        let curve = InterpolationBuilder::new(self.configuration.grid_steps())
            .build_curve(sample, selection.best().columns());

        let figures = Figures {
            overview: Figure::overview(sample, &selection),
            detail: Figure::detail(sample, selection.best()),
            overlay: Figure::overlay(sample, &curve),
        };

        Ok(Analysis { rows: sample.len(), selection, curve, figures })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::equalizationerror::EqualizationError;
    use crate::solver::terminationcode::TerminationCode;

    #[test]
    fn test_inverse_pair_single_part() {
        let sample = Sample::from_pairs((1..=10).map(|i| (i, i as f64, (11 - i) as f64))).unwrap();
        let analysis = Analyzer::new(Configuration::new(1, 1, 1e-9)).analyze(&sample).unwrap();

        assert_eq!(analysis.best_num_parts(), 1);
        for solution in analysis.best().columns().solutions() {
            assert_eq!(solution.solution().code(), TerminationCode::IdentityDescending);
            assert_abs_diff_eq!(solution.k(), 1.0, epsilon = 1e-12);
        }
        // Every pair lies on the anti-diagonal of the unit square.
        assert_eq!(analysis.report().baseline().correlation(), f64::NEG_INFINITY);
        assert_abs_diff_eq!(analysis.report().baseline().least_absolutes_correlation(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_figures_describe_every_candidate() {
        let sample = Sample::from_pairs((0..20).map(|i| {
            let x = i as f64;
            (i, x, x * x + (x * 1.7).sin())
        }))
        .unwrap();
        let analysis = Analyzer::new(Configuration::new(1, 4, 1e-9)).analyze(&sample).unwrap();
        let figures = analysis.figures();
        assert_eq!(figures.overview.panels().len(), 5);
        assert_eq!(figures.overview.panels()[0].title(), "Original data");
        assert_eq!(figures.detail.panels().len(), 4);
        assert_eq!(figures.overlay.panels().len(), 1);
        assert_eq!(analysis.report().scores().len(), 4);
        assert!(serde_json::to_string(figures).is_ok());
    }

    #[test]
    fn test_constant_field_fails_before_solving() {
        let sample = Sample::from_pairs((0..5).map(|i| (i, i as f64, 3.0))).unwrap();
        let result = Analyzer::new(Configuration::new(1, 2, 1e-9)).analyze(&sample);
        assert!(matches!(result, Err(EqualizationError::DegenerateRange { field: 1, .. })));
    }

    #[test]
    fn test_solver_failure_aborts_the_run() {
        let sample = Sample::from_pairs((0..30).map(|i| (i, i as f64, (0.3 * i as f64).exp()))).unwrap();
        let configuration = Configuration::new(1, 3, 1e-9).with_max_iterations(3);
        let result = Analyzer::new(configuration).analyze(&sample);
        assert!(matches!(
            result,
            Err(EqualizationError::ConvergenceFailure { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_coarse_grid_shrinks_curve() {
        let sample = Sample::from_pairs((0..12).map(|i| {
            let x = i as f64;
            (i, x, x * x)
        }))
        .unwrap();
        let configuration = Configuration::new(1, 2, 1e-9).with_grid_steps(4);
        assert_eq!(configuration.grid_steps(), 4);
        let analysis = Analyzer::new(configuration).analyze(&sample).unwrap();
        for field in 0..2 {
            let points = analysis.curve().field(field).points();
            // 12 real points plus at most 5 grid points
            assert!(points.len() <= 17);
            assert!(points.len() >= 12);
        }
    }

    #[test]
    fn test_sweep_larger_than_sample_rejected() {
        let sample = Sample::from_pairs((0..3).map(|i| (i, i as f64, (i * i) as f64))).unwrap();
        let result = Analyzer::new(Configuration::default()).analyze(&sample);
        assert!(matches!(result, Err(EqualizationError::InvalidConfiguration(_))));
    }
}
