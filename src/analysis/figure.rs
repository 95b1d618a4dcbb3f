use serde::Serialize;

use crate::interpolation::interpolationbuilder::InterpolationCurve;
use crate::math::curve::nonparametriccurve::nonparametriccurve::Point2D;
use crate::sample::sample::Sample;
use crate::selection::transformationselector::{
    Selection,
    TransformationCandidate
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    Markers,
    Line,
    LineWithMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    style: SeriesStyle,
    points: Vec<Point2D>,
}

impl Series {
    pub fn new(style: SeriesStyle, points: Vec<Point2D>) -> Series {
        Series { style, points }
    }

    pub fn scatter(xs: &[f64], ys: &[f64]) -> Series {
        Series::new(
            SeriesStyle::Markers,
            xs.iter().zip(ys).map(|(&x, &y)| Point2D::new(x, y)).collect()
        )
    }

    pub fn identity(min: f64, max: f64) -> Series {
        Series::new(SeriesStyle::Line, vec![Point2D::new(min, min), Point2D::new(max, max)])
    }

    pub fn style(&self) -> SeriesStyle {
        self.style
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    title: String,
    x_label: String,
    y_label: String,
    series: Vec<Series>,
}

impl Panel {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>, series: Vec<Series>) -> Panel {
        Panel {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }
}

/// Plain-data description of one rendered artifact. Rendering and encoding
/// belong to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    name: String,
    grid_columns: usize,
    panels: Vec<Panel>,
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

impl Figure {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_columns(&self) -> usize {
        self.grid_columns
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Raw data next to every swept candidate, two panels per row.
    pub fn overview<K>(sample: &Sample<K>, selection: &Selection) -> Figure {
        let column_0 = sample.column(0);
        let column_1 = sample.column(1);
        let (min_0, max_0) = min_max(&column_0);

        let mut panels = vec![Panel::new(
            "Original data",
            sample.label(0),
            sample.label(1),
            vec![Series::identity(min_0, max_0), Series::scatter(&column_0, &column_1)]
        )];
        panels.extend(selection.candidates().values().map(|candidate| {
            Panel::new(
                format!("divided in {}", candidate.num_parts()),
                sample.label(0),
                sample.label(1),
                vec![
                    Series::identity(0.0, 1.0),
                    Series::scatter(candidate.columns().xot(0), candidate.columns().xot(1)),
                ]
            )
        }));
        Figure { name: "overview".to_owned(), grid_columns: 2, panels }
    }

    /// Four views of the chosen transformation.
    pub fn detail<K>(sample: &Sample<K>, best: &TransformationCandidate) -> Figure {
        let column_0 = sample.column(0);
        let column_1 = sample.column(1);
        let xt_0 = best.columns().xot(0);
        let xt_1 = best.columns().xot(1);
        let (min_0, max_0) = min_max(&column_0);

        let panels = vec![
            Panel::new(
                "Original data",
                sample.label(0),
                sample.label(1),
                vec![Series::scatter(&column_0, &column_1), Series::identity(min_0, max_0)]
            ),
            Panel::new(
                sample.label(1),
                "Transformed data",
                "Original data",
                vec![Series::scatter(xt_1, &column_1)]
            ),
            Panel::new(
                sample.label(0),
                "Original data",
                "Transformed data",
                vec![Series::scatter(&column_0, xt_0)]
            ),
            Panel::new(
                "Transformed data",
                sample.label(1),
                sample.label(0),
                vec![Series::scatter(xt_1, xt_0), Series::identity(0.0, 1.0)]
            ),
        ];
        Figure { name: "detail".to_owned(), grid_columns: 2, panels }
    }

    /// Merged interpolation curve over the raw observations.
    pub fn overlay<K>(sample: &Sample<K>, curve: &InterpolationCurve) -> Figure {
        let merged: Vec<Point2D> = curve
            .merged()
            .iter()
            .map(|p| Point2D::new(p.original(0), p.original(1)))
            .collect();
        let panels = vec![Panel::new(
            "Interpolated transformation",
            sample.label(0),
            sample.label(1),
            vec![
                Series::new(SeriesStyle::LineWithMarkers, merged),
                Series::scatter(&sample.column(0), &sample.column(1)),
            ]
        )];
        Figure { name: "overlay".to_owned(), grid_columns: 1, panels }
    }
}
