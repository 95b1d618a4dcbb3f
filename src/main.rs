use tracing::info;
use tracing_subscriber::EnvFilter;

use equalizer::analysis::analyzer::Analyzer;
use equalizer::configuration::Configuration;
use equalizer::equalizationerror::EqualizationError;
use equalizer::math::curve::nonparametriccurve::piecewisepolynomial::PolynomialType;
use equalizer::sample::sample::Sample;

const JSON_FOLDER: &str = "./json/";

fn main() -> Result<(), EqualizationError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("equalizer=info"))
        )
        .init();

    let mut args = std::env::args().skip(1);
    let sample_path = args
        .next()
        .unwrap_or_else(|| format!("{}sample.json", JSON_FOLDER));
    let config_path = args
        .next()
        .unwrap_or_else(|| format!("{}config.json", JSON_FOLDER));

    let configuration = Configuration::from_reader_or_default(&config_path)?;
    info!(path = %config_path, "configuration loaded");
    let sample: Sample<chrono::NaiveDate> = Sample::from_reader(&sample_path)?;

    let analysis = Analyzer::new(configuration).analyze(&sample)?;
    println!("{}", analysis.report());

    let mapping = analysis.mapping(PolynomialType::Linear)?;
    let (lo, hi) = mapping.domain();
    let xs: Vec<f64> = (0..=4).map(|step| lo + (hi - lo) * step as f64 / 4.0).collect();
    for (x, y) in xs.iter().zip(mapping.forward_all(&xs)) {
        println!("{} {:>12.4} -> {} {:>12.4}", sample.label(0), x, sample.label(1), y);
    }
    println!("total points: {}", analysis.rows());
    println!("{}", serde_json::to_string(analysis.figures())?);
    Ok(())
}
