use std::fs::File;
use std::io::{
    BufReader,
    ErrorKind
};

use serde::{
    Deserialize,
    Serialize
};

use tracing::info;

use crate::equalizationerror::{
    EqualizationError,
    Result
};

pub const DEFAULT_MIN_NUM_PARTS: usize = 1;
pub const DEFAULT_MAX_NUM_PARTS: usize = 6;
pub const DEFAULT_PRECISION: f64 = 1e-9;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;
pub const DEFAULT_GRID_STEPS: usize = 100;

/// Root finder used for the per-segment warp parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Directional pre-scan around k = 1 followed by bisection.
    #[default]
    Heuristic,
    /// Brent's method over the wide bracket `[1e-8, 99999999]`.
    Brent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "default_min_num_parts")]
    min_num_parts: usize,
    #[serde(default = "default_max_num_parts")]
    max_num_parts: usize,
    #[serde(default = "default_precision")]
    precision: f64,
    #[serde(default = "default_max_iterations")]
    max_iterations: usize,
    #[serde(default)]
    solver: SolverKind,
    #[serde(default = "default_grid_steps")]
    grid_steps: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            min_num_parts: DEFAULT_MIN_NUM_PARTS,
            max_num_parts: DEFAULT_MAX_NUM_PARTS,
            precision: DEFAULT_PRECISION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            solver: SolverKind::default(),
            grid_steps: DEFAULT_GRID_STEPS,
        }
    }
}

impl Configuration {
    pub fn new(min_num_parts: usize, max_num_parts: usize, precision: f64) -> Configuration {
        Configuration {
            min_num_parts,
            max_num_parts,
            precision,
            ..Configuration::default()
        }
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Configuration {
        self.solver = solver;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Configuration {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_grid_steps(mut self, grid_steps: usize) -> Configuration {
        self.grid_steps = grid_steps;
        self
    }

    pub fn min_num_parts(&self) -> usize {
        self.min_num_parts
    }

    pub fn max_num_parts(&self) -> usize {
        self.max_num_parts
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    pub fn grid_steps(&self) -> usize {
        self.grid_steps
    }

    /// Segment counts swept by the analysis, in ascending order.
    pub fn num_parts_range(&self) -> std::ops::RangeInclusive<usize> {
        self.min_num_parts..=self.max_num_parts
    }

    pub fn from_reader(file_path: &str) -> Result<Configuration> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let configuration: Configuration = serde_json::from_reader(reader)?;
        configuration.validate_parameters()?;
        Ok(configuration)
    }

    /// Like [`Configuration::from_reader`], but a missing file yields the
    /// defaults. Malformed or invalid files are still errors.
    pub fn from_reader_or_default(file_path: &str) -> Result<Configuration> {
        match Self::from_reader(file_path) {
            Err(EqualizationError::Io(error)) if error.kind() == ErrorKind::NotFound => {
                info!(path = file_path, "configuration file not found, using defaults");
                Ok(Configuration::default())
            }
            other => other,
        }
    }

    /// Checks the parameters that do not depend on the sample.
    pub fn validate_parameters(&self) -> Result<()> {
        if self.min_num_parts == 0 {
            return Err(EqualizationError::invalid_configuration("min_num_parts must be at least 1"));
        }
        if self.min_num_parts > self.max_num_parts {
            return Err(EqualizationError::invalid_configuration(format!(
                "min_num_parts ({}) exceeds max_num_parts ({})",
                self.min_num_parts, self.max_num_parts
            )));
        }
        if !(self.precision > 0.0 && self.precision.is_finite()) {
            return Err(EqualizationError::invalid_configuration(format!(
                "precision must be a positive finite number, got {}",
                self.precision
            )));
        }
        if self.max_iterations == 0 {
            return Err(EqualizationError::invalid_configuration("max_iterations must be at least 1"));
        }
        if self.grid_steps == 0 {
            return Err(EqualizationError::invalid_configuration("grid_steps must be at least 1"));
        }
        Ok(())
    }

    /// Checks the parameters against a sample of `rows` observations.
    pub fn validate(&self, rows: usize) -> Result<()> {
        self.validate_parameters()?;
        if self.max_num_parts > rows {
            return Err(EqualizationError::invalid_configuration(format!(
                "max_num_parts ({}) exceeds the number of rows ({})",
                self.max_num_parts, rows
            )));
        }
        Ok(())
    }
}

fn default_min_num_parts() -> usize {
    DEFAULT_MIN_NUM_PARTS
}
fn default_max_num_parts() -> usize {
    DEFAULT_MAX_NUM_PARTS
}
fn default_precision() -> f64 {
    DEFAULT_PRECISION
}
fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_grid_steps() -> usize {
    DEFAULT_GRID_STEPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.min_num_parts(), 1);
        assert_eq!(config.max_num_parts(), 6);
        assert_eq!(config.precision(), 1e-9);
        assert_eq!(config.solver(), SolverKind::Heuristic);
        assert_eq!(config.num_parts_range().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Configuration =
            serde_json::from_str(r#"{"max_num_parts": 3, "solver": "brent"}"#).unwrap();
        assert_eq!(config.min_num_parts(), 1);
        assert_eq!(config.max_num_parts(), 3);
        assert_eq!(config.precision(), DEFAULT_PRECISION);
        assert_eq!(config.solver(), SolverKind::Brent);
    }

    fn write_config(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("equalizer-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("equalizer-no-such-config.json");
        let config = Configuration::from_reader_or_default(&path.to_string_lossy()).unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_bad_files_are_not_replaced_by_defaults() {
        let malformed = write_config("malformed", "{\"max_num_parts\": ");
        assert!(matches!(
            Configuration::from_reader_or_default(&malformed),
            Err(EqualizationError::Json(_))
        ));

        let invalid = write_config("invalid", r#"{"min_num_parts": 4, "max_num_parts": 2}"#);
        assert!(matches!(
            Configuration::from_reader_or_default(&invalid),
            Err(EqualizationError::InvalidConfiguration(_))
        ));

        let zero_precision = write_config("zero-precision", r#"{"precision": 0.0}"#);
        assert!(matches!(
            Configuration::from_reader_or_default(&zero_precision),
            Err(EqualizationError::InvalidConfiguration(_))
        ));

        for path in [malformed, invalid, zero_precision] {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        assert!(Configuration::new(0, 3, 1e-9).validate(10).is_err());
        assert!(Configuration::new(4, 3, 1e-9).validate(10).is_err());
        assert!(Configuration::new(1, 3, 0.0).validate(10).is_err());
        assert!(Configuration::new(1, 11, 1e-9).validate(10).is_err());
        assert!(Configuration::new(1, 10, 1e-9).validate(10).is_ok());
    }
}
