//! Sample data and run files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, RunConfig};

/// Sample matrix and target vector for a symbolic-regression problem.
///
/// `inputs[i][s]` is the value of external input `i` at sample `s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    target: Vec<f64>,
}

#[derive(Deserialize)]
struct RawDataset {
    inputs: Vec<Vec<f64>>,
    target: Vec<f64>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ConfigError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Self::new(raw.inputs, raw.target)
    }
}

impl Dataset {
    /// Create a dataset, checking that every input row is sample-aligned
    /// with the target.
    pub fn new(inputs: Vec<Vec<f64>>, target: Vec<f64>) -> Result<Self, ConfigError> {
        if inputs.is_empty() {
            return Err(ConfigError::EmptyInputs);
        }
        if target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        for (row, values) in inputs.iter().enumerate() {
            if values.len() != target.len() {
                return Err(ConfigError::SampleLengthMismatch {
                    row,
                    expected: target.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(Self { inputs, target })
    }

    /// Create a dataset whose target is `f` applied to each sample's inputs.
    pub fn from_function<F>(inputs: Vec<Vec<f64>>, f: F) -> Result<Self, ConfigError>
    where
        F: Fn(&[f64]) -> f64,
    {
        let samples = inputs.first().map_or(0, Vec::len);
        let mut point = vec![0.0; inputs.len()];
        let target = (0..samples)
            .map(|s| {
                for (value, row) in point.iter_mut().zip(&inputs) {
                    *value = row.get(s).copied().unwrap_or(f64::NAN);
                }
                f(&point)
            })
            .collect();
        Self::new(inputs, target)
    }

    #[inline]
    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    #[inline]
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Number of external inputs.
    #[inline]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Number of samples.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.target.len()
    }
}

/// A run configuration bundled with its data, as read by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    #[serde(default)]
    pub config: RunConfig,
    pub dataset: Dataset,
}

impl RunFile {
    /// Load and validate a run file from JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        let run: RunFile = serde_json::from_str(&contents)?;
        run.config.validate()?;
        Ok(run)
    }

    /// Example problem: `x^3` over the integers 1-10.
    pub fn example() -> Result<Self, ConfigError> {
        let xs = (1..=10).map(f64::from).collect();
        let dataset = Dataset::from_function(vec![xs], |p| p[0] * p[0] * p[0])?;
        Ok(Self {
            config: RunConfig {
                population_size: 10,
                tolerance: 0.0,
                max_evaluations: 1_000_000,
                random_seed: Some(42),
                ..Default::default()
            },
            dataset,
        })
    }
}

/// Run file loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read run file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse run file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid run configuration: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_dataset_validation() {
        assert_eq!(
            Dataset::new(vec![], vec![1.0]),
            Err(ConfigError::EmptyInputs)
        );
        assert_eq!(
            Dataset::new(vec![vec![1.0]], vec![]),
            Err(ConfigError::EmptyTarget)
        );
        assert_eq!(
            Dataset::new(vec![vec![1.0, 2.0], vec![1.0]], vec![1.0, 2.0]),
            Err(ConfigError::SampleLengthMismatch {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_from_function() {
        let dataset = Dataset::from_function(
            vec![vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0]],
            |p| (p[0] + p[1]) * p[0],
        )
        .unwrap();
        assert_eq!(dataset.target(), &[3.0, 12.0, 27.0]);
        assert_eq!(dataset.input_count(), 2);
        assert_eq!(dataset.sample_count(), 3);
    }

    #[test]
    fn test_deserialize_rejects_mismatched_lengths() {
        let json = r#"{"inputs": [[1.0, 2.0]], "target": [1.0]}"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }

    #[test]
    fn test_run_file_roundtrip() {
        let run = RunFile::example().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string_pretty(&run).unwrap()).unwrap();

        let loaded = RunFile::from_path(file.path()).unwrap();
        assert_eq!(loaded.dataset, run.dataset);
        assert_eq!(loaded.config.population_size, 10);
    }

    #[test]
    fn test_run_file_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"config": {{"columns": 1}}, "dataset": {{"inputs": [[1.0]], "target": [1.0]}}}}"#
        )
        .unwrap();

        let err = RunFile::from_path(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::InvalidColumns(1))));
    }

    #[test]
    fn test_run_file_missing() {
        let err = RunFile::from_path("/nonexistent/run.json").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
