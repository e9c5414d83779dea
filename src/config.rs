use crate::error::{ForecastError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HORIZON_MONTHS: usize = 12;
pub const DEFAULT_LOOKBACK_DAYS: u64 = 365;
pub const DEFAULT_MAX_SEGMENTS: usize = 5;
pub const DEFAULT_SEGMENTATION_SEED: u64 = 42;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct ForecastConfig {
    #[schemars(description = "Number of months to project forward (at least 1)")]
    pub horizon_months: usize,

    #[schemars(description = "Length of the trailing history window in days")]
    pub lookback_days: u64,

    pub segmentation: SegmentationConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            segmentation: SegmentationConfig::default(),
        }
    }
}

impl ForecastConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_months == 0 {
            return Err(ForecastError::InvalidHorizon(self.horizon_months));
        }
        if self.lookback_days == 0 {
            return Err(ForecastError::InvalidConfig(
                "lookback_days must be greater than zero".to_string(),
            ));
        }
        self.segmentation.validate()
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(ForecastConfig);
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct SegmentationConfig {
    #[schemars(description = "Upper bound on the number of clusters")]
    pub max_segments: usize,

    pub max_iterations: u64,

    #[schemars(description = "Centroid movement below which k-means is considered converged")]
    pub tolerance: f64,

    #[schemars(description = "Independent k-means restarts; the lowest-inertia run wins")]
    pub n_runs: usize,

    #[schemars(description = "Seed for the clustering random source")]
    pub seed: u64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
            seed: DEFAULT_SEGMENTATION_SEED,
        }
    }
}

impl SegmentationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_segments == 0 {
            return Err(ForecastError::InvalidConfig(
                "max_segments must be greater than zero".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidConfig(
                "max_iterations must be greater than zero".to_string(),
            ));
        }
        if self.n_runs == 0 {
            return Err(ForecastError::InvalidConfig(
                "n_runs must be greater than zero".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ForecastError::InvalidConfig(format!(
                "tolerance {} must be finite and greater than zero",
                self.tolerance
            )));
        }
        Ok(())
    }
}
