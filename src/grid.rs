//! Grids
//!
//! Evaluation points swept over a feature when marginalizing. Continuous
//! grids always include the observed minimum and maximum so that in-range
//! queries never need extrapolation.
use crate::config::PdpConfig;
use crate::data::{Column, Value};
use crate::errors::PdpError;
use crate::feature::{FeatureDescriptor, FeatureKind};
use crate::predictor::Predictor;
use crate::utils::{linspace, percentiles, unique_sorted};
use log::warn;
use serde::{Deserialize, Serialize};

/// Placement of continuous grid points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GridMethod {
    /// Evenly spaced between the observed minimum and maximum.
    #[default]
    Uniform,
    /// At evenly spaced quantiles of the observed values.
    Quantile,
}

/// Ordered, deduplicated evaluation values for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Grid {
    Continuous(Vec<f64>),
    Categorical(Vec<String>),
}

impl Grid {
    pub fn len(&self) -> usize {
        match self {
            Grid::Continuous(v) => v.len(),
            Grid::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Grid::Continuous(_) => FeatureKind::Continuous,
            Grid::Categorical(_) => FeatureKind::Categorical,
        }
    }

    /// The `i`th grid value.
    pub fn get(&self, i: usize) -> Value {
        match self {
            Grid::Continuous(v) => Value::Number(v[i]),
            Grid::Categorical(v) => Value::Level(v[i].clone()),
        }
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

/// Builds grids from a predictor's training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct GridBuilder {
    pub grid_size: usize,
    pub pair_grid_size: usize,
    pub method: GridMethod,
}

impl Default for GridBuilder {
    fn default() -> Self {
        GridBuilder::from_config(&PdpConfig::default())
    }
}

impl GridBuilder {
    pub fn from_config(config: &PdpConfig) -> Self {
        GridBuilder {
            grid_size: config.grid_size,
            pair_grid_size: config.pair_grid_size,
            method: config.grid_method,
        }
    }

    /// Grid for a single feature.
    ///
    /// * `predictor` - Predictor whose training sample defines the domain.
    /// * `feature` - Name of the feature, must not be the outcome.
    pub fn build(&self, predictor: &Predictor, feature: &str) -> Result<Grid, PdpError> {
        self.build_sized(predictor, feature, self.grid_size)
    }

    /// Grids for both axes of a feature pair, in the order given.
    ///
    /// Continuous axes use `pair_grid_size` points, which keeps the joint
    /// grid, and with it the number of model calls, bounded.
    pub fn build_pair(&self, predictor: &Predictor, a: &str, b: &str) -> Result<(Grid, Grid), PdpError> {
        if a == b {
            return Err(PdpError::DuplicateFeaturePair(a.to_string()));
        }
        let grid_a = self.build_sized(predictor, a, self.pair_grid_size)?;
        let grid_b = self.build_sized(predictor, b, self.pair_grid_size)?;
        Ok((grid_a, grid_b))
    }

    fn build_sized(&self, predictor: &Predictor, feature: &str, size: usize) -> Result<Grid, PdpError> {
        let idx = predictor.feature_index(feature)?;
        let descriptor = &predictor.features()[idx];
        let column = predictor.training_features().column(idx);
        Ok(self.grid_for(descriptor, column, size))
    }

    /// Grid for a described column with `size` points on a continuous axis.
    pub fn grid_for(&self, descriptor: &FeatureDescriptor, column: &Column, size: usize) -> Grid {
        match column {
            Column::Categorical(_) => Grid::Categorical(descriptor.levels().to_vec()),
            Column::Numeric(v) => {
                let distinct = unique_sorted(v);
                if distinct.len() == 1 {
                    warn!(
                        "Feature {:?} has no variance, its grid is the single value {}.",
                        descriptor.name, distinct[0]
                    );
                }
                if distinct.len() <= size {
                    return Grid::Continuous(distinct);
                }
                let (min, max) = (distinct[0], distinct[distinct.len() - 1]);
                let mut points = match self.method {
                    GridMethod::Uniform => linspace(min, max, size),
                    GridMethod::Quantile => percentiles(v, &linspace(0.0, 1.0, size)),
                };
                points[0] = min;
                let last = points.len() - 1;
                points[last] = max;
                points.dedup();
                Grid::Continuous(points)
            }
        }
    }
}
