//! Partial Dependence Functions
//!
//! Marginal average predictions stored over a grid, queryable at arbitrary
//! values. Continuous axes are linearly interpolated and clamped to the
//! observed range, categorical axes are looked up exactly.
use crate::data::{RowMajorMatrix, Value};
use crate::errors::PdpError;
use crate::feature::FeatureDescriptor;
use crate::grid::Grid;
use crate::utils::{interpolate, interpolation_weight, lerp, mean};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Serializable view of a one dimensional function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdpSeries {
    pub feature: String,
    pub grid: Vec<Value>,
    pub values: Vec<f64>,
}

/// Locate a query on one axis, as a grid index and the weight towards the next index.
fn locate(feature: &FeatureDescriptor, grid: &Grid, value: &Value) -> Result<(usize, f64), PdpError> {
    feature.validate_value(value)?;
    match (grid, value) {
        (Grid::Continuous(g), Value::Number(x)) => Ok(interpolation_weight(g, *x)),
        (Grid::Categorical(levels), Value::Level(l)) => levels
            .binary_search(l)
            .map(|i| (i, 0.0))
            .map_err(|_| PdpError::UnknownLevel {
                feature: feature.name.clone(),
                level: l.clone(),
            }),
        (_, v) => Err(PdpError::SchemaMismatch(format!(
            "value {} does not fit feature {:?}",
            v, feature.name
        ))),
    }
}

/// Partial dependence of the prediction on a single feature.
#[derive(Debug, Clone, PartialEq)]
pub struct PdpFunction {
    feature: Arc<FeatureDescriptor>,
    grid: Grid,
    values: Vec<f64>,
}

impl PdpFunction {
    /// * `feature` - Descriptor shared with the predictor.
    /// * `grid` - Evaluation grid.
    /// * `values` - Marginal average prediction at each grid value.
    pub(crate) fn new(feature: Arc<FeatureDescriptor>, grid: Grid, values: Vec<f64>) -> Self {
        debug_assert_eq!(grid.len(), values.len(), "one value is required per grid point");
        PdpFunction { feature, grid, values }
    }

    pub fn feature(&self) -> &FeatureDescriptor {
        &self.feature
    }

    pub fn name(&self) -> &str {
        &self.feature.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Estimated marginal prediction at `value`.
    ///
    /// Fails with `UnknownLevel` for a categorical level not observed in
    /// training, and with `SchemaMismatch` for a value of the wrong kind.
    pub fn evaluate(&self, value: &Value) -> Result<f64, PdpError> {
        match (&self.grid, value) {
            (Grid::Continuous(g), Value::Number(x)) => {
                self.feature.validate_value(value)?;
                Ok(interpolate(g, &self.values, *x))
            }
            _ => locate(&self.feature, &self.grid, value).map(|(i, _)| self.values[i]),
        }
    }

    pub fn evaluate_many(&self, values: &[Value]) -> Result<Vec<f64>, PdpError> {
        values.iter().map(|v| self.evaluate(v)).collect()
    }

    /// Mean of the function over its grid.
    pub fn average(&self) -> f64 {
        mean(&self.values)
    }

    pub fn series(&self) -> PdpSeries {
        PdpSeries {
            feature: self.feature.name.clone(),
            grid: self.grid.values(),
            values: self.values.clone(),
        }
    }
}

/// Partial dependence of the prediction on a pair of features.
///
/// Values are laid out with one row per grid value of the first feature
/// and one column per grid value of the second.
#[derive(Debug, Clone, PartialEq)]
pub struct PdpFunction2d {
    features: [Arc<FeatureDescriptor>; 2],
    grids: [Grid; 2],
    values: RowMajorMatrix<f64>,
}

impl PdpFunction2d {
    pub(crate) fn new(
        features: [Arc<FeatureDescriptor>; 2],
        grids: [Grid; 2],
        values: RowMajorMatrix<f64>,
    ) -> Self {
        debug_assert!(values.is_complete());
        debug_assert_eq!(values.rows, grids[0].len(), "one row is required per first axis grid point");
        debug_assert_eq!(values.cols, grids[1].len(), "one column is required per second axis grid point");
        PdpFunction2d {
            features,
            grids,
            values,
        }
    }

    pub fn features(&self) -> [&FeatureDescriptor; 2] {
        [&self.features[0], &self.features[1]]
    }

    /// Feature names, in axis order.
    pub fn names(&self) -> (&str, &str) {
        (&self.features[0].name, &self.features[1].name)
    }

    pub fn grids(&self) -> &[Grid; 2] {
        &self.grids
    }

    pub fn values(&self) -> &RowMajorMatrix<f64> {
        &self.values
    }

    /// Estimated marginal prediction at `(a, b)`, given in axis order.
    ///
    /// Bilinear when both features are continuous, exact on any categorical
    /// axis with linear interpolation along a remaining continuous one.
    pub fn evaluate(&self, a: &Value, b: &Value) -> Result<f64, PdpError> {
        let (i, ta) = locate(&self.features[0], &self.grids[0], a)?;
        let (j, tb) = locate(&self.features[1], &self.grids[1], b)?;
        let low = lerp(self.values.get_row(i), j, tb);
        if ta == 0.0 {
            Ok(low)
        } else {
            let high = lerp(self.values.get_row(i + 1), j, tb);
            Ok(low + ta * (high - low))
        }
    }

    /// The same function with the axes swapped.
    pub fn transposed(&self) -> Self {
        PdpFunction2d {
            features: [self.features[1].clone(), self.features[0].clone()],
            grids: [self.grids[1].clone(), self.grids[0].clone()],
            values: self.values.transpose(),
        }
    }
}
