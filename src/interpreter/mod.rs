//! Interpreter
//!
//! Builds partial dependence functions by Friedman's estimator: for each
//! grid value the target feature(s) are overwritten in every training row,
//! the model predicts the modified sample, and the predictions are averaged.
//! One dimensional functions are built for every feature at construction,
//! two dimensional ones only for the pairs that are requested.

// private modules
mod setters;

pub use setters::InterpreterBuilder;

use crate::config::PdpConfig;
use crate::data::{RowMajorMatrix, Value};
use crate::errors::PdpError;
use crate::grid::{Grid, GridBuilder};
use crate::pdp::{PdpFunction, PdpFunction2d};
use crate::predictor::Predictor;
use crate::utils::{fmt_vec_output, mean};
use hashbrown::HashMap;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Unordered pair of feature names, stored in training column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeaturePair {
    first: String,
    second: String,
}

impl FeaturePair {
    /// Canonical pair for two feature names, plus whether the given order was reversed.
    pub fn new(predictor: &Predictor, a: &str, b: &str) -> Result<(Self, bool), PdpError> {
        if a == b {
            return Err(PdpError::DuplicateFeaturePair(a.to_string()));
        }
        let ia = predictor.feature_index(a)?;
        let ib = predictor.feature_index(b)?;
        let swapped = ib < ia;
        let (first, second) = if swapped { (b, a) } else { (a, b) };
        Ok((
            FeaturePair {
                first: first.to_string(),
                second: second.to_string(),
            },
            swapped,
        ))
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

/// A grid point: the training columns to overwrite and their values.
type Point = Vec<(usize, Value)>;

/// Partial dependence functions of a single predictor.
pub struct Interpreter {
    predictor: Arc<Predictor>,
    config: PdpConfig,
    grid_builder: GridBuilder,
    pool: Option<rayon::ThreadPool>,
    average_prediction: f64,
    functions_1d: Vec<Arc<PdpFunction>>,
    index_1d: HashMap<String, usize>,
    functions_2d: Vec<(FeaturePair, Arc<PdpFunction2d>)>,
    index_2d: HashMap<FeaturePair, usize>,
}

impl Interpreter {
    /// Build functions for every feature, and for `pairs`, with the default configuration.
    ///
    /// * `predictor` - The frozen predictor to interpret.
    /// * `pairs` - Feature pairs to build two dimensional functions for.
    pub fn new<S: AsRef<str>>(predictor: Arc<Predictor>, pairs: &[(S, S)]) -> Result<Self, PdpError> {
        Interpreter::with_config(predictor, PdpConfig::default(), pairs)
    }

    /// Build functions for every feature, and for `pairs`.
    pub fn with_config<S: AsRef<str>>(
        predictor: Arc<Predictor>,
        config: PdpConfig,
        pairs: &[(S, S)],
    ) -> Result<Self, PdpError> {
        config.validate()?;
        let start = Instant::now();
        let pool = match (config.parallel, config.num_threads) {
            (true, Some(n)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| {
                        PdpError::InvalidParameter(
                            "num_threads".to_string(),
                            "a valid thread count".to_string(),
                            e.to_string(),
                        )
                    })?,
            ),
            _ => None,
        };
        let average_prediction = mean(&predictor.predict_training()?);

        let mut interpreter = Interpreter {
            grid_builder: GridBuilder::from_config(&config),
            predictor,
            config,
            pool,
            average_prediction,
            functions_1d: Vec::new(),
            index_1d: HashMap::new(),
            functions_2d: Vec::new(),
            index_2d: HashMap::new(),
        };

        let names = interpreter.predictor.feature_names().to_vec();
        for name in names.iter() {
            let function = interpreter.build_1d(name)?;
            interpreter.index_1d.insert(name.clone(), interpreter.functions_1d.len());
            interpreter.functions_1d.push(Arc::new(function));
        }
        for (a, b) in pairs {
            interpreter.register_pair(a.as_ref(), b.as_ref())?;
        }

        info!(
            "Built partial dependence for {} features and {} pairs over {} rows in {:.3} seconds.",
            interpreter.functions_1d.len(),
            interpreter.functions_2d.len(),
            interpreter.predictor.n_rows(),
            start.elapsed().as_secs_f32()
        );
        Ok(interpreter)
    }

    /// Register a feature pair, building its function if it is new.
    ///
    /// Registering a pair that already exists, in either order, is a no-op.
    pub fn add_pair(&mut self, a: &str, b: &str) -> Result<Arc<PdpFunction2d>, PdpError> {
        let idx = self.register_pair(a, b)?;
        Ok(self.functions_2d[idx].1.clone())
    }

    fn register_pair(&mut self, a: &str, b: &str) -> Result<usize, PdpError> {
        let (pair, _) = FeaturePair::new(&self.predictor, a, b)?;
        if let Some(idx) = self.index_2d.get(&pair) {
            return Ok(*idx);
        }
        let function = self.build_2d(&pair)?;
        info!(
            "Registered feature pair ({}, {}) with a {}x{} grid.",
            pair.first,
            pair.second,
            function.values().rows,
            function.values().cols
        );
        let idx = self.functions_2d.len();
        self.index_2d.insert(pair.clone(), idx);
        self.functions_2d.push((pair, Arc::new(function)));
        Ok(idx)
    }

    fn build_1d(&self, name: &str) -> Result<PdpFunction, PdpError> {
        let col = self.predictor.feature_index(name)?;
        let grid = self.grid_builder.build(&self.predictor, name)?;
        let points: Vec<Point> = grid.values().into_iter().map(|v| vec![(col, v)]).collect();
        let values = self.marginalize(&points)?;
        if values.len() <= 10 {
            debug!("Partial dependence of {}: [{}]", name, fmt_vec_output(&values));
        } else {
            debug!("Partial dependence of {} over {} grid points.", name, values.len());
        }
        Ok(PdpFunction::new(self.predictor.features()[col].clone(), grid, values))
    }

    fn build_2d(&self, pair: &FeaturePair) -> Result<PdpFunction2d, PdpError> {
        let ia = self.predictor.feature_index(&pair.first)?;
        let ib = self.predictor.feature_index(&pair.second)?;
        let (grid_a, grid_b) = self.grid_builder.build_pair(&self.predictor, &pair.first, &pair.second)?;
        let values_b = grid_b.values();
        let points: Vec<Point> = grid_a
            .values()
            .into_iter()
            .flat_map(|va| values_b.iter().map(move |vb| vec![(ia, va.clone()), (ib, vb.clone())]))
            .collect();
        let values = self.marginalize(&points)?;
        let features = [self.predictor.features()[ia].clone(), self.predictor.features()[ib].clone()];
        let matrix = RowMajorMatrix::new(values, grid_a.len(), grid_b.len());
        Ok(PdpFunction2d::new(features, [grid_a, grid_b], matrix))
    }

    /// Average prediction over the training sample at each grid point.
    ///
    /// Any invalid prediction aborts the whole computation, a skipped row
    /// would bias the average. Results are returned in point order whether
    /// or not the work runs in parallel.
    fn marginalize(&self, points: &[Point]) -> Result<Vec<f64>, PdpError> {
        let base = self.predictor.training_features();
        let run = |point: &Point| -> Result<f64, PdpError> {
            let mut batch = base.clone();
            for (col, value) in point {
                batch.set_constant(*col, value)?;
            }
            let preds = self.predictor.predict(&batch)?;
            Ok(mean(&preds))
        };
        if !self.config.parallel {
            return points.iter().map(run).collect();
        }
        let job = || points.par_iter().map(run).collect::<Result<Vec<f64>, PdpError>>();
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    /// One dimensional function of a feature.
    pub fn function(&self, name: &str) -> Result<&Arc<PdpFunction>, PdpError> {
        match self.index_1d.get(name) {
            Some(idx) => Ok(&self.functions_1d[*idx]),
            None => Err(self
                .predictor
                .feature_index(name)
                .err()
                .unwrap_or_else(|| PdpError::InvalidFeature(name.to_string()))),
        }
    }

    /// Two dimensional function of a registered pair, given in either order.
    ///
    /// The function's axes are in training column order, see [`FeaturePair`].
    pub fn function_2d(&self, a: &str, b: &str) -> Result<Option<&Arc<PdpFunction2d>>, PdpError> {
        let (pair, _) = FeaturePair::new(&self.predictor, a, b)?;
        Ok(self.index_2d.get(&pair).map(|idx| &self.functions_2d[*idx].1))
    }

    /// One dimensional functions, in training column order.
    pub fn functions_1d(&self) -> impl Iterator<Item = (&str, &Arc<PdpFunction>)> {
        self.functions_1d.iter().map(|f| (f.name(), f))
    }

    /// Two dimensional functions, in registration order.
    pub fn functions_2d(&self) -> impl Iterator<Item = (&FeaturePair, &Arc<PdpFunction2d>)> {
        self.functions_2d.iter().map(|(p, f)| (p, f))
    }

    /// Evaluate the function of `feature` at `value`.
    pub fn evaluate(&self, feature: &str, value: &Value) -> Result<f64, PdpError> {
        self.function(feature)?.evaluate(value)
    }

    /// Evaluate the function of a registered pair, with values given in the
    /// same order as the names.
    pub fn evaluate_2d(&self, a: &str, value_a: &Value, b: &str, value_b: &Value) -> Result<f64, PdpError> {
        let (pair, swapped) = FeaturePair::new(&self.predictor, a, b)?;
        let function = match self.index_2d.get(&pair) {
            Some(idx) => &self.functions_2d[*idx].1,
            None => {
                return Err(PdpError::InvalidFeature(format!(
                    "pair ({}, {}) has not been registered",
                    a, b
                )))
            }
        };
        if swapped {
            function.evaluate(value_b, value_a)
        } else {
            function.evaluate(value_a, value_b)
        }
    }

    /// Mean prediction over the unmodified training sample.
    pub fn average_prediction(&self) -> f64 {
        self.average_prediction
    }

    pub fn predictor(&self) -> &Arc<Predictor> {
        &self.predictor
    }

    pub fn config(&self) -> &PdpConfig {
        &self.config
    }

    /// Grid used for a feature's one dimensional function.
    pub fn grid(&self, feature: &str) -> Result<&Grid, PdpError> {
        self.function(feature).map(|f| f.grid())
    }
}
