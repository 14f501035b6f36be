//! Model Adapters
//!
//! The prediction capability a [`Predictor`](crate::predictor::Predictor) wraps.
//! Any fitted estimator is usable once it implements [`Model`]; closures are
//! adapted through [`FnModel`], and [`LinearModel`] covers fixed additive models.
use crate::data::{Column, Frame, RowMajorMatrix};
use crate::errors::PdpError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Raw output of a model for a batch of rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// One number per row: a regression value, or a positive class probability.
    Scores(Vec<f64>),
    /// Class probabilities, one row per record and one column per class.
    Probabilities {
        classes: Vec<String>,
        values: RowMajorMatrix<f64>,
    },
    /// Predicted class label per row.
    Labels(Vec<String>),
}

impl ModelOutput {
    /// Number of rows the output covers.
    pub fn len(&self) -> usize {
        match self {
            ModelOutput::Scores(v) => v.len(),
            ModelOutput::Probabilities { values, .. } => values.rows,
            ModelOutput::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fitted model that maps a batch of feature rows to predictions.
///
/// Implementations must be pure queries: the same batch always yields the
/// same output.
pub trait Model: Send + Sync {
    fn predict(&self, batch: &Frame) -> Result<ModelOutput, PdpError>;
}

impl<M: Model + ?Sized> Model for Arc<M> {
    fn predict(&self, batch: &Frame) -> Result<ModelOutput, PdpError> {
        (**self).predict(batch)
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn predict(&self, batch: &Frame) -> Result<ModelOutput, PdpError> {
        (**self).predict(batch)
    }
}

/// Adapter for any prediction closure.
pub struct FnModel<F> {
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&Frame) -> Result<ModelOutput, PdpError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnModel { f }
    }
}

impl<F> Model for FnModel<F>
where
    F: Fn(&Frame) -> Result<ModelOutput, PdpError> + Send + Sync,
{
    fn predict(&self, batch: &Frame) -> Result<ModelOutput, PdpError> {
        (self.f)(batch)
    }
}

/// Output transformation applied to a linear predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Link {
    #[default]
    Identity,
    /// Sigmoid, producing a probability in (0, 1).
    Logistic,
}

/// Fixed additive model.
///
/// The prediction for a row is the intercept, plus each numeric feature's
/// coefficient times its value, plus the offset of each categorical
/// feature's level (levels without an offset contribute zero), passed
/// through the [`Link`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: HashMap<String, f64>,
    pub level_offsets: HashMap<String, HashMap<String, f64>>,
    pub link: Link,
}

impl LinearModel {
    pub fn new(intercept: f64) -> Self {
        LinearModel {
            intercept,
            ..Default::default()
        }
    }

    /// Set the coefficient of a numeric feature.
    pub fn set_coefficient(mut self, feature: &str, coefficient: f64) -> Self {
        self.coefficients.insert(feature.to_string(), coefficient);
        self
    }

    /// Set the offset added when a categorical feature takes `level`.
    pub fn set_level_offset(mut self, feature: &str, level: &str, offset: f64) -> Self {
        self.level_offsets
            .entry(feature.to_string())
            .or_default()
            .insert(level.to_string(), offset);
        self
    }

    pub fn set_link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }
}

impl Model for LinearModel {
    fn predict(&self, batch: &Frame) -> Result<ModelOutput, PdpError> {
        let mut eta = vec![self.intercept; batch.n_rows()];
        for name in self.coefficients.keys().chain(self.level_offsets.keys()) {
            if batch.position(name).is_none() {
                return Err(PdpError::SchemaMismatch(format!(
                    "linear model term {:?} is not a column of the batch",
                    name
                )));
            }
        }
        // Batch column order keeps the summation order fixed.
        for (name, column) in batch.names().iter().zip(batch.columns()) {
            match column {
                Column::Numeric(v) => {
                    if let Some(c) = self.coefficients.get(name) {
                        eta.iter_mut().zip(v).for_each(|(e, x)| *e += c * x);
                    }
                }
                Column::Categorical(v) => {
                    if let Some(offsets) = self.level_offsets.get(name) {
                        eta.iter_mut()
                            .zip(v)
                            .for_each(|(e, l)| *e += offsets.get(l).copied().unwrap_or(0.0));
                    }
                }
            }
        }
        if self.link == Link::Logistic {
            eta.iter_mut().for_each(|e| *e = 1.0 / (1.0 + (-*e).exp()));
        }
        Ok(ModelOutput::Scores(eta))
    }
}
