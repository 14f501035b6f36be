//! Predictor
//!
//! A fitted model frozen together with its training sample and task. All
//! partial dependence computations go through [`Predictor::predict`], which
//! validates the batch schema and reduces raw model output to one scalar
//! per row.
use crate::data::{Column, Frame};
use crate::errors::PdpError;
use crate::feature::FeatureDescriptor;
use crate::model::{Model, ModelOutput};
use crate::utils::items_to_strings;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prediction task, which decides how raw model output becomes a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Task {
    /// Model output is used as is.
    Regression,
    /// Model output is reduced to the probability of `positive_class`
    /// (one vs rest for multiclass models).
    Classification { positive_class: String },
}

impl Task {
    pub fn classification(positive_class: &str) -> Self {
        Task::Classification {
            positive_class: positive_class.to_string(),
        }
    }
}

/// Trained model, training data and task metadata.
///
/// A predictor is immutable once built; share it with `Arc` so every
/// interpreter derived from it sees the same model and sample.
pub struct Predictor {
    model: Arc<dyn Model>,
    data: Frame,
    features: Frame,
    outcome_name: String,
    task: Task,
    descriptors: Vec<Arc<FeatureDescriptor>>,
}

impl Predictor {
    /// Wrap a fitted model.
    ///
    /// * `model` - The fitted model.
    /// * `data` - Training sample, including the outcome column.
    /// * `outcome_name` - Name of the outcome column. Every other column is a feature.
    /// * `task` - Regression or classification.
    pub fn new<M: Model + 'static>(model: M, data: Frame, outcome_name: &str, task: Task) -> Result<Self, PdpError> {
        let outcome = data.column_by_name(outcome_name).ok_or_else(|| {
            PdpError::SchemaMismatch(format!(
                "outcome {:?} is not one of the columns {}",
                outcome_name,
                items_to_strings(data.names())
            ))
        })?;
        if data.n_rows() == 0 {
            return Err(PdpError::EmptyTrainingData);
        }
        validate_task(&task, outcome_name, outcome)?;

        let features = data.without(outcome_name)?;
        if features.n_cols() == 0 {
            return Err(PdpError::SchemaMismatch(
                "training data has no feature columns besides the outcome".to_string(),
            ));
        }
        let descriptors = features
            .names()
            .iter()
            .zip(features.columns())
            .map(|(name, col)| FeatureDescriptor::from_column(name, col).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Predictor built on {} rows with features {}.",
            data.n_rows(),
            items_to_strings(features.names())
        );

        Ok(Predictor {
            model: Arc::new(model),
            data,
            features,
            outcome_name: outcome_name.to_string(),
            task,
            descriptors,
        })
    }

    /// Predict one normalized value per row of `rows`.
    ///
    /// `rows` must hold exactly the feature columns, with the same kinds as
    /// the training data. Columns are reordered to the training order when
    /// needed.
    pub fn predict(&self, rows: &Frame) -> Result<Vec<f64>, PdpError> {
        let ordered;
        let batch = if rows.names() == self.features.names() {
            rows
        } else {
            self.check_feature_set(rows)?;
            ordered = rows.select(self.features.names())?;
            &ordered
        };
        for (d, col) in self.descriptors.iter().zip(batch.columns()) {
            if d.kind != col.kind() {
                return Err(PdpError::SchemaMismatch(format!(
                    "feature {:?} is {} but a {} column was given",
                    d.name,
                    d.kind,
                    col.kind()
                )));
            }
        }
        let output = self.model.predict(batch).map_err(|e| match e {
            PdpError::ModelInvocationError(_) => e,
            e => PdpError::ModelInvocationError(e.to_string()),
        })?;
        self.normalize(output, batch.n_rows())
    }

    /// Predictions on the unmodified training features.
    pub fn predict_training(&self) -> Result<Vec<f64>, PdpError> {
        self.predict(&self.features)
    }

    fn check_feature_set(&self, rows: &Frame) -> Result<(), PdpError> {
        let matches = rows.n_cols() == self.features.n_cols()
            && self.features.names().iter().all(|n| rows.position(n).is_some());
        if matches {
            Ok(())
        } else {
            Err(PdpError::SchemaMismatch(format!(
                "expected feature columns [{}], got [{}]",
                items_to_strings(self.features.names()),
                items_to_strings(rows.names())
            )))
        }
    }

    fn normalize(&self, output: ModelOutput, rows: usize) -> Result<Vec<f64>, PdpError> {
        if output.len() != rows {
            return Err(PdpError::ModelInvocationError(format!(
                "model returned {} predictions for {} rows",
                output.len(),
                rows
            )));
        }
        let preds = match (&self.task, output) {
            (_, ModelOutput::Scores(v)) => v,
            (Task::Regression, _) => {
                return Err(PdpError::ModelInvocationError(
                    "regression models must return numeric scores".to_string(),
                ))
            }
            (Task::Classification { positive_class }, ModelOutput::Probabilities { classes, values }) => {
                let col = classes.iter().position(|c| c == positive_class).ok_or_else(|| {
                    PdpError::ModelInvocationError(format!(
                        "class {:?} missing from model output classes [{}]",
                        positive_class,
                        items_to_strings(&classes)
                    ))
                })?;
                if values.cols != classes.len() {
                    return Err(PdpError::ModelInvocationError(format!(
                        "{} probability columns for {} classes",
                        values.cols,
                        classes.len()
                    )));
                }
                if !values.is_complete() {
                    return Err(PdpError::ModelInvocationError(format!(
                        "probability matrix holds {} values for {} rows of {} classes",
                        values.data.len(),
                        values.rows,
                        values.cols
                    )));
                }
                (0..values.rows).map(|i| *values.get(i, col)).collect()
            }
            (Task::Classification { positive_class }, ModelOutput::Labels(labels)) => labels
                .iter()
                .map(|l| if l == positive_class { 1.0 } else { 0.0 })
                .collect(),
        };
        if let Some(row) = preds.iter().position(|p| !p.is_finite()) {
            return Err(PdpError::InvalidPrediction { row, value: preds[row] });
        }
        Ok(preds)
    }

    /// Feature descriptors, in training column order.
    pub fn features(&self) -> &[Arc<FeatureDescriptor>] {
        &self.descriptors
    }

    pub fn feature(&self, name: &str) -> Result<&Arc<FeatureDescriptor>, PdpError> {
        self.feature_index(name).map(|i| &self.descriptors[i])
    }

    /// Position of a feature in the training column order.
    pub fn feature_index(&self, name: &str) -> Result<usize, PdpError> {
        if name == self.outcome_name {
            return Err(PdpError::InvalidFeature(format!(
                "{:?} is the outcome, not a feature",
                name
            )));
        }
        self.features.position(name).ok_or_else(|| {
            PdpError::InvalidFeature(format!(
                "{:?} is not one of the features {}",
                name,
                items_to_strings(self.features.names())
            ))
        })
    }

    pub fn feature_names(&self) -> &[String] {
        self.features.names()
    }

    pub fn outcome_name(&self) -> &str {
        &self.outcome_name
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Full training data, including the outcome.
    pub fn training_data(&self) -> &Frame {
        &self.data
    }

    /// Training data restricted to the feature columns.
    pub fn training_features(&self) -> &Frame {
        &self.features
    }

    pub fn n_rows(&self) -> usize {
        self.data.n_rows()
    }
}

fn validate_task(task: &Task, outcome_name: &str, outcome: &Column) -> Result<(), PdpError> {
    match (task, outcome) {
        (Task::Regression, Column::Numeric(_)) => Ok(()),
        (Task::Regression, Column::Categorical(_)) => Err(PdpError::InvalidTask(format!(
            "regression requires a numeric outcome, {:?} is categorical",
            outcome_name
        ))),
        (Task::Classification { positive_class }, Column::Categorical(levels)) => {
            if levels.contains(positive_class) {
                Ok(())
            } else {
                let mut observed = levels.clone();
                observed.sort_unstable();
                observed.dedup();
                Err(PdpError::InvalidTask(format!(
                    "positive class {:?} is not one of the observed outcomes {}",
                    positive_class,
                    items_to_strings(&observed)
                )))
            }
        }
        (Task::Classification { positive_class }, Column::Numeric(values)) => {
            match positive_class.parse::<f64>() {
                Ok(p) if values.contains(&p) => Ok(()),
                _ => Err(PdpError::InvalidTask(format!(
                    "positive class {:?} is not an observed value of numeric outcome {:?}",
                    positive_class, outcome_name
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RowMajorMatrix, Value};
    use crate::model::{FnModel, LinearModel};

    fn data() -> Frame {
        Frame::new(vec![
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0])),
            ("c", Column::Categorical(vec!["a".into(), "b".into(), "a".into()])),
            ("y", Column::Numeric(vec![2.0, 4.0, 6.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_predict_regression() {
        let p = Predictor::new(LinearModel::new(0.0).set_coefficient("x", 2.0), data(), "y", Task::Regression)
            .unwrap();
        assert_eq!(p.feature_names(), &["x".to_string(), "c".to_string()]);
        assert_eq!(p.predict_training().unwrap(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_outcome_not_in_data() {
        let p = Predictor::new(LinearModel::new(0.0), data(), "z", Task::Regression);
        assert!(matches!(p, Err(PdpError::SchemaMismatch(_))));
    }

    #[test]
    fn test_invalid_task() {
        let p = Predictor::new(LinearModel::new(0.0), data(), "c", Task::Regression);
        assert!(matches!(p, Err(PdpError::InvalidTask(_))));
        let p = Predictor::new(LinearModel::new(0.0), data(), "c", Task::classification("q"));
        assert!(matches!(p, Err(PdpError::InvalidTask(_))));
        let p = Predictor::new(LinearModel::new(0.0), data(), "y", Task::classification("3.0"));
        assert!(matches!(p, Err(PdpError::InvalidTask(_))));
        assert!(Predictor::new(LinearModel::new(0.0), data(), "y", Task::classification("4")).is_ok());
    }

    #[test]
    fn test_empty_training_data() {
        let empty = Frame::new(vec![("x", Column::Numeric(vec![])), ("y", Column::Numeric(vec![]))]).unwrap();
        let p = Predictor::new(LinearModel::new(0.0), empty, "y", Task::Regression);
        assert!(matches!(p, Err(PdpError::EmptyTrainingData)));
    }

    #[test]
    fn test_schema_mismatch_on_predict() {
        let p = Predictor::new(LinearModel::new(0.0), data(), "y", Task::Regression).unwrap();
        let wrong = Frame::new(vec![("x", Column::Numeric(vec![1.0]))]).unwrap();
        assert!(matches!(p.predict(&wrong), Err(PdpError::SchemaMismatch(_))));
        let wrong_kind = Frame::new(vec![
            ("x", Column::Categorical(vec!["1".into()])),
            ("c", Column::Categorical(vec!["a".into()])),
        ])
        .unwrap();
        assert!(matches!(p.predict(&wrong_kind), Err(PdpError::SchemaMismatch(_))));
        // Reordered columns are accepted.
        let reordered = Frame::from_rows(&["c", "x"], &[vec![Value::from("a"), Value::Number(1.0)]]).unwrap();
        assert_eq!(p.predict(&reordered).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_prediction() {
        let m = FnModel::new(|b: &Frame| {
            let mut v = vec![1.0; b.n_rows()];
            v[1] = f64::NAN;
            Ok(ModelOutput::Scores(v))
        });
        let p = Predictor::new(m, data(), "y", Task::Regression).unwrap();
        match p.predict_training() {
            Err(PdpError::InvalidPrediction { row, value }) => {
                assert_eq!(row, 1);
                assert!(value.is_nan());
            }
            _ => panic!("expected an invalid prediction"),
        }
    }

    #[test]
    fn test_wrong_output_length() {
        let m = FnModel::new(|_: &Frame| Ok(ModelOutput::Scores(vec![1.0])));
        let p = Predictor::new(m, data(), "y", Task::Regression).unwrap();
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_classification_probabilities() {
        let m = FnModel::new(|b: &Frame| {
            let n = b.n_rows();
            let mut values = Vec::with_capacity(n * 3);
            for _ in 0..n {
                values.extend([0.2, 0.5, 0.3]);
            }
            Ok(ModelOutput::Probabilities {
                classes: vec!["1".into(), "2".into(), "3".into()],
                values: RowMajorMatrix::new(values, n, 3),
            })
        });
        let d = Frame::new(vec![
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0])),
            ("label", Column::Categorical(vec!["1".into(), "2".into(), "3".into()])),
        ])
        .unwrap();
        let p = Predictor::new(m, d, "label", Task::classification("2")).unwrap();
        assert_eq!(p.predict_training().unwrap(), vec![0.5, 0.5, 0.5]);
    }

    fn probability_predictor(classes: &[&str], values: RowMajorMatrix<f64>) -> Predictor {
        let classes: Vec<String> = classes.iter().map(|c| c.to_string()).collect();
        let m = FnModel::new(move |_: &Frame| {
            Ok(ModelOutput::Probabilities {
                classes: classes.clone(),
                values: values.clone(),
            })
        });
        let d = Frame::new(vec![
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0])),
            ("label", Column::Categorical(vec!["a".into(), "b".into(), "a".into()])),
        ])
        .unwrap();
        Predictor::new(m, d, "label", Task::classification("b")).unwrap()
    }

    #[test]
    fn test_short_probability_matrix() {
        let values = RowMajorMatrix {
            data: vec![0.1, 0.9],
            rows: 3,
            cols: 2,
        };
        let p = probability_predictor(&["a", "b"], values);
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_positive_class_missing_from_probabilities() {
        let values = RowMajorMatrix::new(vec![0.5; 6], 3, 2);
        let p = probability_predictor(&["a", "c"], values);
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_probability_columns_differ_from_classes() {
        let values = RowMajorMatrix::new(vec![0.2; 9], 3, 3);
        let p = probability_predictor(&["a", "b"], values);
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_model_errors_become_invocation_errors() {
        let m = FnModel::new(|_: &Frame| -> Result<ModelOutput, PdpError> {
            Err(PdpError::UnknownLevel {
                feature: "internal".to_string(),
                level: "boom".to_string(),
            })
        });
        let p = Predictor::new(m, data(), "y", Task::Regression).unwrap();
        match p.predict_training() {
            Err(PdpError::ModelInvocationError(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected a model invocation error, got {:?}", other),
        }

        // A linear model referring to a column that is not a feature.
        let p = Predictor::new(LinearModel::new(0.0).set_coefficient("w", 1.0), data(), "y", Task::Regression)
            .unwrap();
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_classification_labels() {
        let m = FnModel::new(|b: &Frame| {
            let c = b.column_by_name("c").unwrap().as_categorical().unwrap();
            Ok(ModelOutput::Labels(
                c.iter()
                    .map(|l| (if l == "a" { "4" } else { "2" }).to_string())
                    .collect(),
            ))
        });
        let p = Predictor::new(m, data(), "y", Task::classification("4")).unwrap();
        assert_eq!(p.predict_training().unwrap(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_labels_for_regression() {
        let m = FnModel::new(|b: &Frame| Ok(ModelOutput::Labels(vec!["a".into(); b.n_rows()])));
        let p = Predictor::new(m, data(), "y", Task::Regression).unwrap();
        assert!(matches!(p.predict_training(), Err(PdpError::ModelInvocationError(_))));
    }

    #[test]
    fn test_feature_lookup() {
        let p = Predictor::new(LinearModel::new(0.0), data(), "y", Task::Regression).unwrap();
        assert_eq!(p.feature_index("c").unwrap(), 1);
        assert!(matches!(p.feature("y"), Err(PdpError::InvalidFeature(_))));
        assert!(matches!(p.feature("nope"), Err(PdpError::InvalidFeature(_))));
    }
}
