//! Feature Descriptors
//!
//! The kind and observed domain of each feature, fixed when a
//! [`Predictor`](crate::predictor::Predictor) is constructed.
use crate::constants::DOMAIN_QUANTILES;
use crate::data::{Column, Value};
use crate::errors::PdpError;
use crate::utils::percentiles;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a feature is swept over a numeric range or a set of levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Continuous,
    Categorical,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureKind::Continuous => write!(f, "continuous"),
            FeatureKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Observed values of a feature in the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    /// Range of a continuous feature, with the quantiles in [`DOMAIN_QUANTILES`].
    Continuous { min: f64, max: f64, quantiles: Vec<f64> },
    /// Distinct levels of a categorical feature, in canonical (sorted) order.
    Categorical { levels: Vec<String> },
}

/// Name, kind and domain of a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub name: String,
    pub kind: FeatureKind,
    pub domain: Domain,
}

impl FeatureDescriptor {
    /// Describe a training column.
    ///
    /// * `name` - Name of the feature.
    /// * `column` - Observed values. Must be non-empty, and free of NaN when numeric.
    pub fn from_column(name: &str, column: &Column) -> Result<Self, PdpError> {
        if column.is_empty() {
            return Err(PdpError::EmptyTrainingData);
        }
        let domain = match column {
            Column::Numeric(v) => {
                if let Some(i) = v.iter().position(|x| !x.is_finite()) {
                    return Err(PdpError::SchemaMismatch(format!(
                        "feature {:?} has non finite value {} at row {}",
                        name, v[i], i
                    )));
                }
                let quantiles = percentiles(v, &DOMAIN_QUANTILES);
                let min = v.iter().copied().fold(f64::INFINITY, f64::min);
                let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                Domain::Continuous { min, max, quantiles }
            }
            Column::Categorical(v) => {
                let mut levels = v.clone();
                levels.sort_unstable();
                levels.dedup();
                Domain::Categorical { levels }
            }
        };
        Ok(FeatureDescriptor {
            name: name.to_string(),
            kind: column.kind(),
            domain,
        })
    }

    /// Canonical levels, empty for a continuous feature.
    pub fn levels(&self) -> &[String] {
        match &self.domain {
            Domain::Categorical { levels } => levels,
            Domain::Continuous { .. } => &[],
        }
    }

    /// Position of `level` in the canonical order.
    pub fn level_index(&self, level: &str) -> Option<usize> {
        self.levels().binary_search_by(|l| l.as_str().cmp(level)).ok()
    }

    /// Observed `(min, max)` of a continuous feature.
    pub fn range(&self) -> Option<(f64, f64)> {
        match &self.domain {
            Domain::Continuous { min, max, .. } => Some((*min, *max)),
            Domain::Categorical { .. } => None,
        }
    }

    /// Check that a query value has the right kind for this feature and,
    /// for categorical features, that the level was observed.
    pub fn validate_value(&self, value: &Value) -> Result<(), PdpError> {
        match (self.kind, value) {
            (FeatureKind::Continuous, Value::Number(x)) if x.is_nan() => Err(PdpError::SchemaMismatch(format!(
                "NaN is not a valid value for feature {:?}",
                self.name
            ))),
            (FeatureKind::Continuous, Value::Number(_)) => Ok(()),
            (FeatureKind::Categorical, Value::Level(l)) => match self.level_index(l) {
                Some(_) => Ok(()),
                None => Err(PdpError::UnknownLevel {
                    feature: self.name.clone(),
                    level: l.clone(),
                }),
            },
            (kind, v) => Err(PdpError::SchemaMismatch(format!(
                "value {} does not fit {} feature {:?}",
                v, kind, self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_descriptor() {
        let col = Column::Numeric(vec![3.0, 1.0, 2.0, 5.0, 4.0]);
        let d = FeatureDescriptor::from_column("x", &col).unwrap();
        assert_eq!(d.kind, FeatureKind::Continuous);
        assert_eq!(d.range(), Some((1.0, 5.0)));
        match d.domain {
            Domain::Continuous { ref quantiles, .. } => {
                assert_eq!(quantiles.len(), DOMAIN_QUANTILES.len());
                assert_eq!(quantiles[0], 1.0);
                assert_eq!(quantiles[2], 3.0);
                assert_eq!(quantiles[4], 5.0);
            }
            _ => panic!("expected a continuous domain"),
        }
    }

    #[test]
    fn test_categorical_canonical_order() {
        let col = Column::Categorical(vec!["b".into(), "c".into(), "a".into(), "b".into()]);
        let d = FeatureDescriptor::from_column("c", &col).unwrap();
        assert_eq!(d.levels(), &["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(d.level_index("c"), Some(2));
        assert_eq!(d.level_index("d"), None);
    }

    #[test]
    fn test_descriptor_rejects_nan_and_empty() {
        let col = Column::Numeric(vec![1.0, f64::NAN]);
        assert!(matches!(
            FeatureDescriptor::from_column("x", &col),
            Err(PdpError::SchemaMismatch(_))
        ));
        let col = Column::Numeric(vec![]);
        assert_eq!(FeatureDescriptor::from_column("x", &col), Err(PdpError::EmptyTrainingData));
    }

    #[test]
    fn test_validate_value() {
        let d = FeatureDescriptor::from_column("c", &Column::Categorical(vec!["a".into()])).unwrap();
        assert!(d.validate_value(&Value::from("a")).is_ok());
        assert_eq!(
            d.validate_value(&Value::from("q")),
            Err(PdpError::UnknownLevel {
                feature: "c".into(),
                level: "q".into()
            })
        );
        assert!(matches!(
            d.validate_value(&Value::Number(1.0)),
            Err(PdpError::SchemaMismatch(_))
        ));
        let x = FeatureDescriptor::from_column("x", &Column::Numeric(vec![0.0, 1.0])).unwrap();
        assert!(x.validate_value(&Value::Number(10.0)).is_ok());
        assert!(x.validate_value(&Value::Number(f64::NAN)).is_err());
    }
}
