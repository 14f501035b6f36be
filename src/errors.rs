//! Errors
//!
//! Custom error types used throughout the `pardep` crate.
use thiserror::Error;

/// Errors that can occur while building or querying partial dependence functions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PdpError {
    /// Data does not match the schema fixed at construction.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// The task is not valid for the outcome column.
    #[error("Invalid task: {0}")]
    InvalidTask(String),
    /// The underlying model failed or returned malformed output.
    #[error("Model invocation failed: {0}")]
    ModelInvocationError(String),
    /// The model returned a missing or non finite prediction.
    #[error("The model returned an invalid prediction {value} for row {row}.")]
    InvalidPrediction { row: usize, value: f64 },
    /// Feature is not part of the feature set.
    #[error("Invalid feature: {0}")]
    InvalidFeature(String),
    /// Level was not observed in the training data.
    #[error("Level {level:?} was not observed for feature {feature:?}.")]
    UnknownLevel { feature: String, level: String },
    /// Training data has no rows.
    #[error("Training data contains no rows.")]
    EmptyTrainingData,
    /// A feature pair that names the same feature twice.
    #[error("Feature pair must name two distinct features, {0:?} was given twice.")]
    DuplicateFeaturePair(String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to write to file.
    #[error("Unable to write to file: {0}")]
    UnableToWrite(String),
    /// Unable to read from file.
    #[error("Unable to read from file: {0}")]
    UnableToRead(String),
}
