use crate::config::PdpConfig;
use crate::errors::PdpError;
use crate::grid::GridMethod;
use crate::interpreter::Interpreter;
use crate::predictor::Predictor;
use std::sync::Arc;

/// Builder for an [`Interpreter`].
///
/// Start from the default configuration and use the relevant `set_`
/// methods for any parameters you would like to adjust.
pub struct InterpreterBuilder {
    predictor: Arc<Predictor>,
    config: PdpConfig,
    pairs: Vec<(String, String)>,
}

impl InterpreterBuilder {
    pub fn new(predictor: Arc<Predictor>) -> Self {
        InterpreterBuilder {
            predictor,
            config: PdpConfig::default(),
            pairs: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn set_config(mut self, config: PdpConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of grid points for continuous features.
    /// * `grid_size` - Features with fewer distinct values use all of them.
    pub fn set_grid_size(mut self, grid_size: usize) -> Self {
        self.config.grid_size = grid_size;
        self
    }

    /// Set the number of grid points per continuous axis of a feature pair.
    pub fn set_pair_grid_size(mut self, pair_grid_size: usize) -> Self {
        self.config.pair_grid_size = pair_grid_size;
        self
    }

    /// Set how continuous grid points are placed.
    pub fn set_grid_method(mut self, grid_method: GridMethod) -> Self {
        self.config.grid_method = grid_method;
        self
    }

    /// Set whether grid points are marginalized in parallel.
    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the number of threads.
    /// * `num_threads` - Set the number of threads to be used for parallel marginalization.
    pub fn set_num_threads(mut self, num_threads: Option<usize>) -> Self {
        self.config.num_threads = num_threads;
        self
    }

    /// Set the feature pairs to build two dimensional functions for.
    pub fn set_pairs<S: AsRef<str>>(mut self, pairs: &[(S, S)]) -> Self {
        self.pairs = pairs
            .iter()
            .map(|(a, b)| (a.as_ref().to_string(), b.as_ref().to_string()))
            .collect();
        self
    }

    pub fn build(self) -> Result<Interpreter, PdpError> {
        Interpreter::with_config(self.predictor, self.config, &self.pairs)
    }
}
