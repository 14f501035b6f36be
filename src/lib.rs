//! `pardep` computes partial dependence functions for any fitted model.
//!
//! A [`Predictor`] freezes a model with its training sample, an
//! [`Interpreter`] marginalizes the model over grids of every feature (and
//! requested feature pairs), and the resulting [`PdpFunction`]s can be
//! queried anywhere in a feature's domain or handed to a [`Plotter`].

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod feature;
pub mod grid;
pub mod interpreter;
pub mod model;
pub mod pdp;
pub mod plotter;
pub mod predictor;
pub mod utils;

// Individual classes, and functions
pub use config::PdpConfig;
pub use data::{Column, Frame, Value};
pub use errors::PdpError;
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use model::{FnModel, LinearModel, Model, ModelOutput};
pub use pdp::{PdpFunction, PdpFunction2d};
pub use plotter::{Chart, Plotter};
pub use predictor::{Predictor, Task};
