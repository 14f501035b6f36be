//! Plotter
//!
//! Turns partial dependence functions into renderable series. The plotter
//! only queries the functions, centering and display grids are applied on
//! every call to [`Plotter::plot`] and never change the functions themselves.
use crate::data::{RowMajorMatrix, Value};
use crate::errors::PdpError;
use crate::feature::{FeatureDescriptor, FeatureKind};
use crate::interpreter::Interpreter;
use crate::pdp::{PdpFunction, PdpFunction2d};
use hashbrown::HashMap;
use log::debug;
use serde::Serialize;
use std::sync::Arc;

/// Partial dependence curve of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub feature: String,
    pub kind: FeatureKind,
    pub x: Vec<Value>,
    pub y: Vec<f64>,
    pub centered_at: Option<Value>,
}

/// Partial dependence surface of a feature pair, `z` has one row per `x` value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceChart {
    pub features: (String, String),
    pub kinds: (FeatureKind, FeatureKind),
    pub x: Vec<Value>,
    pub y: Vec<Value>,
    pub z: RowMajorMatrix<f64>,
    pub centered_at: Option<(Value, Value)>,
}

/// A chart, ready for any rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", rename_all = "lowercase")]
pub enum Chart {
    Line(LineChart),
    Surface(SurfaceChart),
}

impl Chart {
    pub fn to_json(&self) -> Result<String, PdpError> {
        serde_json::to_string(self).map_err(|e| PdpError::UnableToWrite(e.to_string()))
    }
}

/// Display configuration over an interpreter's functions.
pub struct Plotter {
    features: Vec<Arc<PdpFunction>>,
    pairs: Vec<Arc<PdpFunction2d>>,
    center_at: HashMap<String, Value>,
    grid_points: HashMap<String, Vec<Value>>,
}

impl Plotter {
    /// * `interpreter` - Source of the functions. Pairs that are not yet
    ///   registered on it are registered here.
    /// * `features` - Features to draw curves for, repeats are ignored.
    /// * `features_2d` - Feature pairs to draw surfaces for, with the first
    ///   name on the x axis. Repeats, in either order, are ignored.
    pub fn new<S: AsRef<str>>(
        interpreter: &mut Interpreter,
        features: &[S],
        features_2d: &[(S, S)],
    ) -> Result<Self, PdpError> {
        let mut curves: Vec<Arc<PdpFunction>> = Vec::with_capacity(features.len());
        for name in features {
            let f = interpreter.function(name.as_ref())?;
            if !curves.iter().any(|c| c.name() == f.name()) {
                curves.push(f.clone());
            }
        }
        let mut surfaces: Vec<Arc<PdpFunction2d>> = Vec::with_capacity(features_2d.len());
        for (a, b) in features_2d {
            let (a, b) = (a.as_ref(), b.as_ref());
            let f = interpreter.add_pair(a, b)?;
            if surfaces.iter().any(|s| {
                let (x, y) = s.names();
                (x == a && y == b) || (x == b && y == a)
            }) {
                continue;
            }
            if f.names().0 == a {
                surfaces.push(f);
            } else {
                surfaces.push(Arc::new(f.transposed()));
            }
        }
        Ok(Plotter {
            features: curves,
            pairs: surfaces,
            center_at: HashMap::new(),
            grid_points: HashMap::new(),
        })
    }

    fn descriptor(&self, feature: &str) -> Result<&FeatureDescriptor, PdpError> {
        self.features
            .iter()
            .map(|f| f.feature())
            .chain(self.pairs.iter().flat_map(|p| p.features()))
            .find(|d| d.name == feature)
            .ok_or_else(|| PdpError::InvalidFeature(format!("{:?} is not plotted", feature)))
    }

    fn curve(&self, feature: &str) -> Result<&Arc<PdpFunction>, PdpError> {
        self.features
            .iter()
            .find(|f| f.name() == feature)
            .ok_or_else(|| PdpError::InvalidFeature(format!("{:?} has no curve in this plotter", feature)))
    }

    /// Shift the displayed values of `feature` so they are zero at `value`.
    pub fn set_center_at(&mut self, feature: &str, value: Value) -> Result<(), PdpError> {
        self.descriptor(feature)?.validate_value(&value)?;
        self.center_at.insert(feature.to_string(), value);
        Ok(())
    }

    pub fn clear_center_at(&mut self, feature: &str) {
        self.center_at.remove(feature);
    }

    pub fn center_at(&self, feature: &str) -> Option<&Value> {
        self.center_at.get(feature)
    }

    /// Display `feature` at `values` instead of the function's own grid.
    pub fn set_grid_points(&mut self, feature: &str, values: Vec<Value>) -> Result<(), PdpError> {
        let descriptor = self.descriptor(feature)?;
        if values.is_empty() {
            return Err(PdpError::InvalidParameter(
                "grid_points".to_string(),
                "at least one value".to_string(),
                "none".to_string(),
            ));
        }
        for v in values.iter() {
            descriptor.validate_value(v)?;
        }
        self.grid_points.insert(feature.to_string(), values);
        Ok(())
    }

    /// Value of the displayed curve of `feature` at `value`, after centering.
    pub fn displayed_value(&self, feature: &str, value: &Value) -> Result<f64, PdpError> {
        let f = self.curve(feature)?;
        let y = f.evaluate(value)?;
        match self.center_at.get(feature) {
            Some(c) => Ok(y - f.evaluate(c)?),
            None => Ok(y),
        }
    }

    /// One line chart per feature, then one surface per pair.
    pub fn plot(&self) -> Result<Vec<Chart>, PdpError> {
        let mut charts = Vec::with_capacity(self.features.len() + self.pairs.len());
        for f in self.features.iter() {
            charts.push(Chart::Line(self.line(f)?));
        }
        for p in self.pairs.iter() {
            charts.push(Chart::Surface(self.surface(p)?));
        }
        Ok(charts)
    }

    fn line(&self, f: &PdpFunction) -> Result<LineChart, PdpError> {
        let x = self
            .grid_points
            .get(f.name())
            .cloned()
            .unwrap_or_else(|| f.grid().values());
        let y = x
            .iter()
            .map(|v| self.displayed_value(f.name(), v))
            .collect::<Result<Vec<f64>, PdpError>>()?;
        Ok(LineChart {
            feature: f.name().to_string(),
            kind: f.feature().kind,
            x,
            y,
            centered_at: self.center_at.get(f.name()).cloned(),
        })
    }

    fn surface(&self, f: &PdpFunction2d) -> Result<SurfaceChart, PdpError> {
        let (a, b) = f.names();
        let [grid_a, grid_b] = f.grids();
        let x = self.grid_points.get(a).cloned().unwrap_or_else(|| grid_a.values());
        let y = self.grid_points.get(b).cloned().unwrap_or_else(|| grid_b.values());
        let centered_at = match (self.center_at.get(a), self.center_at.get(b)) {
            (Some(ca), Some(cb)) => Some((ca.clone(), cb.clone())),
            (Some(_), None) | (None, Some(_)) => {
                debug!(
                    "Surface ({}, {}) is drawn uncentered, set a center on both features to center it.",
                    a, b
                );
                None
            }
            (None, None) => None,
        };
        let offset = match &centered_at {
            Some((ca, cb)) => f.evaluate(ca, cb)?,
            None => 0.0,
        };
        let mut z = Vec::with_capacity(x.len() * y.len());
        for va in x.iter() {
            for vb in y.iter() {
                z.push(f.evaluate(va, vb)? - offset);
            }
        }
        let [da, db] = f.features();
        Ok(SurfaceChart {
            features: (a.to_string(), b.to_string()),
            kinds: (da.kind, db.kind),
            z: RowMajorMatrix::new(z, x.len(), y.len()),
            x,
            y,
            centered_at,
        })
    }
}
