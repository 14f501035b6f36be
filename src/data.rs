use crate::errors::PdpError;
use crate::feature::FeatureKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a record, either a number or a categorical level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric value of a continuous column.
    Number(f64),
    /// Level of a categorical column.
    Level(String),
}

impl Value {
    /// The kind of column this value can live in.
    pub fn kind(&self) -> FeatureKind {
        match self {
            Value::Number(_) => FeatureKind::Continuous,
            Value::Level(_) => FeatureKind::Categorical,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Level(_) => None,
        }
    }

    pub fn as_level(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Level(l) => Some(l.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Level(l) => write!(f, "{}", l),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Level(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Level(v)
    }
}

/// A single typed column of a [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Continuous values.
    Numeric(Vec<f64>),
    /// Categorical levels.
    Categorical(Vec<String>),
}

impl Column {
    /// Create a column holding `rows` copies of `value`.
    pub fn constant(value: &Value, rows: usize) -> Self {
        match value {
            Value::Number(v) => Column::Numeric(vec![*v; rows]),
            Value::Level(l) => Column::Categorical(vec![l.clone(); rows]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            Column::Numeric(_) => FeatureKind::Continuous,
            Column::Categorical(_) => FeatureKind::Categorical,
        }
    }

    /// Get the value stored at row `i`.
    pub fn get(&self, i: usize) -> Value {
        match self {
            Column::Numeric(v) => Value::Number(v[i]),
            Column::Categorical(v) => Value::Level(v[i].clone()),
        }
    }

    /// Numeric contents, if this is a continuous column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    /// Level contents, if this is a categorical column.
    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Numeric(_) => None,
            Column::Categorical(v) => Some(v),
        }
    }
}

/// Columnar table of named, typed columns of equal length.
///
/// Training data, prediction batches, and the modified copies used during
/// marginalization are all frames. Columns are stored separately so a single
/// feature can be overwritten without touching the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Frame {
    /// Create a new frame from named columns.
    ///
    /// * `columns` - Pairs of column name and column contents. Every column
    ///   must have the same length and every name must be unique.
    pub fn new<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self, PdpError> {
        let mut names: Vec<String> = Vec::with_capacity(columns.len());
        let mut cols = Vec::with_capacity(columns.len());
        let mut rows = None;
        for (name, col) in columns {
            let name = name.into();
            if names.contains(&name) {
                return Err(PdpError::SchemaMismatch(format!("duplicate column {:?}", name)));
            }
            match rows {
                None => rows = Some(col.len()),
                Some(r) if r != col.len() => {
                    return Err(PdpError::SchemaMismatch(format!(
                        "column {:?} has {} rows, expected {}",
                        name,
                        col.len(),
                        r
                    )))
                }
                Some(_) => (),
            }
            names.push(name);
            cols.push(col);
        }
        Ok(Frame {
            names,
            columns: cols,
            rows: rows.unwrap_or(0),
        })
    }

    /// Build a frame from row records.
    ///
    /// The kind of each column is taken from the first row; later rows must
    /// agree. With no rows all columns are numeric.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: &[Vec<Value>]) -> Result<Self, PdpError> {
        let mut columns: Vec<Column> = match rows.first() {
            Some(first) => first
                .iter()
                .map(|v| match v {
                    Value::Number(_) => Column::Numeric(Vec::with_capacity(rows.len())),
                    Value::Level(_) => Column::Categorical(Vec::with_capacity(rows.len())),
                })
                .collect(),
            None => names.iter().map(|_| Column::Numeric(Vec::new())).collect(),
        };
        if columns.len() != names.len() {
            return Err(PdpError::SchemaMismatch(format!(
                "{} names given for rows of width {}",
                names.len(),
                columns.len()
            )));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(PdpError::SchemaMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    names.len()
                )));
            }
            for (j, (col, v)) in columns.iter_mut().zip(row).enumerate() {
                match (col, v) {
                    (Column::Numeric(c), Value::Number(x)) => c.push(*x),
                    (Column::Categorical(c), Value::Level(l)) => c.push(l.clone()),
                    _ => {
                        return Err(PdpError::SchemaMismatch(format!(
                            "row {} column {:?} has value {} of the wrong kind",
                            i,
                            names[j].as_ref(),
                            v
                        )))
                    }
                }
            }
        }
        Frame::new(names.iter().map(|n| n.as_ref().to_string()).zip(columns).collect())
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of a column, by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get an entire column.
    ///
    /// * `col` - The index of the column to get.
    pub fn column(&self, col: usize) -> &Column {
        &self.columns[col]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Get a single item in the frame.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> Value {
        self.columns[j].get(i)
    }

    /// Get a row of the data as a vector.
    pub fn row(&self, i: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.get(i)).collect()
    }

    /// Copy of the frame restricted to the given columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame, PdpError> {
        let mut cols = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let col = self
                .column_by_name(name)
                .ok_or_else(|| PdpError::SchemaMismatch(format!("column {:?} not found", name)))?;
            cols.push((name.to_string(), col.clone()));
        }
        let mut frame = Frame::new(cols)?;
        frame.rows = self.rows;
        Ok(frame)
    }

    /// Copy of the frame with one column dropped.
    pub fn without(&self, name: &str) -> Result<Frame, PdpError> {
        let keep: Vec<&String> = self.names.iter().filter(|n| n.as_str() != name).collect();
        if keep.len() == self.names.len() {
            return Err(PdpError::SchemaMismatch(format!("column {:?} not found", name)));
        }
        self.select(&keep)
    }

    /// Overwrite every row of column `col` with `value`.
    pub fn set_constant(&mut self, col: usize, value: &Value) -> Result<(), PdpError> {
        if self.columns[col].kind() != value.kind() {
            return Err(PdpError::SchemaMismatch(format!(
                "cannot write {} into {} column {:?}",
                value,
                self.columns[col].kind(),
                self.names[col]
            )));
        }
        self.columns[col] = Column::constant(value, self.rows);
        Ok(())
    }

    /// Copy of the frame with the named column overwritten by a constant.
    pub fn with_constant(&self, name: &str, value: &Value) -> Result<Frame, PdpError> {
        let col = self
            .position(name)
            .ok_or_else(|| PdpError::SchemaMismatch(format!("column {:?} not found", name)))?;
        let mut frame = self.clone();
        frame.set_constant(col, value)?;
        Ok(frame)
    }
}

/// A lightweight row major matrix, used to hold values laid out
/// over a two dimensional grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMajorMatrix<T> {
    /// The raw data in row-major order.
    pub data: Vec<T>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl<T> RowMajorMatrix<T> {
    /// Create a new RowMajorMatrix.
    ///
    /// `data` is expected to hold `rows * cols` values, see [`RowMajorMatrix::is_complete`].
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> Self {
        RowMajorMatrix { data, rows, cols }
    }

    /// Whether the data length matches the declared shape.
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.rows * self.cols
    }

    /// Get a single reference to an item in the matrix.
    ///
    /// * `i` - The ith row of the data to get.
    /// * `j` - the jth column of the data to get.
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Get a row of the matrix as a slice.
    pub fn get_row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }
}

impl<T: Copy> RowMajorMatrix<T> {
    /// Swap rows and columns.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(*self.get(i, j));
            }
        }
        RowMajorMatrix::new(data, self.cols, self.rows)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut val = self.names.join(" ");
        val.push('\n');
        for i in 0..self.rows {
            let row: Vec<String> = self.row(i).iter().map(|v| v.to_string()).collect();
            val.push_str(&row.join(" "));
            val.push('\n');
        }
        write!(f, "{}", val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(vec![
            ("x", Column::Numeric(vec![1.0, 2.0, 3.0])),
            ("c", Column::Categorical(vec!["a".into(), "b".into(), "a".into()])),
        ])
        .unwrap()
    }

    #[test]
    fn test_frame_get() {
        let f = frame();
        assert_eq!(f.n_rows(), 3);
        assert_eq!(f.n_cols(), 2);
        assert_eq!(f.get(1, 0), Value::Number(2.0));
        assert_eq!(f.get(1, 1), Value::from("b"));
        assert_eq!(f.row(2), vec![Value::Number(3.0), Value::from("a")]);
    }

    #[test]
    fn test_frame_ragged_columns() {
        let f = Frame::new(vec![
            ("x", Column::Numeric(vec![1.0, 2.0])),
            ("y", Column::Numeric(vec![1.0])),
        ]);
        assert!(matches!(f, Err(PdpError::SchemaMismatch(_))));
    }

    #[test]
    fn test_frame_duplicate_names() {
        let f = Frame::new(vec![
            ("x", Column::Numeric(vec![1.0])),
            ("x", Column::Numeric(vec![1.0])),
        ]);
        assert!(matches!(f, Err(PdpError::SchemaMismatch(_))));
    }

    #[test]
    fn test_frame_from_rows() {
        let rows = vec![
            vec![Value::Number(1.0), Value::from("a")],
            vec![Value::Number(2.0), Value::from("b")],
        ];
        let f = Frame::from_rows(&["x", "c"], &rows).unwrap();
        assert_eq!(f.column(0), &Column::Numeric(vec![1.0, 2.0]));
        assert_eq!(f.column(1), &Column::Categorical(vec!["a".into(), "b".into()]));

        let bad = vec![vec![Value::Number(1.0), Value::from("a")], vec![Value::from("b"), Value::from("b")]];
        assert!(Frame::from_rows(&["x", "c"], &bad).is_err());
    }

    #[test]
    fn test_frame_with_constant() {
        let f = frame();
        let g = f.with_constant("c", &Value::from("z")).unwrap();
        assert_eq!(g.column(1), &Column::Categorical(vec!["z".into(); 3]));
        // source is untouched
        assert_eq!(f.get(1, 1), Value::from("b"));
        assert!(f.with_constant("c", &Value::Number(1.0)).is_err());
        assert!(f.with_constant("missing", &Value::Number(1.0)).is_err());
    }

    #[test]
    fn test_frame_select_without() {
        let f = frame();
        let g = f.without("x").unwrap();
        assert_eq!(g.names(), &["c".to_string()]);
        assert_eq!(g.n_rows(), 3);
        let h = f.select(&["c", "x"]).unwrap();
        assert_eq!(h.names(), &["c".to_string(), "x".to_string()]);
        assert!(f.without("nope").is_err());
    }

    #[test]
    fn test_rowmatrix_get_transpose() {
        let m = RowMajorMatrix::new(vec![1, 2, 3, 5, 6, 7], 2, 3);
        assert_eq!(m.get(0, 0), &1);
        assert_eq!(m.get(1, 0), &5);
        assert_eq!(m.get(0, 2), &3);
        assert_eq!(m.get_row(1), &[5, 6, 7]);
        assert!(m.is_complete());
        assert!(!RowMajorMatrix::new(vec![1, 2], 2, 3).is_complete());
        let t = m.transpose();
        assert_eq!(t.rows, 3);
        assert_eq!(t.get(2, 1), &7);
        assert_eq!(t.get(0, 1), &5);
    }

    #[test]
    fn test_value_json() {
        let v: Vec<Value> = serde_json::from_str(r#"[1.5, "a"]"#).unwrap();
        assert_eq!(v, vec![Value::Number(1.5), Value::from("a")]);
    }
}
