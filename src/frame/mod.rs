//! # Tabular data
//!
//! A small column store used for training and new data. Columns keep their
//! insertion order, rows are positional and never reordered by any operation
//! in this crate.

use std::collections::HashSet;

use anyhow::{anyhow, bail};
use ndarray::{Array1, Array2, ArrayView2};
use num_traits::ToPrimitive;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Double(Array1<f64>),
    Integer(Array1<i64>),
    Logical(Vec<bool>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Double(v) => v.len(),
            ColumnData::Integer(v) => v.len(),
            ColumnData::Logical(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Double(_) | ColumnData::Integer(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Double(_) => "double",
            ColumnData::Integer(_) => "integer",
            ColumnData::Logical(_) => "logical",
            ColumnData::Text(_) => "character",
        }
    }

    /// Numeric view of the column, `None` for logical and text data.
    pub fn to_f64(&self) -> Option<Array1<f64>> {
        match self {
            ColumnData::Double(v) => Some(v.clone()),
            ColumnData::Integer(v) => Some(v.mapv(|x| x.to_f64().unwrap_or(f64::NAN))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn double(name: impl Into<String>, values: impl Into<Array1<f64>>) -> Self {
        Self::new(name, ColumnData::Double(values.into()))
    }

    pub fn integer(name: impl Into<String>, values: impl Into<Array1<i64>>) -> Self {
        Self::new(name, ColumnData::Integer(values.into()))
    }

    pub fn logical(name: impl Into<String>, values: Vec<bool>) -> Self {
        Self::new(name, ColumnData::Logical(values))
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    nrows: usize,
}

impl DataFrame {
    /// Builds a frame, rejecting ragged columns and duplicated names.
    pub fn new(columns: Vec<Column>) -> anyhow::Result<Self> {
        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.data.len() != nrows {
                bail!(
                    "Column `{}` has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    nrows
                );
            }
            if !seen.insert(column.name.as_str()) {
                bail!("Column name `{}` is used more than once", column.name);
            }
        }
        Ok(DataFrame { columns, nrows })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Names from `wanted` that are absent from this frame, in `wanted` order.
    pub fn missing_columns(&self, wanted: &[String]) -> Vec<String> {
        wanted
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect()
    }

    /// Dense `nrows x names.len()` matrix of the named numeric columns.
    pub fn numeric_matrix(&self, names: &[String]) -> anyhow::Result<Array2<f64>> {
        let mut matrix = Array2::zeros((self.nrows, names.len()));
        for (j, name) in names.iter().enumerate() {
            let column = self
                .column(name)
                .ok_or_else(|| anyhow!("Column `{}` does not exist", name))?;
            let values = column.data.to_f64().ok_or_else(|| {
                anyhow!(
                    "Column `{}` is {}, not numeric",
                    name,
                    column.data.type_name()
                )
            })?;
            matrix.column_mut(j).assign(&values);
        }
        Ok(matrix)
    }

    /// Copy of the frame without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, names: &[String]) -> DataFrame {
        let dropped: HashSet<&str> = names.iter().map(String::as_str).collect();
        DataFrame {
            columns: self
                .columns
                .iter()
                .filter(|c| !dropped.contains(c.name.as_str()))
                .cloned()
                .collect(),
            nrows: self.nrows,
        }
    }

    /// Appends one double column per column of `values`, keeping row order.
    pub fn append_matrix(mut self, names: &[String], values: ArrayView2<f64>) -> anyhow::Result<Self> {
        if values.ncols() != names.len() {
            bail!(
                "Got {} column names for a matrix with {} columns",
                names.len(),
                values.ncols()
            );
        }
        if values.nrows() != self.nrows && !self.columns.is_empty() {
            bail!(
                "Matrix has {} rows, frame has {}",
                values.nrows(),
                self.nrows
            );
        }
        if let Some(taken) = names.iter().find(|n| self.contains(n)) {
            bail!("Column name `{}` is used more than once", taken);
        }
        self.nrows = values.nrows();
        for (name, col) in names.iter().zip(values.columns()) {
            self.columns.push(Column::double(name.clone(), col.to_owned()));
        }
        Ok(self)
    }
}
