//! Dense abundance table with labelled rows (entities) and columns (samples).

use crate::error::{AnalysisError, Result};
use ndarray::{Array2, ArrayView1, Axis};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A dense matrix of abundances indexed by entity (taxon or metabolite) and sample.
///
/// Rows are entities, columns are samples. Identifier lookups are backed by hash maps
/// built once at construction, so `row_position`/`column_position` are O(1).
///
/// The analysis routines never mutate a table; transforms always return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTable {
    row_ids: Vec<String>,
    column_ids: Vec<String>,
    values: Array2<f64>,
    row_index: HashMap<String, usize>,
    column_index: HashMap<String, usize>,
}

impl AbundanceTable {
    /// Create a table from identifiers and a `(n_rows, n_columns)` value matrix.
    ///
    /// Fails if the shape does not match the identifier counts, if an identifier repeats
    /// within its axis, or if any value is NaN or infinite.
    pub fn new(row_ids: Vec<String>, column_ids: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if let Some(((row, column), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(AnalysisError::NonFinite { row, column });
        }
        Self::from_parts(row_ids, column_ids, values)
    }

    /// Create a table from one `Vec` of values per entity.
    pub fn from_rows(row_ids: Vec<String>, column_ids: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_columns = column_ids.len();
        if rows.len() != row_ids.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: row_ids.len(),
                actual: rows.len(),
            });
        }
        if let Some(ragged) = rows.iter().find(|r| r.len() != n_columns) {
            return Err(AnalysisError::DimensionMismatch {
                expected: n_columns,
                actual: ragged.len(),
            });
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((row_ids.len(), n_columns), flat)
            .map_err(|e| AnalysisError::InvalidArgument(e.to_string()))?;
        Self::new(row_ids, column_ids, values)
    }

    /// Build a table without the finiteness check.
    ///
    /// Used for transforms that may legitimately carry NaN/inf under the propagate policy.
    pub(crate) fn from_parts(
        row_ids: Vec<String>,
        column_ids: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self> {
        let (n_rows, n_columns) = values.dim();
        if n_rows != row_ids.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: n_rows,
                actual: row_ids.len(),
            });
        }
        if n_columns != column_ids.len() {
            return Err(AnalysisError::DimensionMismatch {
                expected: n_columns,
                actual: column_ids.len(),
            });
        }

        let row_index = build_index(&row_ids, "entity")?;
        let column_index = build_index(&column_ids, "sample")?;

        Ok(Self {
            row_ids,
            column_ids,
            values,
            row_index,
            column_index,
        })
    }

    /// Same identifiers, new values. Shape is already known to match.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.dim(), self.values.dim());
        Self {
            row_ids: self.row_ids.clone(),
            column_ids: self.column_ids.clone(),
            values,
            row_index: self.row_index.clone(),
            column_index: self.column_index.clone(),
        }
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn column_ids(&self) -> &[String] {
        &self.column_ids
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of entities.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of samples.
    pub fn n_columns(&self) -> usize {
        self.values.ncols()
    }

    pub fn row_position(&self, row_id: &str) -> Option<usize> {
        self.row_index.get(row_id).copied()
    }

    pub fn column_position(&self, column_id: &str) -> Option<usize> {
        self.column_index.get(column_id).copied()
    }

    /// Abundances of one entity across all samples.
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    /// Abundances of all entities in one sample.
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// Value for an (entity, sample) pair, if both identifiers exist.
    pub fn get(&self, row_id: &str, column_id: &str) -> Option<f64> {
        let row = self.row_position(row_id)?;
        let column = self.column_position(column_id)?;
        Some(self.values[(row, column)])
    }

    /// Mean abundance of every entity across samples, in row order.
    ///
    /// A table without samples has NaN means.
    pub fn row_means(&self) -> Vec<f64> {
        let n = self.n_columns() as f64;
        self.values
            .sum_axis(Axis(1))
            .iter()
            .map(|&sum| sum / n)
            .collect()
    }

    /// The `n` entities with the largest mean abundance, as a new table.
    ///
    /// Rows come out in descending mean order; equal means keep their table order.
    /// Asking for more rows than exist returns every row.
    pub fn top_by_mean(&self, n: usize) -> Self {
        let means = self.row_means();
        let mut order: Vec<usize> = (0..self.n_rows()).collect();
        order.sort_by(|&a, &b| means[b].partial_cmp(&means[a]).unwrap_or(Ordering::Equal));
        order.truncate(n);

        let row_ids: Vec<String> = order.iter().map(|&i| self.row_ids[i].clone()).collect();
        let values = self.values.select(Axis(0), &order);
        let row_index = row_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Self {
            row_ids,
            column_ids: self.column_ids.clone(),
            values,
            row_index,
            column_index: self.column_index.clone(),
        }
    }
}

fn build_index(ids: &[String], axis: &str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(AnalysisError::InvalidArgument(format!(
                "Duplicate {} identifier '{}'",
                axis, id
            )));
        }
    }
    Ok(index)
}
