//! Abundance normalization for metabolite tables.
//!
//! Every method returns a new [`AbundanceTable`] with the same identifiers in the same
//! order; the input table is never modified.
//!
//! - [`NormalizationMethod::Log2`]: `log2(x + 1)` elementwise; values at or below -1
//!   are degenerate
//! - [`NormalizationMethod::ZScore`]: per entity, `(x - mean) / sd` with the sample
//!   standard deviation (n - 1 denominator)
//! - [`NormalizationMethod::MinMax`]: per entity, `(x - min) / (max - min)`

use crate::data::AbundanceTable;
use crate::error::{AnalysisError, DegeneratePolicy, Result};
use log::debug;
use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis, Zip};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationMethod {
    Log2,
    ZScore,
    MinMax,
}

impl NormalizationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            NormalizationMethod::Log2 => "log2",
            NormalizationMethod::ZScore => "zscore",
            NormalizationMethod::MinMax => "minmax",
        }
    }
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NormalizationMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "log2" => Ok(NormalizationMethod::Log2),
            "zscore" => Ok(NormalizationMethod::ZScore),
            "minmax" => Ok(NormalizationMethod::MinMax),
            other => Err(AnalysisError::InvalidArgument(format!(
                "Unknown normalization method: {}",
                other
            ))),
        }
    }
}

pub trait Normalizer {
    fn normalize(&self, method: NormalizationMethod) -> Result<AbundanceTable>;
}

impl Normalizer for AbundanceTable {
    fn normalize(&self, method: NormalizationMethod) -> Result<AbundanceTable> {
        normalize(self, method)
    }
}

/// Normalize a table, failing on rows the method cannot rescale.
pub fn normalize(table: &AbundanceTable, method: NormalizationMethod) -> Result<AbundanceTable> {
    normalize_with_policy(table, method, DegeneratePolicy::Strict)
}

/// Normalize a table.
///
/// Zero-variance rows (z-score), constant rows (min-max) and values at or below -1 (log2)
/// are degenerate. Under [`DegeneratePolicy::Propagate`] they come out as NaN or `-inf`,
/// as plain float arithmetic would give.
pub fn normalize_with_policy(
    table: &AbundanceTable,
    method: NormalizationMethod,
    policy: DegeneratePolicy,
) -> Result<AbundanceTable> {
    debug!(
        "Normalizing {} entities x {} samples with {}",
        table.n_rows(),
        table.n_columns(),
        method
    );

    let mut values: Array2<f64> = table.values().to_owned();

    match method {
        NormalizationMethod::Log2 => {
            for (row_idx, row) in table.values().axis_iter(Axis(0)).enumerate() {
                if let Some(&v) = row.iter().find(|&&v| !(v + 1.0 > 0.0)) {
                    let entity = &table.row_ids()[row_idx];
                    policy.check(|| {
                        format!(
                            "Entity '{}' has value {}, log2(x + 1) is undefined",
                            entity, v
                        )
                    })?;
                }
            }
            values.mapv_inplace(|v| (v + 1.0).log2());
        }
        NormalizationMethod::ZScore | NormalizationMethod::MinMax => {
            for (row_idx, (source, target)) in table
                .values()
                .axis_iter(Axis(0))
                .zip(values.axis_iter_mut(Axis(0)))
                .enumerate()
            {
                let entity = &table.row_ids()[row_idx];
                match method {
                    NormalizationMethod::ZScore => zscore_row(source, target, entity, policy)?,
                    _ => minmax_row(source, target, entity, policy)?,
                }
            }
        }
    }

    Ok(table.with_values(values))
}

fn zscore_row(
    source: ArrayView1<f64>,
    target: ArrayViewMut1<f64>,
    entity: &str,
    policy: DegeneratePolicy,
) -> Result<()> {
    let n = source.len() as f64;
    let mean = source.sum() / n;
    let variance = source.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let sd = variance.sqrt();

    if !(sd > 0.0) || !sd.is_finite() {
        policy.check(|| format!("Entity '{}' has zero variance, z-score is undefined", entity))?;
    }

    Zip::from(target)
        .and(&source)
        .for_each(|out, &v| *out = (v - mean) / sd);
    Ok(())
}

fn minmax_row(
    source: ArrayView1<f64>,
    target: ArrayViewMut1<f64>,
    entity: &str,
    policy: DegeneratePolicy,
) -> Result<()> {
    let min = source.iter().copied().fold(f64::INFINITY, f64::min);
    let max = source.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !(range > 0.0) {
        policy.check(|| format!("Entity '{}' is constant, min-max scaling is undefined", entity))?;
    }

    Zip::from(target)
        .and(&source)
        .for_each(|out, &v| *out = (v - min) / range);
    Ok(())
}
