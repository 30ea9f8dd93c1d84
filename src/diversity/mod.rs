//! Per-sample alpha diversity for taxonomic abundance tables.
//!
//! Each sample (column) is reduced to a single score. Absent entities (zero abundance)
//! are dropped before any proportions are formed, so they never contribute `ln(0)` terms.
//!
//! ## Available Methods
//!
//! - **Shannon**: `-Σ p·ln(p)` over the proportions of the present entities
//! - **Simpson**: `1 - Σ p²`, the probability that two random draws differ in entity
//! - **Richness**: number of present entities
//!
//! A sample without any present entity has no proportions. Shannon and Simpson treat it
//! as degenerate (see [`DegeneratePolicy`]); richness is simply zero.

use crate::data::AbundanceTable;
use crate::error::{AnalysisError, DegeneratePolicy, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiversityMethod {
    Shannon,
    Simpson,
    Richness,
}

impl DiversityMethod {
    pub const ALL: [DiversityMethod; 3] = [
        DiversityMethod::Shannon,
        DiversityMethod::Simpson,
        DiversityMethod::Richness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DiversityMethod::Shannon => "shannon",
            DiversityMethod::Simpson => "simpson",
            DiversityMethod::Richness => "richness",
        }
    }
}

impl fmt::Display for DiversityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiversityMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shannon" => Ok(DiversityMethod::Shannon),
            "simpson" => Ok(DiversityMethod::Simpson),
            "richness" => Ok(DiversityMethod::Richness),
            other => Err(AnalysisError::InvalidArgument(format!(
                "Unknown diversity method: {}",
                other
            ))),
        }
    }
}

/// Diversity scores keyed by sample identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DiversityResult {
    pub method: DiversityMethod,
    pub scores: BTreeMap<String, f64>,
}

impl DiversityResult {
    pub fn get(&self, sample_id: &str) -> Option<f64> {
        self.scores.get(sample_id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

pub trait DiversityCalculator {
    fn alpha_diversity(&self, method: DiversityMethod) -> Result<DiversityResult>;

    fn alpha_diversity_all(&self, methods: &[DiversityMethod]) -> Result<Vec<DiversityResult>>;
}

impl DiversityCalculator for AbundanceTable {
    fn alpha_diversity(&self, method: DiversityMethod) -> Result<DiversityResult> {
        alpha_diversity(self, method)
    }

    fn alpha_diversity_all(&self, methods: &[DiversityMethod]) -> Result<Vec<DiversityResult>> {
        alpha_diversity_all(self, methods)
    }
}

/// Compute one alpha diversity index for every sample, failing on all-zero samples.
pub fn alpha_diversity(table: &AbundanceTable, method: DiversityMethod) -> Result<DiversityResult> {
    alpha_diversity_with_policy(table, method, DegeneratePolicy::Strict)
}

/// Compute one alpha diversity index for every sample.
///
/// Under [`DegeneratePolicy::Propagate`] an all-zero sample scores NaN for Shannon and Simpson.
pub fn alpha_diversity_with_policy(
    table: &AbundanceTable,
    method: DiversityMethod,
    policy: DegeneratePolicy,
) -> Result<DiversityResult> {
    debug!(
        "Computing {} diversity for {} samples over {} entities",
        method,
        table.n_columns(),
        table.n_rows()
    );

    let mut scores = BTreeMap::new();
    let mut present: Vec<f64> = Vec::with_capacity(table.n_rows());

    for (col, sample_id) in table.column_ids().iter().enumerate() {
        present.clear();
        present.extend(table.column(col).iter().copied().filter(|&v| v > 0.0));

        if present.is_empty() && method != DiversityMethod::Richness {
            policy.check(|| {
                format!(
                    "Sample '{}' has no non-zero abundances, {} diversity is undefined",
                    sample_id, method
                )
            })?;
        }

        let score = match method {
            DiversityMethod::Shannon => shannon_index(&present),
            DiversityMethod::Simpson => simpson_index(&present),
            DiversityMethod::Richness => richness(&present),
        };
        scores.insert(sample_id.clone(), score);
    }

    Ok(DiversityResult { method, scores })
}

/// Compute several indices in one pass over the requested methods, failing on all-zero
/// samples.
pub fn alpha_diversity_all(
    table: &AbundanceTable,
    methods: &[DiversityMethod],
) -> Result<Vec<DiversityResult>> {
    alpha_diversity_all_with_policy(table, methods, DegeneratePolicy::Strict)
}

/// Compute several indices, one result per method in the order given.
pub fn alpha_diversity_all_with_policy(
    table: &AbundanceTable,
    methods: &[DiversityMethod],
    policy: DegeneratePolicy,
) -> Result<Vec<DiversityResult>> {
    methods
        .iter()
        .map(|&method| alpha_diversity_with_policy(table, method, policy))
        .collect()
}

/// Shannon entropy of the given abundances. Zeros are skipped; NaN if nothing remains.
pub fn shannon_index(abundances: &[f64]) -> f64 {
    let total = present_total(abundances);
    if total <= 0.0 {
        return f64::NAN;
    }
    -abundances
        .iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| {
            let p = v / total;
            p * p.ln()
        })
        .sum::<f64>()
}

/// Gini-Simpson index `1 - Σ p²`. Zeros are skipped; NaN if nothing remains.
pub fn simpson_index(abundances: &[f64]) -> f64 {
    let total = present_total(abundances);
    if total <= 0.0 {
        return f64::NAN;
    }
    1.0 - abundances
        .iter()
        .filter(|&&v| v > 0.0)
        .map(|&v| {
            let p = v / total;
            p * p
        })
        .sum::<f64>()
}

/// Number of strictly positive abundances.
pub fn richness(abundances: &[f64]) -> f64 {
    abundances.iter().filter(|&&v| v > 0.0).count() as f64
}

fn present_total(abundances: &[f64]) -> f64 {
    abundances.iter().filter(|&&v| v > 0.0).sum()
}
