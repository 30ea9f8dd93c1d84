//! Parametric two-sample tests for abundance data.
//!
//! Student's t-test (pooled variance) and Welch's t-test, applied to every entity of an
//! abundance table or to plain slices. p-values are always two-sided.

use crate::data::AbundanceTable;
use crate::error::{AnalysisError, Result};
use crate::testing::{TTestType, TestResult};
use num_traits::Float;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Mean and spread of one group of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSummary {
    pub n: f64,
    pub mean: f64,
    /// Sum of squared deviations from the mean
    pub sum_sq_dev: f64,
}

impl GroupSummary {
    /// Two-pass summary of a group of observations.
    pub fn from_values<T>(values: &[T]) -> Self
    where
        T: Float,
    {
        let n = values.len();
        let to_f64 = |v: T| v.to_f64().unwrap_or(f64::NAN);

        let mean = values.iter().map(|&v| to_f64(v)).sum::<f64>() / n as f64;
        let sum_sq_dev = values
            .iter()
            .map(|&v| {
                let d = to_f64(v) - mean;
                d * d
            })
            .sum::<f64>();

        GroupSummary {
            n: n as f64,
            mean,
            sum_sq_dev,
        }
    }

    /// Summary from a sum, a sum of squares and a count.
    pub fn from_sums(sum: f64, sum_sq: f64, n: f64) -> Self {
        let mean = sum / n;
        // the computational formula can dip below zero by rounding
        let sum_sq_dev = (sum_sq - sum * sum / n).max(0.0);
        GroupSummary { n, mean, sum_sq_dev }
    }

    /// Unbiased sample variance; NaN for fewer than two observations.
    pub fn variance(&self) -> f64 {
        if self.n < 2.0 {
            return f64::NAN;
        }
        self.sum_sq_dev / (self.n - 1.0)
    }
}

/// Perform t-tests on all entities comparing two groups of samples.
///
/// # Arguments
///
/// * `table` - Abundance table (entities × samples)
/// * `group1_indices` - Column indices for the first group of samples
/// * `group2_indices` - Column indices for the second group of samples
/// * `test_type` - Type of t-test to perform (Student's or Welch's)
///
/// # Returns
///
/// Vector of `TestResult` objects, one per entity in row order. The statistic is
/// positive when the first group has the larger mean.
pub fn t_test_table_groups(
    table: &AbundanceTable,
    group1_indices: &[usize],
    group2_indices: &[usize],
    test_type: TTestType,
) -> Result<Vec<TestResult<f64>>> {
    if group1_indices.is_empty() || group2_indices.is_empty() {
        return Err(AnalysisError::InvalidArgument(
            "Group indices cannot be empty".to_string(),
        ));
    }
    if let Some(&idx) = group1_indices
        .iter()
        .chain(group2_indices)
        .find(|&&idx| idx >= table.n_columns())
    {
        return Err(AnalysisError::InvalidArgument(format!(
            "Column index {} out of bounds for {} samples",
            idx,
            table.n_columns()
        )));
    }

    let mut group1_values = Vec::with_capacity(group1_indices.len());
    let mut group2_values = Vec::with_capacity(group2_indices.len());

    let results = table
        .values()
        .rows()
        .into_iter()
        .map(|row| {
            group1_values.clear();
            group1_values.extend(group1_indices.iter().map(|&c| row[c]));
            group2_values.clear();
            group2_values.extend(group2_indices.iter().map(|&c| row[c]));
            t_test(&group1_values, &group2_values, test_type)
        })
        .collect();

    Ok(results)
}

/// Perform a t-test comparing two samples.
///
/// This function performs either Student's t-test (assuming equal variances) or
/// Welch's t-test (allowing unequal variances) on two samples.
///
/// # Arguments
///
/// * `x` - First sample
/// * `y` - Second sample
/// * `test_type` - Type of t-test to perform
///
/// # Returns
///
/// `TestResult` containing the t-statistic and p-value. Both are NaN when the test is
/// undefined (too few observations, or no variance and no mean difference).
pub fn t_test<T>(x: &[T], y: &[T], test_type: TTestType) -> TestResult<f64>
where
    T: Float,
{
    if x.is_empty() || y.is_empty() {
        return TestResult::undefined();
    }
    t_test_from_summaries(
        &GroupSummary::from_values(x),
        &GroupSummary::from_values(y),
        test_type,
    )
}

/// Perform a t-test using precomputed sums.
///
/// # Arguments
///
/// * `sum1`, `sum_sq1`, `n1` - Sum, sum of squares, and count for group 1
/// * `sum2`, `sum_sq2`, `n2` - Sum, sum of squares, and count for group 2
/// * `test_type` - Type of t-test to perform (Student's or Welch's)
pub fn t_test_from_sums(
    sum1: f64,
    sum_sq1: f64,
    n1: f64,
    sum2: f64,
    sum_sq2: f64,
    n2: f64,
    test_type: TTestType,
) -> TestResult<f64> {
    if n1 < 1.0 || n2 < 1.0 {
        return TestResult::undefined();
    }
    t_test_from_summaries(
        &GroupSummary::from_sums(sum1, sum_sq1, n1),
        &GroupSummary::from_sums(sum2, sum_sq2, n2),
        test_type,
    )
}

/// Perform a t-test from two group summaries.
///
/// Zero variance in both groups gives an infinite statistic (p = 0) when the means
/// differ and an undefined one (NaN) when they are equal.
pub fn t_test_from_summaries(
    g1: &GroupSummary,
    g2: &GroupSummary,
    test_type: TTestType,
) -> TestResult<f64> {
    let (n1, n2) = (g1.n, g2.n);
    let mean_diff = g1.mean - g2.mean;

    let (std_err, df) = match test_type {
        TTestType::Student => {
            // Student's t-test (pooled variance)
            let df = n1 + n2 - 2.0;
            if df <= 0.0 {
                return TestResult::undefined();
            }
            let pooled_var = (g1.sum_sq_dev + g2.sum_sq_dev) / df;
            ((pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        TTestType::Welch => {
            if n1 < 2.0 || n2 < 2.0 {
                return TestResult::undefined();
            }
            let term1 = g1.variance() / n1;
            let term2 = g2.variance() / n2;
            let combined_var = term1 + term2;

            // Welch-Satterthwaite equation for degrees of freedom
            let df = combined_var * combined_var
                / (term1 * term1 / (n1 - 1.0) + term2 * term2 / (n2 - 1.0));
            (combined_var.sqrt(), df)
        }
    };

    let t_stat = mean_diff / std_err;
    let p_value = t_test_p_value(t_stat, df);

    TestResult::new(t_stat, p_value)
        .with_degrees_of_freedom(df)
        .with_standard_error(std_err)
}

#[inline]
fn t_test_p_value(t_stat: f64, df: f64) -> f64 {
    if t_stat.is_nan() {
        return f64::NAN;
    }
    if t_stat.is_infinite() {
        return 0.0;
    }
    if !(df > 0.0) || !df.is_finite() {
        return f64::NAN;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => (2.0 * t_dist.sf(t_stat.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}
