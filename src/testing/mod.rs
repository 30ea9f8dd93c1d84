use crate::error::{AnalysisError, DegeneratePolicy, Result};
use num_traits::Float;
use std::cmp::Ordering;

pub mod effect;
pub mod inference;

pub mod utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TTestType {
    #[default]
    Student, // Equal variance
    Welch,   // Unequal variance
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestResult<T> {
    /// The test statistic value
    pub statistic: T,
    /// The two-sided p-value of the test
    pub p_value: T,
    /// Degrees of freedom (for parametric inference)
    pub degrees_of_freedom: Option<T>,
    /// Standard error of the mean difference
    pub standard_error: Option<T>,
}

impl<T> TestResult<T>
where
    T: Float,
{
    /// Create a new test result with minimal information
    pub fn new(statistic: T, p_value: T) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
            standard_error: None,
        }
    }

    /// Result for data the test cannot be computed on
    pub fn undefined() -> Self {
        TestResult::new(T::nan(), T::nan())
    }

    /// Add degrees of freedom to the result
    pub fn with_degrees_of_freedom(mut self, df: T) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }

    /// Add standard error to the result
    pub fn with_standard_error(mut self, se: T) -> Self {
        self.standard_error = Some(se);
        self
    }

    /// Check if the result is statistically significant at the given threshold.
    ///
    /// An undefined (NaN) p-value is never significant.
    pub fn is_significant(&self, alpha: T) -> bool {
        self.p_value < alpha
    }
}

/// Settings for a two-group differential abundance comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialOptions {
    /// p-value cutoff for the significance flag, in (0, 1)
    pub threshold: f64,
    pub test_type: TTestType,
    /// Handling of zero reference means and non-positive fold changes
    pub policy: DegeneratePolicy,
}

impl Default for DifferentialOptions {
    fn default() -> Self {
        DifferentialOptions {
            threshold: 0.05,
            test_type: TTestType::Student,
            policy: DegeneratePolicy::Strict,
        }
    }
}

impl DifferentialOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_test_type(mut self, test_type: TTestType) -> Self {
        self.test_type = test_type;
        self
    }

    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(AnalysisError::InvalidArgument(format!(
                "Significance threshold must lie in (0, 1), got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Two-group comparison outcome for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialResult {
    pub entity: String,
    pub p_value: f64,
    pub t_statistic: f64,
    /// `group2_mean / group1_mean`
    pub fold_change: f64,
    pub log2_fold_change: f64,
    pub significant: bool,
    pub group1_mean: f64,
    pub group2_mean: f64,
}

impl DifferentialResult {
    /// `-log10(p)`, the volcano plot ordinate.
    pub fn neg_log10_p(&self) -> f64 {
        -self.p_value.log10()
    }
}

/// Per-entity results of one comparison, in table row order.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialResults {
    pub records: Vec<DifferentialResult>,
    /// Threshold the significance flags were computed with
    pub threshold: f64,
    pub test_type: TTestType,
}

impl DifferentialResults {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DifferentialResult> {
        self.records.iter()
    }

    /// Record for one entity.
    ///
    /// This is a linear scan over `records`; use [`iter`](Self::iter) when looking up many
    /// entities.
    pub fn get(&self, entity: &str) -> Option<&DifferentialResult> {
        self.records.iter().find(|r| r.entity == entity)
    }

    /// Records flagged significant, in row order
    pub fn significant(&self) -> impl Iterator<Item = &DifferentialResult> {
        self.records.iter().filter(|r| r.significant)
    }

    /// Get indices of significant entities
    pub fn significant_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| if r.significant { Some(i) } else { None })
            .collect()
    }

    /// Get the number of significant entities
    pub fn num_significant(&self) -> usize {
        self.significant().count()
    }

    /// Get top n entities by p-value; undefined p-values sort last
    pub fn top_features(&self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.records.len()).collect();
        indices.sort_by(|&a, &b| {
            let pa = self.records[a].p_value;
            let pb = self.records[b].p_value;
            match (pa.is_nan(), pb.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => pa.partial_cmp(&pb).unwrap_or(Ordering::Equal),
            }
        });
        indices.truncate(n);
        indices
    }
}

impl<'a> IntoIterator for &'a DifferentialResults {
    type Item = &'a DifferentialResult;
    type IntoIter = std::slice::Iter<'a, DifferentialResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
