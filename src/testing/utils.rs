use crate::data::AbundanceTable;
use crate::error::{AnalysisError, Result};
use std::collections::HashSet;

/// Resolve two groups of sample identifiers to column indices.
///
/// Both groups must be non-empty, free of repeats, disjoint, and made of identifiers
/// present in the table.
pub fn resolve_groups<S>(
    table: &AbundanceTable,
    group1: &[S],
    group2: &[S],
) -> Result<(Vec<usize>, Vec<usize>)>
where
    S: AsRef<str>,
{
    if group1.is_empty() || group2.is_empty() {
        return Err(AnalysisError::InvalidArgument(
            "Sample groups cannot be empty".to_string(),
        ));
    }

    let group1_indices = resolve_group(table, group1, "group1")?;
    let group2_indices = resolve_group(table, group2, "group2")?;

    let group1_set: HashSet<usize> = group1_indices.iter().copied().collect();
    if let Some(&shared) = group2_indices.iter().find(|&&idx| group1_set.contains(&idx)) {
        return Err(AnalysisError::InvalidArgument(format!(
            "Sample '{}' appears in both groups",
            table.column_ids()[shared]
        )));
    }

    Ok((group1_indices, group2_indices))
}

fn resolve_group<S>(table: &AbundanceTable, group: &[S], label: &str) -> Result<Vec<usize>>
where
    S: AsRef<str>,
{
    let mut seen = HashSet::with_capacity(group.len());
    group
        .iter()
        .map(|sample| {
            let sample = sample.as_ref();
            let idx = table.column_position(sample).ok_or_else(|| {
                AnalysisError::InvalidArgument(format!(
                    "Sample '{}' in {} not found in table",
                    sample, label
                ))
            })?;
            if !seen.insert(idx) {
                return Err(AnalysisError::InvalidArgument(format!(
                    "Sample '{}' listed twice in {}",
                    sample, label
                )));
            }
            Ok(idx)
        })
        .collect()
}
