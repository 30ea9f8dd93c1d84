use crate::data::AbundanceTable;
use crate::error::Result;
use crate::testing::effect;
use crate::testing::utils::resolve_groups;
use crate::testing::{DifferentialOptions, DifferentialResult, DifferentialResults, TTestType, TestResult};
use log::debug;

pub mod parametric;

pub trait DifferentialAnalyzer {
    fn t_test<S: AsRef<str>>(
        &self,
        group1: &[S],
        group2: &[S],
        test_type: TTestType,
    ) -> Result<Vec<TestResult<f64>>>;

    fn compare<S: AsRef<str>>(
        &self,
        group1: &[S],
        group2: &[S],
        options: &DifferentialOptions,
    ) -> Result<DifferentialResults>;
}

impl DifferentialAnalyzer for AbundanceTable {
    fn t_test<S: AsRef<str>>(
        &self,
        group1: &[S],
        group2: &[S],
        test_type: TTestType,
    ) -> Result<Vec<TestResult<f64>>> {
        let (group1_indices, group2_indices) = resolve_groups(self, group1, group2)?;
        parametric::t_test_table_groups(self, &group1_indices, &group2_indices, test_type)
    }

    fn compare<S: AsRef<str>>(
        &self,
        group1: &[S],
        group2: &[S],
        options: &DifferentialOptions,
    ) -> Result<DifferentialResults> {
        compare(self, group1, group2, options)
    }
}

/// Compare two sample groups across every entity of the table.
///
/// Each entity gets a two-sided t-test (group 1 against group 2), the fold change of
/// group 2 over group 1 and a significance flag `p_value < threshold`. Results come back
/// in table row order, one per entity.
///
/// Fails without a partial result if the groups are invalid, the threshold is outside
/// (0, 1), or (under the strict policy) any entity has a zero group 1 mean or a
/// non-positive fold change.
pub fn compare<S>(
    table: &AbundanceTable,
    group1: &[S],
    group2: &[S],
    options: &DifferentialOptions,
) -> Result<DifferentialResults>
where
    S: AsRef<str>,
{
    options.validate()?;
    let (group1_indices, group2_indices) = resolve_groups(table, group1, group2)?;

    debug!(
        "Comparing {} vs {} samples across {} entities ({:?} t-test, threshold {})",
        group1_indices.len(),
        group2_indices.len(),
        table.n_rows(),
        options.test_type,
        options.threshold
    );

    let tests = parametric::t_test_table_groups(
        table,
        &group1_indices,
        &group2_indices,
        options.test_type,
    )?;

    let mut group1_values = Vec::with_capacity(group1_indices.len());
    let mut group2_values = Vec::with_capacity(group2_indices.len());
    let mut records = Vec::with_capacity(table.n_rows());

    for ((row_idx, entity), test) in table.row_ids().iter().enumerate().zip(tests) {
        let row = table.row(row_idx);
        group1_values.clear();
        group1_values.extend(group1_indices.iter().map(|&c| row[c]));
        group2_values.clear();
        group2_values.extend(group2_indices.iter().map(|&c| row[c]));

        let group1_mean = effect::group_mean(&group1_values);
        let group2_mean = effect::group_mean(&group2_values);
        let fold_change = effect::fold_change(group1_mean, group2_mean);

        if effect::is_degenerate(group1_mean, fold_change) {
            options.policy.check(|| {
                format!(
                    "Entity '{}' has group means {} and {}, log2 fold change is undefined",
                    entity, group1_mean, group2_mean
                )
            })?;
        }

        records.push(DifferentialResult {
            entity: entity.clone(),
            p_value: test.p_value,
            t_statistic: test.statistic,
            fold_change,
            log2_fold_change: effect::log2_fold_change(fold_change),
            significant: test.is_significant(options.threshold),
            group1_mean,
            group2_mean,
        });
    }

    let results = DifferentialResults {
        records,
        threshold: options.threshold,
        test_type: options.test_type,
    };
    debug!(
        "{} of {} entities significant at p < {}",
        results.num_significant(),
        results.len(),
        options.threshold
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, DegeneratePolicy};
    use approx::assert_abs_diff_eq;

    fn create_test_table() -> AbundanceTable {
        // Two groups (S1..S3 vs S4..S6)
        // M1: clear difference, M2: none, M3: moderate, M4: constant
        AbundanceTable::from_rows(
            vec!["M1".into(), "M2".into(), "M3".into(), "M4".into()],
            (1..=6).map(|i| format!("S{}", i)).collect(),
            vec![
                vec![2.0, 2.2, 1.8, 8.0, 7.5, 8.5],
                vec![5.0, 5.1, 4.9, 5.0, 5.1, 4.9],
                vec![3.0, 3.3, 2.7, 5.0, 4.7, 5.3],
                vec![10.0, 10.0, 10.0, 10.0, 10.0, 10.0],
            ],
        )
        .unwrap()
    }

    const G1: [&str; 3] = ["S1", "S2", "S3"];
    const G2: [&str; 3] = ["S4", "S5", "S6"];

    #[test]
    fn test_one_record_per_entity_in_row_order() {
        let table = create_test_table();
        let results = table.compare(&G1, &G2, &DifferentialOptions::default()).unwrap();

        assert_eq!(results.len(), 4);
        let entities: Vec<&str> = results.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["M1", "M2", "M3", "M4"]);
        for r in &results {
            assert_eq!(r.significant, r.p_value < 0.05);
        }
    }

    #[test]
    fn test_differential_values() {
        let table = create_test_table();
        let results = compare(&table, &G1, &G2, &DifferentialOptions::default()).unwrap();

        let m1 = &results.records[0];
        assert_abs_diff_eq!(m1.group1_mean, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m1.group2_mean, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m1.log2_fold_change, 2.0, epsilon = 1e-12);
        assert!(m1.t_statistic < 0.0);
        assert!(m1.significant);

        let m2 = &results.records[1];
        assert_abs_diff_eq!(m2.fold_change, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m2.t_statistic, 0.0, epsilon = 1e-9);
        assert!(m2.p_value > 0.99);
        assert!(!m2.significant);

        assert!(results.records[2].significant);
    }

    #[test]
    fn test_constant_entity() {
        let table = create_test_table();
        let results = compare(&table, &G1, &G2, &DifferentialOptions::default()).unwrap();

        let m4 = results.get("M4").unwrap();
        assert_eq!(m4.fold_change, 1.0);
        assert_eq!(m4.log2_fold_change, 0.0);
        assert!(m4.p_value.is_nan());
        assert!(m4.t_statistic.is_nan());
        assert!(!m4.significant);
    }

    #[test]
    fn test_swapping_groups() {
        let table = create_test_table();
        let options = DifferentialOptions::default();
        let forward = compare(&table, &G1, &G2, &options).unwrap();
        let backward = compare(&table, &G2, &G1, &options).unwrap();

        for (f, b) in forward.iter().zip(backward.iter()).take(3) {
            assert_abs_diff_eq!(f.fold_change * b.fold_change, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(f.log2_fold_change, -b.log2_fold_change, epsilon = 1e-12);
            assert_abs_diff_eq!(f.t_statistic, -b.t_statistic, epsilon = 1e-9);
            assert_abs_diff_eq!(f.p_value, b.p_value, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_reference_mean() {
        let table = AbundanceTable::from_rows(
            vec!["Present".into(), "Absent".into()],
            (1..=4).map(|i| format!("S{}", i)).collect(),
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![0.0, 0.0, 6.0, 8.0]],
        )
        .unwrap();
        let (g1, g2) = (["S1", "S2"], ["S3", "S4"]);

        match compare(&table, &g1, &g2, &DifferentialOptions::default()) {
            Err(AnalysisError::DegenerateInput(msg)) => assert!(msg.contains("Absent")),
            other => panic!("expected degenerate input, got {:?}", other),
        }

        let options = DifferentialOptions::default().with_policy(DegeneratePolicy::Propagate);
        let results = compare(&table, &g1, &g2, &options).unwrap();
        let absent = results.get("Absent").unwrap();
        assert_eq!(absent.fold_change, f64::INFINITY);
        assert_eq!(absent.log2_fold_change, f64::INFINITY);
        assert!(absent.p_value.is_finite());
    }

    #[test]
    fn test_threshold_controls_significance() {
        let table = create_test_table();
        let strict = DifferentialOptions::default().with_threshold(1e-12);
        let results = compare(&table, &G1, &G2, &strict).unwrap();
        assert_eq!(results.num_significant(), 0);
        assert_eq!(results.threshold, 1e-12);

        let bad = DifferentialOptions::default().with_threshold(1.5);
        assert!(matches!(
            compare(&table, &G1, &G2, &bad),
            Err(AnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_welch_option() {
        let table = create_test_table();
        let options = DifferentialOptions::default().with_test_type(TTestType::Welch);
        let welch = compare(&table, &G1, &G2, &options).unwrap();
        let student = compare(&table, &G1, &G2, &DifferentialOptions::default()).unwrap();

        assert_eq!(welch.test_type, TTestType::Welch);
        // equal group sizes: same statistic, different degrees of freedom
        assert_abs_diff_eq!(
            welch.records[0].t_statistic,
            student.records[0].t_statistic,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_trait_t_test_rejects_unknown_sample() {
        let table = create_test_table();
        let result = table.t_test(&["S1", "S2"], &["S3", "S42"], TTestType::Student);
        match result {
            Err(AnalysisError::InvalidArgument(msg)) => assert!(msg.contains("S42")),
            other => panic!("expected invalid argument, got {:?}", other),
        }

        let tests = table.t_test(&G1, &G2, TTestType::Student).unwrap();
        assert_eq!(tests.len(), table.n_rows());
    }
}
