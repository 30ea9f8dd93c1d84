/// Arithmetic mean of a group; NaN for an empty group
pub fn group_mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fold change of group 2 over group 1 (the reference group).
///
/// Plain float division: a zero reference mean gives infinity, or NaN when both means are zero.
pub fn fold_change(group1_mean: f64, group2_mean: f64) -> f64 {
    group2_mean / group1_mean
}

/// `log2` of a fold change; `-inf` for zero and NaN for negative fold changes
pub fn log2_fold_change(fold_change: f64) -> f64 {
    fold_change.log2()
}

/// Whether a fold change comparison is numerically degenerate.
///
/// True when the reference mean is zero or the fold change is not strictly positive.
pub fn is_degenerate(group1_mean: f64, fold_change: f64) -> bool {
    group1_mean == 0.0 || !(fold_change > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_log2_fold_change() {
        // ~2 vs ~8
        let fc = fold_change(group_mean(&[2.0, 2.2, 1.8]), group_mean(&[8.0, 7.5, 8.5]));
        assert_abs_diff_eq!(fc, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(log2_fold_change(fc), 2.0, epsilon = 1e-12);

        // ~5 vs ~5
        let fc = fold_change(group_mean(&[5.0, 5.1, 4.9]), group_mean(&[5.0, 5.1, 4.9]));
        assert_abs_diff_eq!(log2_fold_change(fc), 0.0, epsilon = 1e-12);

        // ~3 vs ~5
        let fc = fold_change(3.0, 5.0);
        assert_abs_diff_eq!(log2_fold_change(fc), 0.737, epsilon = 0.001);
    }

    #[test]
    fn test_reciprocal_on_swap() {
        let (m1, m2) = (3.5, 12.25);
        assert_abs_diff_eq!(fold_change(m1, m2) * fold_change(m2, m1), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            log2_fold_change(fold_change(m1, m2)),
            -log2_fold_change(fold_change(m2, m1)),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_means() {
        // 0 vs ~10
        let fc = fold_change(0.0, 10.0);
        assert!(fc.is_infinite());
        assert!(is_degenerate(0.0, fc));

        // ~10 vs 0
        let fc = fold_change(10.0, 0.0);
        assert_eq!(fc, 0.0);
        assert_eq!(log2_fold_change(fc), f64::NEG_INFINITY);
        assert!(is_degenerate(10.0, fc));

        let fc = fold_change(0.0, 0.0);
        assert!(fc.is_nan());
        assert!(is_degenerate(0.0, fc));

        assert!(!is_degenerate(2.0, fold_change(2.0, 3.0)));
    }

    #[test]
    fn test_negative_values() {
        // z-scored inputs can have negative means
        let fc = fold_change(-2.0, 8.0);
        assert!(fc < 0.0);
        assert!(log2_fold_change(fc).is_nan());
        assert!(is_degenerate(-2.0, fc));
    }
}
