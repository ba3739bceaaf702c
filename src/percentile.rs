//! Score-at-percentile helper.

/// Score at the `per` percentile (0-100) of `values`.
///
/// When the percentile falls between two samples the result is linearly
/// interpolated. `limit` keeps only values inside the closed interval
/// `(lower, upper)`; it filters the same sequence that is then sorted and
/// indexed. With `sort` unset the values are indexed in the given order.
///
/// Returns `None` for an empty (or fully filtered) input or a percentile
/// outside `0..=100`.
///
/// ```
/// use seismo_core::score_at_percentile;
///
/// let a = [6.0, 47.0, 49.0, 15.0, 42.0, 41.0, 7.0, 39.0, 43.0, 40.0, 36.0];
/// assert_eq!(score_at_percentile(&a, 25.0, None, true), Some(25.5));
/// assert_eq!(score_at_percentile(&a, 50.0, None, true), Some(40.0));
/// assert_eq!(score_at_percentile(&a, 75.0, None, true), Some(42.5));
/// ```
pub fn score_at_percentile(
    values: &[f64],
    per: f64,
    limit: Option<(f64, f64)>,
    sort: bool,
) -> Option<f64> {
    if !(0.0..=100.0).contains(&per) {
        return None;
    }
    let mut kept: Vec<f64> = match limit {
        Some((lower, upper)) => values
            .iter()
            .copied()
            .filter(|v| lower <= *v && *v <= upper)
            .collect(),
        None => values.to_vec(),
    };
    if sort {
        kept.sort_by(f64::total_cmp);
    }

    let last = kept.len().checked_sub(1)?;
    let idx = per / 100.0 * last as f64;
    let lower = idx.floor() as usize;
    let fraction = idx - idx.floor();
    if fraction == 0.0 {
        return Some(kept[lower]);
    }
    Some(kept[lower] + (kept[lower + 1] - kept[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quartiles() {
        let a = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(score_at_percentile(&a, 25.0, None, true), Some(1.75));
        assert_eq!(score_at_percentile(&a, 50.0, None, true), Some(2.5));
        assert_eq!(score_at_percentile(&a, 75.0, None, true), Some(3.25));
        assert_eq!(score_at_percentile(&a, 0.0, None, true), Some(1.0));
        assert_eq!(score_at_percentile(&a, 100.0, None, true), Some(4.0));
    }

    #[test]
    fn test_limit_filters_before_sorting() {
        let a = [9.0, 1.0, 5.0, 3.0, 7.0];
        assert_eq!(score_at_percentile(&a, 50.0, Some((2.0, 8.0)), true), Some(5.0));
        // bounds are inclusive
        assert_eq!(score_at_percentile(&a, 0.0, Some((3.0, 7.0)), true), Some(3.0));
        assert_eq!(score_at_percentile(&a, 100.0, Some((3.0, 7.0)), true), Some(7.0));
    }

    #[test]
    fn test_unsorted() {
        let a = [4.0, 1.0, 3.0];
        assert_eq!(score_at_percentile(&a, 50.0, None, false), Some(1.0));
        assert_eq!(score_at_percentile(&a, 50.0, None, true), Some(3.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(score_at_percentile(&[], 50.0, None, true), None);
        assert_eq!(score_at_percentile(&[1.0], 50.0, Some((2.0, 3.0)), true), None);
        assert_eq!(score_at_percentile(&[1.0], 101.0, None, true), None);
        assert_eq!(score_at_percentile(&[1.0], f64::NAN, None, true), None);
        assert_eq!(score_at_percentile(&[7.0], 50.0, None, true), Some(7.0));
    }
}
