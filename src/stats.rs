//! Group-by helpers shared by the report stages and the dashboard queries.

use std::collections::BTreeMap;

/// True median: the middle order statistic, or the midpoint of the two
/// middle ones for even counts. Reorders `values`.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Collects `(key, value)` pairs into per-key buckets, keys ascending.
pub fn group<K, I>(pairs: I) -> BTreeMap<K, Vec<f64>>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
}

pub fn median_by<K, I>(pairs: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    group(pairs)
        .into_iter()
        .filter_map(|(key, mut values)| median(&mut values).map(|m| (key, m)))
        .collect()
}

pub fn mean_by<K, I>(pairs: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    group(pairs)
        .into_iter()
        .filter_map(|(key, values)| mean(&values).map(|m| (key, m)))
        .collect()
}

/// How much larger `a` is than `b`, in percent.
pub fn pct_delta(a: f64, b: f64) -> Option<f64> {
    if b == 0.0 {
        None
    } else {
        Some(100.0 * a / b - 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [100.0, 200.0]), Some(150.0));
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&mut [7.0]), Some(7.0));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn median_is_not_mean() {
        assert_eq!(median(&mut [1.0, 2.0, 100.0]), Some(2.0));
        assert_eq!(mean(&[1.0, 2.0, 100.0]), Some(103.0 / 3.0));
    }

    #[test]
    fn grouped_aggregates() {
        let pairs = vec![("b", 1.0), ("a", 10.0), ("b", 3.0), ("a", 20.0), ("a", 40.0)];
        let medians = median_by(pairs.clone());
        assert_eq!(medians.get("a"), Some(&20.0));
        assert_eq!(medians.get("b"), Some(&2.0));

        let means = mean_by(pairs);
        let keys: Vec<_> = means.keys().copied().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!((means["a"] - 70.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn pct_delta_values() {
        assert!((pct_delta(130.0, 100.0).unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(pct_delta(50.0, 100.0), Some(-50.0));
        assert_eq!(pct_delta(1.0, 0.0), None);
    }
}
