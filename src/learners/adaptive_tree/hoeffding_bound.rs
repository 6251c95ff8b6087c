/// Hoeffding bound: with confidence `1 - delta`, the true mean of a random
/// variable with range `range` lies within the returned epsilon of the mean
/// of `n` observations.
///
/// The range depends on the split heuristic: `log2(n_classes)` for
/// information gain, 1 for Gini gain, the target variance at the node for
/// standard-deviation gain.
#[inline]
pub fn epsilon(range: f64, n: u64, delta: f64) -> f64 {
    debug_assert!(n > 0, "Hoeffding bound needs at least one observation");
    debug_assert!(delta > 0.0 && delta < 1.0, "delta must lie in (0, 1)");
    ((range * range * (1.0 / delta).ln()) / (2.0 * n as f64)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_closed_form() {
        let got = epsilon(1.0, 1000, 0.05);
        let want = ((1.0f64 * (1.0 / 0.05f64).ln()) / 2000.0).sqrt();
        assert!((got - want).abs() < 1e-12);
    }

    #[test]
    fn positive_for_valid_inputs() {
        for &r in &[0.5, 1.0, 2.0] {
            for &n in &[1u64, 10, 1000, 1_000_000] {
                for &d in &[1e-7, 1e-3, 0.5] {
                    assert!(epsilon(r, n, d) > 0.0);
                }
            }
        }
    }

    #[test]
    fn decreases_monotonically_in_n() {
        let mut prev = f64::INFINITY;
        for n in [1u64, 2, 5, 10, 100, 1_000, 100_000] {
            let e = epsilon(2.0, n, 1e-6);
            assert!(e < prev);
            prev = e;
        }
    }

    #[test]
    fn grows_with_range_and_confidence() {
        assert!(epsilon(2.0, 100, 0.01) > epsilon(1.0, 100, 0.01));
        assert!(epsilon(1.0, 100, 1e-9) > epsilon(1.0, 100, 1e-2));
    }
}
