//! Smoothed probability estimates used by the naive-Bayes leaf predictor.

/// Relative frequency `r / n`.
#[inline]
pub fn relative_frequency(positives: u64, all: u64) -> f64 {
    if all == 0 {
        return 0.0;
    }
    positives as f64 / all as f64
}

/// Laplace estimate `(r + 1) / (n + k)` for `k` possible outcomes; see
/// Kononenko & Robnik-Sikonja.
#[inline]
pub fn laplace(positives: u64, all: u64, outcomes: usize) -> f64 {
    (positives as f64 + 1.0) / (all as f64 + outcomes as f64)
}

/// m-estimate `(r + m * p0) / (n + m)` with apriori probability `p0`; see
/// Cestnik's thesis. `m` expresses how much trust goes to the prior.
#[inline]
pub fn m_estimate(positives: u64, all: u64, apriori: f64, m: f64) -> f64 {
    (positives as f64 + apriori * m) / (all as f64 + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn relative_frequency_basic() {
        assert!((relative_frequency(3, 4) - 0.75).abs() <= EPS);
        assert_eq!(relative_frequency(0, 0), 0.0);
    }

    #[test]
    fn laplace_never_zero_or_one() {
        let p = laplace(0, 10, 2);
        assert!(p > 0.0);
        let q = laplace(10, 10, 2);
        assert!(q < 1.0);
        assert!((laplace(3, 10, 2) - 4.0 / 12.0).abs() <= EPS);
    }

    #[test]
    fn m_estimate_interpolates_toward_prior() {
        // no data: estimate equals the prior
        assert!((m_estimate(0, 0, 0.3, 2.0) - 0.3).abs() <= EPS);
        // plenty of data: estimate approaches the relative frequency
        let p = m_estimate(900, 1000, 0.3, 2.0);
        assert!((p - 0.9).abs() < 0.01);
    }
}
