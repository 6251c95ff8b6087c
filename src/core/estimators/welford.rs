/// Streaming estimator of mean and variance over a removable sample.
///
/// Maintains the count, the running mean, the sum of squared deviations from
/// the mean (`var_sum`) and the plain sum, updated with Welford's recurrence.
/// Unlike a plain accumulator it also supports `remove`, reversing the
/// recurrence so a bounded window of observations can be forgotten, and
/// `merge`, combining two disjoint samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WelfordEstimator {
    count: u64,
    mean: f64,
    var_sum: f64,
    sum: f64,
}

impl WelfordEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, value: f64) {
        if value.is_infinite() || value.is_nan() {
            return;
        }
        self.count += 1;
        let delta = value - self.mean;
        self.sum += value;
        self.mean += delta / self.count as f64;
        self.var_sum += delta * (value - self.mean);
    }

    /// Reverses one `insert` of `value`. The caller is responsible for only
    /// removing values that were previously inserted.
    #[inline]
    pub fn remove(&mut self, value: f64) {
        assert!(self.count > 0, "removing from an empty estimator");
        self.count -= 1;
        if self.count == 0 {
            *self = Self::default();
            return;
        }
        let delta = value - self.mean;
        self.mean -= delta / self.count as f64;
        self.var_sum -= delta * (value - self.mean);
        self.sum -= value;
        if self.var_sum < 0.0 {
            self.var_sum = 0.0;
        }
    }

    /// Folds a disjoint sample into this one (Chan et al.'s parallel update).
    pub fn merge(&mut self, other: &WelfordEstimator) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n1 = self.count as f64;
        let n2 = other.count as f64;
        let delta = other.mean - self.mean;
        let n = n1 + n2;
        self.var_sum += other.var_sum + delta * delta * n1 * n2 / n;
        self.mean = (n1 * self.mean + n2 * other.mean) / n;
        self.sum += other.sum;
        self.count += other.count;
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    #[inline]
    pub fn var_sum(&self) -> f64 {
        self.var_sum
    }

    /// Population variance `var_sum / count`; zero when empty.
    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.var_sum / self.count as f64
        } else {
            0.0
        }
    }

    /// Unbiased sample variance `var_sum / (count - 1)`. Documented for
    /// completeness; split decisions use the population form.
    pub fn variance_unbiased(&self) -> f64 {
        if self.count > 1 {
            self.var_sum / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn two_pass(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        (mean, var)
    }

    #[test]
    fn starts_empty() {
        let w = WelfordEstimator::new();
        assert_eq!(w.count(), 0);
        assert!(approx_eq(w.mean(), 0.0, EPS));
        assert!(approx_eq(w.variance(), 0.0, EPS));
    }

    #[test]
    fn matches_two_pass_on_random_sequence() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..1000).map(|_| rng.random_range(-50.0..50.0)).collect();

        let mut w = WelfordEstimator::new();
        for &x in &values {
            w.insert(x);
        }

        let (mean, var) = two_pass(&values);
        assert!(approx_eq(w.mean(), mean, EPS));
        assert!(approx_eq(w.variance(), var, EPS));
        assert!(approx_eq(w.sum(), values.iter().sum(), 1e-6));
    }

    #[test]
    fn insert_then_remove_restores_prior_state() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut w = WelfordEstimator::new();
        for _ in 0..100 {
            w.insert(rng.random_range(0.0..10.0));
        }
        let before = w;

        let x = 4.25;
        w.insert(x);
        w.remove(x);

        assert_eq!(w.count(), before.count());
        assert!(approx_eq(w.mean(), before.mean(), EPS));
        assert!(approx_eq(w.var_sum(), before.var_sum(), EPS));
    }

    #[test]
    fn removing_last_value_resets() {
        let mut w = WelfordEstimator::new();
        w.insert(3.0);
        w.remove(3.0);
        assert_eq!(w, WelfordEstimator::default());
    }

    #[test]
    fn merge_equals_bulk_insertion() {
        let mut rng = StdRng::seed_from_u64(13);
        let left: Vec<f64> = (0..40).map(|_| rng.random_range(-5.0..5.0)).collect();
        let right: Vec<f64> = (0..60).map(|_| rng.random_range(10.0..20.0)).collect();

        let mut a = WelfordEstimator::new();
        let mut b = WelfordEstimator::new();
        let mut whole = WelfordEstimator::new();
        for &x in &left {
            a.insert(x);
            whole.insert(x);
        }
        for &x in &right {
            b.insert(x);
            whole.insert(x);
        }
        a.merge(&b);

        assert_eq!(a.count(), whole.count());
        assert!(approx_eq(a.mean(), whole.mean(), EPS));
        assert!(approx_eq(a.variance(), whole.variance(), 1e-7));
    }

    #[test]
    fn ignores_non_finite_values() {
        let mut w = WelfordEstimator::new();
        w.insert(f64::NAN);
        w.insert(f64::INFINITY);
        assert_eq!(w.count(), 0);
    }

    #[test]
    #[should_panic(expected = "removing from an empty estimator")]
    fn remove_from_empty_panics() {
        let mut w = WelfordEstimator::new();
        w.remove(1.0);
    }
}
