use crate::core::estimators::WelfordEstimator;
use crate::core::id_gen::IdGen;
use crate::utils::math::{entropy, gini};

/// One cell of a [`Histogram`].
///
/// `value` keys the bin within the attribute's range. For classification the
/// bin counts examples per class; for regression it aggregates the target of
/// the examples that fell into it with a Welford estimator. Ids are issued at
/// creation and survive merges on the left operand, so deletions can find
/// their bin long after the histogram reshaped itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    id: u64,
    value: f64,
    count: u64,
    partition: Vec<u64>,
    stats: WelfordEstimator,
}

impl Bin {
    fn new(id: u64, value: f64, n_classes: usize) -> Self {
        Self {
            id,
            value,
            count: 0,
            partition: vec![0; n_classes],
            stats: WelfordEstimator::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn partition(&self) -> &[u64] {
        &self.partition
    }

    pub fn stats(&self) -> &WelfordEstimator {
        &self.stats
    }
}

/// Online summary of one continuous attribute at one leaf.
///
/// Holds at most `cap` bins in strictly increasing value order. An insert
/// either lands in the bin matching its value exactly or opens a new bin;
/// overflowing the capacity merges the two adjacent bins with the smallest
/// value gap. Supports symmetric deletion so a bounded window of examples
/// can be forgotten.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    bins: Vec<Bin>,
    cap: usize,
    n_classes: usize,
}

impl Histogram {
    /// Classification histogram: bins partition their counts over `n_classes`.
    pub fn classification(cap: usize, n_classes: usize) -> Self {
        assert!(cap >= 2, "histogram capacity must be at least 2");
        Self {
            bins: Vec::new(),
            cap,
            n_classes,
        }
    }

    /// Regression histogram: bins aggregate the target with Welford statistics.
    pub fn regression(cap: usize) -> Self {
        assert!(cap >= 2, "histogram capacity must be at least 2");
        Self {
            bins: Vec::new(),
            cap,
            n_classes: 0,
        }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Inserts an attribute value with its class label. Returns the id of the
    /// bin that absorbed the example, after any merge.
    pub fn insert_labeled(&mut self, x: f64, label: usize, ids: &mut IdGen) -> u64 {
        assert!(x.is_finite(), "histogram values must be finite");
        assert!(label < self.n_classes, "label out of range");
        match self.position_of(x) {
            Ok(i) => {
                self.bins[i].count += 1;
                self.bins[i].partition[label] += 1;
                self.bins[i].id
            }
            Err(i) => {
                let mut bin = Bin::new(ids.next_bin_id(), x, self.n_classes);
                bin.count = 1;
                bin.partition[label] = 1;
                let id = bin.id;
                self.bins.insert(i, bin);
                self.shrink_to_cap(id)
            }
        }
    }

    /// Inserts an attribute value `x` carrying regression target `y`. Returns
    /// the id of the bin that absorbed the example, after any merge.
    pub fn insert_value(&mut self, x: f64, y: f64, ids: &mut IdGen) -> u64 {
        assert!(x.is_finite(), "histogram values must be finite");
        match self.position_of(x) {
            Ok(i) => {
                self.bins[i].count += 1;
                self.bins[i].stats.insert(y);
                self.bins[i].id
            }
            Err(i) => {
                let mut bin = Bin::new(ids.next_bin_id(), x, 0);
                bin.count = 1;
                bin.stats.insert(y);
                let id = bin.id;
                self.bins.insert(i, bin);
                self.shrink_to_cap(id)
            }
        }
    }

    /// Removes one labeled example from the bin identified by `bin_id`. A bin
    /// id consumed by a merge falls back to the bin nearest `x`; driving any
    /// count negative, or deleting from an empty histogram, is an invariant
    /// breach and panics.
    pub fn remove_labeled(&mut self, bin_id: u64, x: f64, label: usize) {
        let i = self.locate(bin_id, x);
        let bin = &mut self.bins[i];
        assert!(bin.count > 0, "negative count in bin {}", bin.id);
        assert!(
            bin.partition[label] > 0,
            "negative partition count for label {label} in bin {}",
            bin.id
        );
        bin.count -= 1;
        bin.partition[label] -= 1;
        if bin.count == 0 {
            self.bins.remove(i);
        }
    }

    /// Removes one regression example, reversing the Welford update of `y`.
    pub fn remove_value(&mut self, bin_id: u64, x: f64, y: f64) {
        let i = self.locate(bin_id, x);
        let bin = &mut self.bins[i];
        assert!(bin.count > 0, "negative count in bin {}", bin.id);
        bin.count -= 1;
        bin.stats.remove(y);
        if bin.count == 0 {
            self.bins.remove(i);
        }
    }

    /// Best split under information gain: `(gain, threshold)` with the
    /// threshold at a bin value, splitting `<= t` against `> t`.
    pub fn info_gain(&self) -> Option<(f64, f64)> {
        self.best_partition_split(entropy)
    }

    /// Best split under Gini gain.
    pub fn gini_gain(&self) -> Option<(f64, f64)> {
        self.best_partition_split(gini)
    }

    /// Best split under standard-deviation reduction of the target.
    pub fn std_gain(&self) -> Option<(f64, f64)> {
        if self.bins.len() < 2 {
            return None;
        }

        // Suffix merges give the right-side statistics for every boundary.
        let mut suffix = vec![WelfordEstimator::new(); self.bins.len() + 1];
        for i in (0..self.bins.len()).rev() {
            let mut acc = self.bins[i].stats;
            acc.merge(&suffix[i + 1]);
            suffix[i] = acc;
        }
        let parent = suffix[0];
        let n = parent.count();
        if n == 0 {
            return None;
        }

        let mut best: Option<(f64, f64)> = None;
        let mut left = WelfordEstimator::new();
        for i in 0..self.bins.len() - 1 {
            left.merge(&self.bins[i].stats);
            let right = suffix[i + 1];
            if left.count() == 0 || right.count() == 0 {
                continue;
            }
            let wl = left.count() as f64 / n as f64;
            let wr = right.count() as f64 / n as f64;
            let gain = parent.std_dev() - (wl * left.std_dev() + wr * right.std_dev());
            if best.is_none_or(|(g, _)| gain > g) {
                best = Some((gain, self.bins[i].value));
            }
        }
        best
    }

    fn best_partition_split(&self, impurity: fn(&[u64], u64) -> f64) -> Option<(f64, f64)> {
        if self.bins.len() < 2 {
            return None;
        }

        let mut totals = vec![0u64; self.n_classes];
        for bin in &self.bins {
            for (t, p) in totals.iter_mut().zip(&bin.partition) {
                *t += p;
            }
        }
        let n: u64 = totals.iter().sum();
        if n == 0 {
            return None;
        }
        let parent = impurity(&totals, n);

        let mut best: Option<(f64, f64)> = None;
        let mut left = vec![0u64; self.n_classes];
        let mut left_n = 0u64;
        for i in 0..self.bins.len() - 1 {
            for (l, p) in left.iter_mut().zip(&self.bins[i].partition) {
                *l += p;
            }
            left_n += self.bins[i].count;
            let right_n = n - left_n;
            if left_n == 0 || right_n == 0 {
                continue;
            }
            let right: Vec<u64> = totals.iter().zip(&left).map(|(t, l)| t - l).collect();
            let weighted = (left_n as f64 / n as f64) * impurity(&left, left_n)
                + (right_n as f64 / n as f64) * impurity(&right, right_n);
            let gain = parent - weighted;
            if best.is_none_or(|(g, _)| gain > g) {
                best = Some((gain, self.bins[i].value));
            }
        }
        best
    }

    fn position_of(&self, x: f64) -> Result<usize, usize> {
        self.bins
            .binary_search_by(|b| b.value.partial_cmp(&x).expect("bin values are finite"))
    }

    fn locate(&self, bin_id: u64, x: f64) -> usize {
        assert!(!self.bins.is_empty(), "missing bin {bin_id} during delete");
        if let Some(i) = self.bins.iter().position(|b| b.id == bin_id) {
            return i;
        }
        // The id was consumed by a merge; the nearest bin by value inherited
        // the contents.
        let mut nearest = 0;
        let mut gap = f64::INFINITY;
        for (i, bin) in self.bins.iter().enumerate() {
            let d = (bin.value - x).abs();
            if d < gap {
                gap = d;
                nearest = i;
            }
        }
        nearest
    }

    /// Merges the two adjacent bins with the smallest value gap whenever the
    /// capacity is exceeded. The left operand keeps its id; the merged value
    /// is the count-weighted average. Returns the id now holding the freshly
    /// inserted example.
    fn shrink_to_cap(&mut self, inserted_id: u64) -> u64 {
        if self.bins.len() <= self.cap {
            return inserted_id;
        }

        let mut at = 0;
        let mut gap = f64::INFINITY;
        for i in 0..self.bins.len() - 1 {
            let d = self.bins[i + 1].value - self.bins[i].value;
            if d < gap {
                gap = d;
                at = i;
            }
        }

        let right = self.bins.remove(at + 1);
        let left = &mut self.bins[at];
        let total = left.count + right.count;
        if total > 0 {
            left.value = (left.value * left.count as f64 + right.value * right.count as f64)
                / total as f64;
        }
        left.count = total;
        for (l, r) in left.partition.iter_mut().zip(&right.partition) {
            *l += r;
        }
        left.stats.merge(&right.stats);

        if right.id == inserted_id {
            left.id
        } else {
            inserted_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn filled_classification(n: usize, seed: u64) -> (Histogram, IdGen) {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(100, 2);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..n {
            let x: f64 = rng.random_range(0.0..1.0);
            let label = usize::from(x > 0.5);
            hist.insert_labeled(x, label, &mut ids);
        }
        (hist, ids)
    }

    #[test]
    fn bin_values_stay_strictly_increasing() {
        let (hist, _) = filled_classification(500, 3);
        for pair in hist.bins().windows(2) {
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn total_count_matches_inserts() {
        let (hist, _) = filled_classification(500, 5);
        assert_eq!(hist.total_count(), 500);
    }

    #[test]
    fn matching_value_reuses_bin() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        let a = hist.insert_labeled(0.5, 0, &mut ids);
        let b = hist.insert_labeled(0.5, 1, &mut ids);
        assert_eq!(a, b);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.bins()[0].count(), 2);
        assert_eq!(hist.bins()[0].partition(), &[1, 1]);
    }

    #[test]
    fn capacity_overflow_merges_smallest_gap() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(3, 2);
        for &x in &[0.0, 1.0, 2.0] {
            hist.insert_labeled(x, 0, &mut ids);
        }
        // 2.1 sits closest to 2.0: those two merge.
        hist.insert_labeled(2.1, 1, &mut ids);
        assert_eq!(hist.len(), 3);
        let merged = &hist.bins()[2];
        assert!((merged.value() - 2.05).abs() <= EPS);
        assert_eq!(merged.count(), 2);
        assert_eq!(merged.partition(), &[1, 1]);
    }

    #[test]
    fn merge_keeps_left_id_and_reports_absorbing_bin() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(2, 2);
        let first = hist.insert_labeled(0.0, 0, &mut ids);
        hist.insert_labeled(10.0, 0, &mut ids);
        // Overflows and merges with the bin at 0.0; the left id survives.
        let absorbed = hist.insert_labeled(0.1, 1, &mut ids);
        assert_eq!(absorbed, first);
        assert_eq!(hist.len(), 2);
    }

    #[test]
    fn insert_then_delete_restores_state() {
        let (mut hist, mut ids) = filled_classification(200, 9);
        let before = hist.clone();

        let bin = hist.insert_labeled(0.333, 0, &mut ids);
        hist.remove_labeled(bin, 0.333, 0);

        assert_eq!(hist.len(), before.len());
        for (a, b) in hist.bins().iter().zip(before.bins()) {
            assert!((a.value() - b.value()).abs() <= EPS);
            assert_eq!(a.count(), b.count());
            assert_eq!(a.partition(), b.partition());
        }
    }

    #[test]
    fn delete_with_stale_id_falls_back_to_nearest_bin() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        hist.insert_labeled(0.0, 0, &mut ids);
        hist.insert_labeled(1.0, 1, &mut ids);
        hist.remove_labeled(999, 0.9, 1);
        assert_eq!(hist.total_count(), 1);
        assert_eq!(hist.bins()[0].value(), 0.0);
    }

    #[test]
    fn deleting_last_example_drops_the_bin() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        let bin = hist.insert_labeled(0.7, 1, &mut ids);
        hist.remove_labeled(bin, 0.7, 1);
        assert!(hist.is_empty());
    }

    #[test]
    #[should_panic(expected = "missing bin")]
    fn delete_from_empty_histogram_panics() {
        let mut hist = Histogram::classification(10, 2);
        hist.remove_labeled(1, 0.5, 0);
    }

    #[test]
    #[should_panic(expected = "negative partition count")]
    fn deleting_wrong_label_panics() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        let bin = hist.insert_labeled(0.5, 0, &mut ids);
        hist.remove_labeled(bin, 0.5, 1);
    }

    #[test]
    fn info_gain_finds_separating_threshold() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        for _ in 0..50 {
            hist.insert_labeled(0.1, 0, &mut ids);
            hist.insert_labeled(0.9, 1, &mut ids);
        }
        let (gain, threshold) = hist.info_gain().unwrap();
        assert!((gain - 1.0).abs() <= EPS, "expected one full bit, got {gain}");
        assert_eq!(threshold, 0.1);
    }

    #[test]
    fn gini_gain_finds_separating_threshold() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        for _ in 0..50 {
            hist.insert_labeled(0.2, 0, &mut ids);
            hist.insert_labeled(0.8, 1, &mut ids);
        }
        let (gain, threshold) = hist.gini_gain().unwrap();
        assert!((gain - 0.5).abs() <= EPS);
        assert_eq!(threshold, 0.2);
    }

    #[test]
    fn gain_is_none_for_single_bin() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::classification(10, 2);
        hist.insert_labeled(0.5, 0, &mut ids);
        assert!(hist.info_gain().is_none());
        assert!(hist.gini_gain().is_none());
    }

    #[test]
    fn std_gain_separates_target_clusters() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::regression(10);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..100 {
            hist.insert_value(0.0, rng.random_range(-0.1..0.1), &mut ids);
            hist.insert_value(1.0, 10.0 + rng.random_range(-0.1..0.1), &mut ids);
        }
        let (gain, threshold) = hist.std_gain().unwrap();
        assert_eq!(threshold, 0.0);
        // Parent std is about 5; each side is under 0.1.
        assert!(gain > 4.0, "gain={gain}");
    }

    #[test]
    fn regression_delete_reverses_welford() {
        let mut ids = IdGen::new();
        let mut hist = Histogram::regression(10);
        hist.insert_value(1.0, 3.0, &mut ids);
        let bin = hist.insert_value(1.0, 5.0, &mut ids);
        hist.remove_value(bin, 1.0, 5.0);
        let stats = hist.bins()[0].stats();
        assert_eq!(stats.count(), 1);
        assert!((stats.mean() - 3.0).abs() <= EPS);
    }
}
