use crate::core::attributes::{AttrKind, AttributeSchema};
use crate::core::estimators::probabilities::{laplace, m_estimate, relative_frequency};
use crate::core::estimators::{FadingErrorEstimator, WelfordEstimator};
use crate::core::example::{AttributeValue, Example, LeafHit, Target};
use crate::core::id_gen::IdGen;
use crate::learners::adaptive_tree::config::{
    LeafPrediction, NbSmoothing, SplitHeuristic, TaskType, TreeConfig,
};
use crate::learners::adaptive_tree::histogram::Histogram;
use crate::utils::math::{entropy, gini};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub type NodeId = u64;

/// Sufficient statistics accumulated by a leaf.
///
/// Classification keeps per-label counts plus `(attribute, value, label)`
/// counts for discrete attributes; regression keeps Welford estimators of the
/// target, overall and per discrete attribute value. Continuous attributes
/// are summarized by one histogram each.
#[derive(Debug, Clone, Default)]
pub struct LeafStats {
    pub(crate) examples_seen: u64,
    pub(crate) label_counts: Vec<u64>,
    pub(crate) target: WelfordEstimator,
    pub(crate) discrete_counts: HashMap<(usize, usize, usize), u64>,
    pub(crate) discrete_targets: HashMap<(usize, usize), WelfordEstimator>,
    pub(crate) histograms: HashMap<usize, Histogram>,
}

impl LeafStats {
    fn new(n_classes: usize) -> Self {
        Self {
            label_counts: vec![0; n_classes],
            ..Self::default()
        }
    }

    pub fn examples_seen(&self) -> u64 {
        self.examples_seen
    }

    pub fn label_counts(&self) -> &[u64] {
        &self.label_counts
    }

    pub fn target(&self) -> &WelfordEstimator {
        &self.target
    }

    pub fn histogram(&self, attr: usize) -> Option<&Histogram> {
        self.histograms.get(&attr)
    }
}

/// Test installed by a split: the attribute index and, for a continuous
/// attribute, the `<= threshold` cut. Children are indexed by discrete value,
/// or `[<=, >]` for continuous tests.
#[derive(Debug, Clone)]
pub struct SplitTest {
    pub(crate) attr: usize,
    pub(crate) threshold: Option<f64>,
    pub(crate) children: Vec<NodeId>,
}

impl SplitTest {
    pub fn attr(&self) -> usize {
        self.attr
    }

    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(LeafStats),
    Internal(SplitTest),
}

/// Outcome of a candidate-split evaluation. `attr == None` is the sentinel
/// "do not split" entry with zero gain; it takes part in the ranking so weak
/// splits lose to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplitCandidate {
    pub attr: Option<usize>,
    pub threshold: Option<f64>,
    pub gain: f64,
}

impl SplitCandidate {
    fn sentinel() -> Self {
        Self {
            attr: None,
            threshold: None,
            gain: 0.0,
        }
    }
}

/// A tree node in the arena, keyed by its id.
///
/// The variant carries what the node's role needs: leaves their sufficient
/// statistics, internal nodes their split test. The drift fields are shared:
/// any node tracks a fading prequential error of the subtree below it, and a
/// node hosting alternates additionally runs the self-evaluation countdown
/// with its seen set and correct/all counters.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) used_attrs: Vec<usize>,
    pub(crate) alt_trees: Vec<NodeId>,
    pub(crate) test_mode_n: u64,
    pub(crate) seen: HashSet<u64>,
    pub(crate) correct: u64,
    pub(crate) all: u64,
    pub(crate) err: FadingErrorEstimator,
}

impl Node {
    pub(crate) fn new_leaf(
        id: NodeId,
        used_attrs: Vec<usize>,
        n_classes: usize,
        fading_factor: f64,
    ) -> Self {
        Self {
            id,
            kind: NodeKind::Leaf(LeafStats::new(n_classes)),
            used_attrs,
            alt_trees: Vec::new(),
            test_mode_n: 0,
            seen: HashSet::new(),
            correct: 0,
            all: 0,
            err: FadingErrorEstimator::new(fading_factor),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn stats(&self) -> Option<&LeafStats> {
        match &self.kind {
            NodeKind::Leaf(stats) => Some(stats),
            NodeKind::Internal(_) => None,
        }
    }

    pub fn split_test(&self) -> Option<&SplitTest> {
        match &self.kind {
            NodeKind::Internal(test) => Some(test),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn used_attrs(&self) -> &[usize] {
        &self.used_attrs
    }

    pub fn alt_trees(&self) -> &[NodeId] {
        &self.alt_trees
    }

    pub fn in_test_mode(&self) -> bool {
        self.test_mode_n > 0
    }

    /// Examples this node predicted correctly since its counters last reset.
    pub fn correct(&self) -> u64 {
        self.correct
    }

    /// Examples this node was scored on since its counters last reset.
    pub fn all(&self) -> u64 {
        self.all
    }

    /// Whether an example was withheld into this node's seen set during
    /// self-evaluation.
    pub fn is_sacrificed(&self, example: &Example) -> bool {
        self.seen.contains(&example.key())
    }

    pub(crate) fn record_result(&mut self, loss: f64) {
        self.err.add(loss);
        self.all += 1;
        if loss == 0.0 {
            self.correct += 1;
        }
    }

    /// Folds one example into the leaf statistics. Returns the leaf hit
    /// (leaf id plus per-attribute bin ids) the example must remember for
    /// forgetting.
    pub(crate) fn update_leaf(
        &mut self,
        example: &Example,
        config: &TreeConfig,
        n_classes: usize,
        ids: &mut IdGen,
    ) -> LeafHit {
        let id = self.id;
        let NodeKind::Leaf(stats) = &mut self.kind else {
            panic!("updating statistics of internal node {id}");
        };

        stats.examples_seen += 1;
        let mut hit = LeafHit {
            leaf_id: id,
            bins: Vec::new(),
        };

        match example.target() {
            Target::Label(label) => {
                stats.label_counts[label] += 1;
                for (attr, value) in example.values().iter().enumerate() {
                    match value {
                        AttributeValue::Discrete(v) => {
                            *stats.discrete_counts.entry((attr, *v, label)).or_insert(0) += 1;
                        }
                        AttributeValue::Numeric(x) => {
                            let hist = stats.histograms.entry(attr).or_insert_with(|| {
                                Histogram::classification(config.bins_cap, n_classes)
                            });
                            let bin = hist.insert_labeled(*x, label, ids);
                            hit.bins.push((attr, bin));
                        }
                    }
                }
            }
            Target::Value(y) => {
                stats.target.insert(y);
                for (attr, value) in example.values().iter().enumerate() {
                    match value {
                        AttributeValue::Discrete(v) => {
                            stats
                                .discrete_targets
                                .entry((attr, *v))
                                .or_default()
                                .insert(y);
                        }
                        AttributeValue::Numeric(x) => {
                            let hist = stats
                                .histograms
                                .entry(attr)
                                .or_insert_with(|| Histogram::regression(config.bins_cap));
                            let bin = hist.insert_value(*x, y, ids);
                            hit.bins.push((attr, bin));
                        }
                    }
                }
            }
        }
        hit
    }

    /// Reverses one `update_leaf` of an evicted example. Counts driven
    /// negative are invariant breaches and panic.
    pub(crate) fn forget(&mut self, example: &Example, hit: &LeafHit) {
        let id = self.id;
        let NodeKind::Leaf(stats) = &mut self.kind else {
            panic!("forgetting at internal node {id}");
        };
        assert!(stats.examples_seen > 0, "negative count at leaf {id}");
        stats.examples_seen -= 1;

        match example.target() {
            Target::Label(label) => {
                assert!(
                    stats.label_counts[label] > 0,
                    "negative label count at leaf {id}"
                );
                stats.label_counts[label] -= 1;
                for (attr, value) in example.values().iter().enumerate() {
                    match value {
                        AttributeValue::Discrete(v) => {
                            let count = stats
                                .discrete_counts
                                .get_mut(&(attr, *v, label))
                                .unwrap_or_else(|| {
                                    panic!("missing discrete count at leaf {id}")
                                });
                            assert!(*count > 0, "negative discrete count at leaf {id}");
                            *count -= 1;
                            if *count == 0 {
                                stats.discrete_counts.remove(&(attr, *v, label));
                            }
                        }
                        AttributeValue::Numeric(x) => {
                            let bin = hit
                                .bin_for(attr)
                                .unwrap_or_else(|| panic!("missing bin record at leaf {id}"));
                            let hist = stats
                                .histograms
                                .get_mut(&attr)
                                .unwrap_or_else(|| panic!("missing histogram at leaf {id}"));
                            hist.remove_labeled(bin, *x, label);
                        }
                    }
                }
            }
            Target::Value(y) => {
                stats.target.remove(y);
                for (attr, value) in example.values().iter().enumerate() {
                    match value {
                        AttributeValue::Discrete(v) => {
                            if let Some(estimator) = stats.discrete_targets.get_mut(&(attr, *v)) {
                                estimator.remove(y);
                            }
                        }
                        AttributeValue::Numeric(x) => {
                            let bin = hit
                                .bin_for(attr)
                                .unwrap_or_else(|| panic!("missing bin record at leaf {id}"));
                            let hist = stats
                                .histograms
                                .get_mut(&attr)
                                .unwrap_or_else(|| panic!("missing histogram at leaf {id}"));
                            hist.remove_value(bin, *x, y);
                        }
                    }
                }
            }
        }
    }

    /// All examples of one class (or fewer than two observed classes).
    pub(crate) fn is_pure(&self) -> bool {
        match &self.kind {
            NodeKind::Leaf(stats) => {
                stats.label_counts.iter().filter(|&&c| c > 0).count() < 2
            }
            NodeKind::Internal(_) => false,
        }
    }

    /// Ranks every admissible split, best first. Attributes in `used_attrs`
    /// or in `banned` never appear; the do-not-split sentinel always does.
    /// Ties go to the sentinel first and then to the lowest attribute index,
    /// which keeps the choice deterministic across runs.
    pub(crate) fn best_candidates(
        &self,
        schema: &AttributeSchema,
        config: &TreeConfig,
        banned: &[usize],
    ) -> Vec<SplitCandidate> {
        let stats = match &self.kind {
            NodeKind::Leaf(stats) => stats,
            NodeKind::Internal(_) => return vec![SplitCandidate::sentinel()],
        };

        let mut candidates = vec![SplitCandidate::sentinel()];
        for (attr, spec) in schema.inputs().iter().enumerate() {
            if self.used_attrs.contains(&attr) || banned.contains(&attr) {
                continue;
            }
            let candidate = match spec.kind() {
                AttrKind::Discrete(vocab) => {
                    let gain = match config.task {
                        TaskType::Classification => discrete_gain_cls(
                            stats,
                            attr,
                            vocab.len(),
                            schema.n_classes(),
                            config.heuristic,
                        ),
                        TaskType::Regression => discrete_gain_reg(stats, attr, vocab.len()),
                    };
                    gain.map(|g| SplitCandidate {
                        attr: Some(attr),
                        threshold: None,
                        gain: g,
                    })
                }
                AttrKind::Continuous => {
                    let split = stats.histograms.get(&attr).and_then(|h| match config.task {
                        TaskType::Classification => match config.heuristic {
                            SplitHeuristic::InfoGain => h.info_gain(),
                            SplitHeuristic::GiniGain => h.gini_gain(),
                        },
                        TaskType::Regression => h.std_gain(),
                    });
                    split.map(|(gain, threshold)| SplitCandidate {
                        attr: Some(attr),
                        threshold: Some(threshold),
                        gain,
                    })
                }
            };
            if let Some(candidate) = candidate {
                candidates.push(candidate);
            }
        }

        candidates.sort_by(|a, b| {
            b.gain
                .partial_cmp(&a.gain)
                .unwrap_or(Ordering::Equal)
                .then_with(|| match (a.attr, b.attr) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (Some(x), Some(y)) => x.cmp(&y),
                })
        });
        candidates
    }

    /// Majority-class prediction; an untrained leaf answers class 0.
    pub(crate) fn majority(&self) -> usize {
        let Some(stats) = self.stats() else {
            return 0;
        };
        let mut best = 0;
        let mut best_count = 0;
        for (label, &count) in stats.label_counts.iter().enumerate() {
            if count > best_count {
                best = label;
                best_count = count;
            }
        }
        best
    }

    /// Naive-Bayes prediction over the leaf's sufficient statistics,
    /// combined in log space. Falls back to the majority class when the leaf
    /// has seen nothing.
    pub(crate) fn naive_bayes(
        &self,
        example: &Example,
        schema: &AttributeSchema,
        config: &TreeConfig,
    ) -> usize {
        let Some(stats) = self.stats() else {
            return 0;
        };
        if stats.examples_seen == 0 {
            return self.majority();
        }

        let mut best: Option<(usize, f64)> = None;
        for (label, &count) in stats.label_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let mut score = relative_frequency(count, stats.examples_seen).ln();
            for (attr, value) in example.values().iter().enumerate() {
                match value {
                    AttributeValue::Discrete(v) => {
                        let vocab_len = schema
                            .entry(attr)
                            .and_then(|s| s.vocabulary())
                            .map_or(0, |v| v.len());
                        let matches = stats
                            .discrete_counts
                            .get(&(attr, *v, label))
                            .copied()
                            .unwrap_or(0);
                        score += smoothed(matches, count, vocab_len, config).ln();
                    }
                    AttributeValue::Numeric(x) => {
                        let Some(hist) = stats.histograms.get(&attr) else {
                            continue;
                        };
                        if hist.is_empty() {
                            continue;
                        }
                        let bin = covering_bin(hist, *x);
                        let matches = bin.partition().get(label).copied().unwrap_or(0);
                        score += smoothed(matches, count, hist.len(), config).ln();
                    }
                }
            }
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((label, score));
            }
        }
        best.map_or_else(|| self.majority(), |(label, _)| label)
    }

    /// Point prediction of a leaf under the configured policy.
    pub(crate) fn predict(
        &self,
        example: &Example,
        schema: &AttributeSchema,
        config: &TreeConfig,
    ) -> Target {
        match config.task {
            TaskType::Classification => Target::Label(match config.leaf_prediction {
                LeafPrediction::MajorityClass => self.majority(),
                LeafPrediction::NaiveBayes => self.naive_bayes(example, schema, config),
            }),
            TaskType::Regression => {
                Target::Value(self.stats().map_or(0.0, |s| s.target.mean()))
            }
        }
    }
}

fn smoothed(matches: u64, class_total: u64, outcomes: usize, config: &TreeConfig) -> f64 {
    match config.nb_smoothing {
        NbSmoothing::Laplace => laplace(matches, class_total, outcomes),
        NbSmoothing::MEstimate => {
            let apriori = if outcomes > 0 { 1.0 / outcomes as f64 } else { 0.5 };
            m_estimate(matches, class_total, apriori, config.m_estimate_weight)
        }
    }
}

/// The bin whose range covers `x`: the rightmost bin with value `<= x`, or
/// the first bin when `x` undershoots them all.
fn covering_bin(hist: &Histogram, x: f64) -> &crate::learners::adaptive_tree::histogram::Bin {
    let bins = hist.bins();
    let idx = bins.partition_point(|b| b.value() <= x);
    &bins[idx.saturating_sub(1)]
}

fn discrete_gain_cls(
    stats: &LeafStats,
    attr: usize,
    vocab_len: usize,
    n_classes: usize,
    heuristic: SplitHeuristic,
) -> Option<f64> {
    let n = stats.examples_seen;
    if n == 0 {
        return None;
    }
    let impurity: fn(&[u64], u64) -> f64 = match heuristic {
        SplitHeuristic::InfoGain => entropy,
        SplitHeuristic::GiniGain => gini,
    };
    let parent = impurity(&stats.label_counts, n);

    let mut weighted = 0.0;
    for v in 0..vocab_len {
        let dist: Vec<u64> = (0..n_classes)
            .map(|c| {
                stats
                    .discrete_counts
                    .get(&(attr, v, c))
                    .copied()
                    .unwrap_or(0)
            })
            .collect();
        let nv: u64 = dist.iter().sum();
        if nv == 0 {
            continue;
        }
        weighted += (nv as f64 / n as f64) * impurity(&dist, nv);
    }
    Some(parent - weighted)
}

fn discrete_gain_reg(stats: &LeafStats, attr: usize, vocab_len: usize) -> Option<f64> {
    let n = stats.target.count();
    if n == 0 {
        return None;
    }
    let parent = stats.target.std_dev();
    let mut weighted = 0.0;
    for v in 0..vocab_len {
        let Some(estimator) = stats.discrete_targets.get(&(attr, v)) else {
            continue;
        };
        if estimator.count() == 0 {
            continue;
        }
        weighted += (estimator.count() as f64 / n as f64) * estimator.std_dev();
    }
    Some(parent - weighted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::AttributeSpec;

    fn flags_schema() -> AttributeSchema {
        AttributeSchema::new(
            "flags",
            vec![
                AttributeSpec::discrete("a", ["f", "t"]),
                AttributeSpec::discrete("b", ["f", "t"]),
                AttributeSpec::discrete("label", ["neg", "pos"]),
            ],
        )
        .unwrap()
    }

    fn mixed_schema() -> AttributeSchema {
        AttributeSchema::new(
            "mixed",
            vec![
                AttributeSpec::continuous("x"),
                AttributeSpec::discrete("label", ["neg", "pos"]),
            ],
        )
        .unwrap()
    }

    fn flag_example(a: usize, b: usize, label: usize) -> Example {
        Example::labeled(
            vec![AttributeValue::Discrete(a), AttributeValue::Discrete(b)],
            label,
        )
    }

    fn leaf(n_classes: usize) -> Node {
        Node::new_leaf(1, Vec::new(), n_classes, 0.9995)
    }

    #[test]
    fn label_counts_track_examples_seen() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        for i in 0..30 {
            let e = flag_example(i % 2, (i / 2) % 2, i % 2);
            node.update_leaf(&e, &config, schema.n_classes(), &mut ids);
        }
        let stats = node.stats().unwrap();
        assert_eq!(stats.label_counts().iter().sum::<u64>(), stats.examples_seen());
        assert_eq!(stats.examples_seen(), 30);
    }

    #[test]
    fn forget_restores_counts() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        let e1 = flag_example(1, 0, 1);
        let e2 = flag_example(0, 1, 0);
        let hit1 = node.update_leaf(&e1, &config, schema.n_classes(), &mut ids);
        let _hit2 = node.update_leaf(&e2, &config, schema.n_classes(), &mut ids);
        node.forget(&e1, &hit1);

        let stats = node.stats().unwrap();
        assert_eq!(stats.examples_seen(), 1);
        assert_eq!(stats.label_counts(), &[1, 0]);
        assert_eq!(stats.discrete_counts.get(&(0, 1, 1)), None);
        assert_eq!(stats.discrete_counts.get(&(0, 0, 0)), Some(&1));
    }

    #[test]
    #[should_panic(expected = "negative label count")]
    fn forgetting_unseen_label_panics() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        let e = flag_example(0, 0, 0);
        let hit = node.update_leaf(&e, &config, schema.n_classes(), &mut ids);
        let other = flag_example(0, 0, 1);
        node.forget(&other, &hit);
    }

    #[test]
    fn informative_attribute_ranks_first() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        // label == a; b is noise.
        for i in 0..200 {
            let a = i % 2;
            let b = (i / 3) % 2;
            node.update_leaf(&flag_example(a, b, a), &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert_eq!(candidates[0].attr, Some(0));
        assert!(candidates[0].gain > 0.9);
    }

    #[test]
    fn used_attributes_are_never_candidates() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = Node::new_leaf(1, vec![0], schema.n_classes(), 0.9995);

        for i in 0..100 {
            let a = i % 2;
            node.update_leaf(&flag_example(a, 0, a), &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert!(candidates.iter().all(|c| c.attr != Some(0)));
    }

    #[test]
    fn banned_attributes_are_skipped() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        for i in 0..100 {
            let a = i % 2;
            node.update_leaf(&flag_example(a, a, a), &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[0]);
        assert_eq!(candidates[0].attr, Some(1));
    }

    #[test]
    fn identical_gains_break_toward_lowest_index() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        // a and b move in lockstep: identical, perfect gain.
        for i in 0..100 {
            let v = i % 2;
            node.update_leaf(&flag_example(v, v, v), &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert_eq!(candidates[0].attr, Some(0));
        assert_eq!(candidates[1].attr, Some(1));
        assert!((candidates[0].gain - candidates[1].gain).abs() < 1e-12);
    }

    #[test]
    fn sentinel_wins_when_nothing_is_informative() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        // attributes constant: zero gain everywhere.
        for i in 0..50 {
            node.update_leaf(&flag_example(0, 0, i % 2), &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert_eq!(candidates[0].attr, None);
    }

    #[test]
    fn continuous_candidate_carries_threshold() {
        let schema = mixed_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        for i in 0..100 {
            let x = if i % 2 == 0 { 0.2 } else { 0.8 };
            let e = Example::labeled(vec![AttributeValue::Numeric(x)], i % 2);
            node.update_leaf(&e, &config, schema.n_classes(), &mut ids);
        }
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert_eq!(candidates[0].attr, Some(0));
        assert_eq!(candidates[0].threshold, Some(0.2));
    }

    #[test]
    fn majority_prediction() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        for _ in 0..3 {
            node.update_leaf(&flag_example(0, 0, 1), &config, schema.n_classes(), &mut ids);
        }
        node.update_leaf(&flag_example(0, 0, 0), &config, schema.n_classes(), &mut ids);
        assert_eq!(node.majority(), 1);
    }

    #[test]
    fn untrained_leaf_predicts_default() {
        let node = leaf(2);
        assert_eq!(node.majority(), 0);
        let schema = flags_schema();
        let config = TreeConfig::default();
        let e = flag_example(0, 0, 0);
        assert_eq!(node.naive_bayes(&e, &schema, &config), 0);
    }

    #[test]
    fn naive_bayes_uses_attribute_evidence() {
        let schema = flags_schema();
        let config = TreeConfig {
            leaf_prediction: LeafPrediction::NaiveBayes,
            ..TreeConfig::default()
        };
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());

        // Balanced priors; a carries the label, b is constant.
        for i in 0..100 {
            let a = i % 2;
            node.update_leaf(&flag_example(a, 0, a), &config, schema.n_classes(), &mut ids);
        }
        assert_eq!(node.naive_bayes(&flag_example(1, 0, 0), &schema, &config), 1);
        assert_eq!(node.naive_bayes(&flag_example(0, 0, 0), &schema, &config), 0);
    }

    #[test]
    fn regression_leaf_tracks_target_mean() {
        let schema = AttributeSchema::new(
            "reg",
            vec![
                AttributeSpec::discrete("g", ["l", "r"]),
                AttributeSpec::continuous("y"),
            ],
        )
        .unwrap();
        let config = TreeConfig {
            task: TaskType::Regression,
            ..TreeConfig::default()
        };
        let mut ids = IdGen::new();
        let mut node = leaf(0);

        for i in 0..100 {
            let g = i % 2;
            let y = if g == 0 { 1.0 } else { 5.0 };
            let e = Example::valued(vec![AttributeValue::Discrete(g)], y);
            node.update_leaf(&e, &config, 0, &mut ids);
        }
        let stats = node.stats().unwrap();
        assert!((stats.target().mean() - 3.0).abs() < 1e-9);

        // the discrete split separates the two target clusters completely
        let candidates = node.best_candidates(&schema, &config, &[]);
        assert_eq!(candidates[0].attr, Some(0));
        assert!(candidates[0].gain > 1.9);
    }

    #[test]
    fn pure_leaf_is_detected() {
        let schema = flags_schema();
        let config = TreeConfig::default();
        let mut ids = IdGen::new();
        let mut node = leaf(schema.n_classes());
        assert!(node.is_pure());
        node.update_leaf(&flag_example(0, 0, 1), &config, schema.n_classes(), &mut ids);
        assert!(node.is_pure());
        node.update_leaf(&flag_example(0, 0, 0), &config, schema.n_classes(), &mut ids);
        assert!(!node.is_pure());
    }
}
