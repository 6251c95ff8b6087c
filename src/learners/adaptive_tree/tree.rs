use crate::core::attributes::AttributeSchema;
use crate::core::example::{AttributeValue, Example, LeafHit, Prediction, Target};
use crate::core::id_gen::IdGen;
use crate::learners::Learner;
use crate::learners::adaptive_tree::config::{SplitHeuristic, TaskType, TreeConfig};
use crate::learners::adaptive_tree::error::TreeError;
use crate::learners::adaptive_tree::hoeffding_bound::epsilon;
use crate::learners::adaptive_tree::node::{LeafStats, Node, NodeId, NodeKind, SplitTest};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Incremental decision tree over an unbounded example stream.
///
/// Examples are routed to a leaf, folded into its sufficient statistics, and
/// evicted again once they fall out of the FIFO window. A leaf replaces
/// itself with a split node when the Hoeffding bound says the best attribute
/// dominates the runner-up. Under drift, internal nodes whose prequential
/// error degrades grow alternate subtrees that shadow them on the same
/// stream; a periodic self-evaluation promotes an alternate that outperforms
/// its host and prunes the incumbent.
///
/// Nodes live in an arena keyed by their id; parents own children by id and
/// children never point back, so promotion is a single child-pointer rewrite.
pub struct AdaptiveHoeffdingTree {
    schema: Arc<AttributeSchema>,
    config: TreeConfig,
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    ids: IdGen,
    window: VecDeque<Example>,
    drift_examples: u64,
    examples_processed: u64,
    test_hosts: Vec<NodeId>,
    alt_spawns: u64,
    promotions: u64,
}

impl AdaptiveHoeffdingTree {
    pub fn new(schema: Arc<AttributeSchema>, config: TreeConfig) -> Result<Self, TreeError> {
        config.validate()?;
        match config.task {
            TaskType::Classification if !schema.is_classification() => {
                return Err(TreeError::TaskMismatch {
                    task: "classification",
                    required: "discrete",
                });
            }
            TaskType::Regression if schema.is_classification() => {
                return Err(TreeError::TaskMismatch {
                    task: "regression",
                    required: "continuous",
                });
            }
            _ => {}
        }

        let mut ids = IdGen::new();
        let root = ids.next_leaf_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node::new_leaf(root, Vec::new(), schema.n_classes(), config.fading_factor),
        );
        Ok(Self {
            schema,
            config,
            nodes,
            root,
            ids,
            window: VecDeque::new(),
            drift_examples: 0,
            examples_processed: 0,
            test_hosts: Vec::new(),
            alt_spawns: 0,
            promotions: 0,
        })
    }

    pub fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn examples_processed(&self) -> u64 {
        self.examples_processed
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn alt_spawns(&self) -> u64 {
        self.alt_spawns
    }

    pub fn promotions(&self) -> u64 {
        self.promotions
    }

    pub(crate) fn root_id(&self) -> NodeId {
        self.root
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Leaves currently in the arena, alternate subtrees included.
    pub fn leaves(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_leaf())
    }

    /// Statistics of the leaf with the given id, if it still is one.
    pub fn leaf_statistics(&self, leaf_id: NodeId) -> Option<&LeafStats> {
        self.nodes.get(&leaf_id).and_then(Node::stats)
    }

    /// Folds one example into the tree: windowed eviction, routing, leaf
    /// update, split decision, and (when adaptation is on) the alternate
    /// subtree lifecycle. Fails without mutating state when the example does
    /// not conform to the schema.
    pub fn process(&mut self, mut example: Example) -> Result<(), TreeError> {
        self.schema.validate_example(&example)?;

        while self.window.len() >= self.config.window_size {
            let evicted = self.window.pop_front().expect("window is non-empty");
            self.forget(&evicted);
        }

        let path = self.path_to_leaf(self.root, &example);
        let leaf_id = *path.last().expect("path ends at a leaf");

        // Test-then-train: the incumbent is scored before it learns. One
        // classification at the leaf serves every node on the path, since the
        // subtree under each of them routes the example to the same leaf.
        let loss = self.loss_at(leaf_id, &example);
        for &id in &path {
            self.node_mut(id).record_result(loss);
        }

        let mut matured: Vec<(Option<NodeId>, NodeId)> = Vec::new();
        for (depth, &id) in path.iter().enumerate() {
            if !self.node_ref(id).in_test_mode() {
                continue;
            }
            for alt in self.node_ref(id).alt_trees().to_vec() {
                let alt_loss = self.subtree_loss(alt, &example);
                self.node_mut(alt).record_result(alt_loss);
            }
            let key = example.key();
            let host = self.node_mut(id);
            host.seen.insert(key);
            host.test_mode_n -= 1;
            if host.test_mode_n == 0 {
                let parent = depth.checked_sub(1).map(|d| path[d]);
                matured.push((parent, id));
            }
        }

        // Alternates see the same stream as their host.
        for &id in &path {
            for alt in self.node_ref(id).alt_trees().to_vec() {
                self.train_subtree(alt, id, &mut example);
            }
        }

        let n_classes = self.schema.n_classes();
        let hit = self
            .nodes
            .get_mut(&leaf_id)
            .expect("leaf is in the arena")
            .update_leaf(&example, &self.config, n_classes, &mut self.ids);
        example.set_hit(hit);

        let seen = self
            .node_ref(leaf_id)
            .stats()
            .map_or(0, LeafStats::examples_seen);
        if seen > 0 && seen % self.config.grace_period == 0 {
            self.attempt_split(leaf_id, &[]);
        }

        self.examples_processed += 1;
        if self.config.adaptive {
            self.maybe_spawn_alternates(&path);
            for (parent, host) in matured {
                self.resolve_test_mode(parent, host);
            }
            self.drift_examples += 1;
            if self.drift_examples >= self.config.drift_check {
                self.drift_examples = 0;
                self.begin_test_modes();
            }
        }

        self.window.push_back(example);
        Ok(())
    }

    /// Point prediction for an example: route to a leaf of the main tree and
    /// answer with its statistics. An untrained tree answers the default
    /// class (or mean zero); it never fails on valid input.
    pub fn predict(&self, example: &Example) -> Result<Prediction, TreeError> {
        self.schema.validate_inputs(example)?;
        let leaf = self.leaf_for(self.root, example);
        let prediction = match self
            .node_ref(leaf)
            .predict(example, &self.schema, &self.config)
        {
            Target::Label(label) => Prediction::Label(label),
            Target::Value(value) => Prediction::Value(value),
        };
        Ok(prediction)
    }

    /// Predicted class as its schema token.
    pub fn classify(&self, example: &Example) -> Result<Option<&str>, TreeError> {
        let prediction = self.predict(example)?;
        Ok(prediction
            .as_label()
            .and_then(|label| self.schema.label_token(label)))
    }

    fn node_ref(&self, id: NodeId) -> &Node {
        self.nodes.get(&id).expect("node is in the arena")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(&id).expect("node is in the arena")
    }

    fn route_child(&self, id: NodeId, example: &Example) -> NodeId {
        let test = self
            .node_ref(id)
            .split_test()
            .expect("routing passes internal nodes");
        match example.value_at(test.attr()) {
            Some(AttributeValue::Discrete(v)) => test.children()[*v],
            Some(AttributeValue::Numeric(x)) => {
                let threshold = test.threshold().expect("continuous test has a threshold");
                if *x <= threshold {
                    test.children()[0]
                } else {
                    test.children()[1]
                }
            }
            None => panic!("example shape was validated against the schema"),
        }
    }

    fn path_to_leaf(&self, from: NodeId, example: &Example) -> Vec<NodeId> {
        let mut path = vec![from];
        let mut current = from;
        while !self.node_ref(current).is_leaf() {
            current = self.route_child(current, example);
            path.push(current);
        }
        path
    }

    fn leaf_for(&self, from: NodeId, example: &Example) -> NodeId {
        let mut current = from;
        while !self.node_ref(current).is_leaf() {
            current = self.route_child(current, example);
        }
        current
    }

    /// Loss of the given leaf's prediction against the example's target:
    /// zero-one for classification, absolute error for regression.
    fn loss_at(&self, leaf: NodeId, example: &Example) -> f64 {
        let prediction = self
            .node_ref(leaf)
            .predict(example, &self.schema, &self.config);
        match (prediction, example.target()) {
            (Target::Label(p), Target::Label(t)) => {
                if p == t {
                    0.0
                } else {
                    1.0
                }
            }
            (Target::Value(p), Target::Value(t)) => (p - t).abs(),
            _ => panic!("prediction and target kinds diverged"),
        }
    }

    fn subtree_loss(&self, root: NodeId, example: &Example) -> f64 {
        let leaf = self.leaf_for(root, example);
        self.loss_at(leaf, example)
    }

    /// Routes an example through an alternate subtree, updates the reached
    /// leaf and applies the usual split decision there. The subtree root
    /// rejects split attributes already tested by a sibling alternate of the
    /// same host, so concurrent alternates stay comparable.
    fn train_subtree(&mut self, subtree: NodeId, host: NodeId, example: &mut Example) {
        let leaf_id = self.leaf_for(subtree, example);
        let n_classes = self.schema.n_classes();
        let hit = self
            .nodes
            .get_mut(&leaf_id)
            .expect("leaf is in the arena")
            .update_leaf(example, &self.config, n_classes, &mut self.ids);
        example.push_alt_hit(hit);

        let seen = self
            .node_ref(leaf_id)
            .stats()
            .map_or(0, LeafStats::examples_seen);
        if seen > 0 && seen % self.config.grace_period == 0 {
            let banned = if leaf_id == subtree {
                self.sibling_root_split_attrs(host, subtree)
            } else {
                Vec::new()
            };
            self.attempt_split(leaf_id, &banned);
        }
    }

    /// Attributes tested at the root of the host's other alternates.
    fn sibling_root_split_attrs(&self, host: NodeId, this_alt: NodeId) -> Vec<usize> {
        self.node_ref(host)
            .alt_trees()
            .iter()
            .filter(|&&a| a != this_alt)
            .filter_map(|&a| self.node_ref(a).split_test().map(SplitTest::attr))
            .collect()
    }

    /// Hoeffding split decision at a leaf: split iff the best candidate's
    /// gain dominates the runner-up by more than epsilon, or epsilon fell
    /// below the tie-breaking threshold.
    fn attempt_split(&mut self, leaf_id: NodeId, banned: &[usize]) {
        let node = self.node_ref(leaf_id);
        let Some(stats) = node.stats() else {
            return;
        };
        let n = stats.examples_seen();
        if n == 0 {
            return;
        }
        if self.config.task == TaskType::Classification && node.is_pure() {
            return;
        }

        let candidates = node.best_candidates(&self.schema, &self.config, banned);
        let best = candidates[0];
        let Some(attr) = best.attr else {
            return;
        };
        let runner_gain = candidates.get(1).map_or(0.0, |c| c.gain);

        let range = match (self.config.task, self.config.heuristic) {
            (TaskType::Classification, SplitHeuristic::InfoGain) => {
                (self.schema.n_classes() as f64).log2()
            }
            (TaskType::Classification, SplitHeuristic::GiniGain) => 1.0,
            (TaskType::Regression, _) => stats.target().variance(),
        };
        if range <= 0.0 {
            return;
        }

        let eps = epsilon(range, n, self.config.split_confidence);
        if best.gain - runner_gain > eps || eps < self.config.tie_breaking {
            self.split_leaf(leaf_id, attr, best.threshold);
        }
    }

    /// Atomically turns a leaf into an internal node: one child per discrete
    /// value (or two for a continuous cut), statistics discarded. Discrete
    /// split attributes are consumed for the subtree below; continuous ones
    /// stay re-testable at finer thresholds.
    fn split_leaf(&mut self, leaf_id: NodeId, attr: usize, threshold: Option<f64>) {
        let n_classes = self.schema.n_classes();
        let mut child_used = self.node_ref(leaf_id).used_attrs().to_vec();
        let n_children = match threshold {
            None => {
                child_used.push(attr);
                self.schema
                    .entry(attr)
                    .and_then(|s| s.vocabulary())
                    .map(|v| v.len())
                    .expect("multiway split tests a discrete attribute")
            }
            Some(_) => 2,
        };

        let mut children = Vec::with_capacity(n_children);
        for _ in 0..n_children {
            let id = self.ids.next_leaf_id();
            self.nodes.insert(
                id,
                Node::new_leaf(
                    id,
                    child_used.clone(),
                    n_classes,
                    self.config.fading_factor,
                ),
            );
            children.push(id);
        }

        let node = self.node_mut(leaf_id);
        node.kind = NodeKind::Internal(SplitTest {
            attr,
            threshold,
            children,
        });
        // The leaf-phase error says nothing about the subtree that now
        // exists; drift tracking restarts from here.
        node.err.reset();
        node.correct = 0;
        node.all = 0;
    }

    /// Spawns an alternate at main-tree internal nodes whose faded error
    /// crossed the creation threshold. The alternate starts as a fresh leaf
    /// sharing the host's used attributes and trains on the same stream.
    fn maybe_spawn_alternates(&mut self, path: &[NodeId]) {
        for &id in path {
            let node = self.node_ref(id);
            if node.is_leaf() || node.in_test_mode() {
                continue;
            }
            if node.alt_trees().len() >= self.config.max_alt_trees {
                continue;
            }
            if node.err.observations() < self.config.grace_period {
                continue;
            }
            let err = node.err.estimation();
            if !err.is_finite() || err <= self.config.alt_creation_threshold {
                continue;
            }

            let used = node.used_attrs().to_vec();
            let alt_id = self.ids.next_leaf_id();
            self.nodes.insert(
                alt_id,
                Node::new_leaf(
                    alt_id,
                    used,
                    self.schema.n_classes(),
                    self.config.fading_factor,
                ),
            );
            let host = self.node_mut(id);
            host.alt_trees.push(alt_id);
            host.err.reset();
            self.alt_spawns += 1;
        }
    }

    /// Puts every host with alternates into test mode for the next window of
    /// examples, with fresh error estimates on both sides of the comparison.
    fn begin_test_modes(&mut self) {
        let hosts: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|n| !n.alt_trees.is_empty() && !n.in_test_mode())
            .map(Node::id)
            .collect();
        for id in hosts {
            let window = self.config.window_size as u64;
            let host = self.node_mut(id);
            host.test_mode_n = window;
            host.seen.clear();
            host.correct = 0;
            host.all = 0;
            host.err.reset();
            for alt in host.alt_trees.clone() {
                let alt_node = self.node_mut(alt);
                alt_node.err.reset();
                alt_node.correct = 0;
                alt_node.all = 0;
            }
            if !self.test_hosts.contains(&id) {
                self.test_hosts.push(id);
            }
        }
    }

    /// End of a test window at `host`: promote the best alternate if it beat
    /// the incumbent by more than the margin, otherwise discard all
    /// alternates and return the host to normal mode.
    fn resolve_test_mode(&mut self, parent: Option<NodeId>, host_id: NodeId) {
        if !self.nodes.contains_key(&host_id) {
            // an ancestor's promotion already discarded this subtree
            return;
        }

        let host_err = self.node_ref(host_id).err.estimation();
        let alts = self.node_ref(host_id).alt_trees().to_vec();
        let best = alts
            .iter()
            .copied()
            .filter_map(|a| {
                let e = self.node_ref(a).err.estimation();
                e.is_finite().then_some((a, e))
            })
            .min_by(|(_, x), (_, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal));

        let winner = best.and_then(|(alt, alt_err)| {
            (host_err.is_finite() && alt_err + self.config.promotion_margin < host_err)
                .then_some(alt)
        });

        match winner {
            Some(winner) => {
                self.node_mut(host_id).alt_trees.retain(|&a| a != winner);
                match parent {
                    Some(parent) => {
                        if let NodeKind::Internal(test) = &mut self.node_mut(parent).kind {
                            for child in test.children.iter_mut() {
                                if *child == host_id {
                                    *child = winner;
                                }
                            }
                        }
                    }
                    None => self.root = winner,
                }
                self.remove_subtree(host_id);
                let promoted = self.node_mut(winner);
                promoted.seen.clear();
                promoted.correct = 0;
                promoted.all = 0;
                promoted.err.reset();
                self.promotions += 1;
            }
            None => {
                for alt in alts {
                    self.remove_subtree(alt);
                }
                let host = self.node_mut(host_id);
                host.alt_trees.clear();
                host.seen.clear();
                host.correct = 0;
                host.all = 0;
                host.err.reset();
            }
        }
        self.test_hosts.retain(|&h| h != host_id);
    }

    fn remove_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                if let NodeKind::Internal(test) = &node.kind {
                    stack.extend(test.children.iter().copied());
                }
                stack.extend(node.alt_trees.iter().copied());
                self.test_hosts.retain(|&h| h != id);
            }
        }
    }

    /// Undoes an evicted example's contributions: the origin leaf (located by
    /// id), any alternate leaves it also populated, and its entry in seen
    /// sets. A leaf that split in the meantime absorbed the statistics into
    /// the split decision; nothing is undone there.
    fn forget(&mut self, example: &Example) {
        let key = example.key();
        for host in self.test_hosts.clone() {
            if let Some(node) = self.nodes.get_mut(&host) {
                node.seen.remove(&key);
            }
        }

        if example.hit().is_placed() {
            let hit = example.hit().clone();
            self.forget_hit(example, &hit);
        }
        for hit in example.alt_hits().to_vec() {
            self.forget_hit(example, &hit);
        }
    }

    fn forget_hit(&mut self, example: &Example, hit: &LeafHit) {
        let Some(node) = self.nodes.get_mut(&hit.leaf_id) else {
            return; // subtree was pruned since
        };
        if !node.is_leaf() {
            return; // split since; the statistics already served their purpose
        }
        node.forget(example, hit);
    }
}

impl Learner for AdaptiveHoeffdingTree {
    fn process(&mut self, example: Example) -> Result<(), TreeError> {
        AdaptiveHoeffdingTree::process(self, example)
    }

    fn predict(&self, example: &Example) -> Result<Prediction, TreeError> {
        AdaptiveHoeffdingTree::predict(self, example)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
