use std::hash::{Hash, Hasher};

/// A single typed attribute value, positional within its schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    /// Index into the attribute's vocabulary.
    Discrete(usize),
    Numeric(f64),
}

impl AttributeValue {
    pub fn as_discrete(&self) -> Option<usize> {
        match self {
            AttributeValue::Discrete(v) => Some(*v),
            AttributeValue::Numeric(_) => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            AttributeValue::Numeric(x) => Some(*x),
            AttributeValue::Discrete(_) => None,
        }
    }
}

/// Supervised target of an example.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    Label(usize),
    Value(f64),
}

/// Point prediction produced by a learner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prediction {
    Label(usize),
    Value(f64),
}

impl Prediction {
    pub fn as_label(&self) -> Option<usize> {
        match self {
            Prediction::Label(l) => Some(*l),
            Prediction::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<f64> {
        match self {
            Prediction::Value(x) => Some(*x),
            Prediction::Label(_) => None,
        }
    }
}

/// Leaf statistics touched by an example: the absorbing leaf plus, per
/// continuous attribute, the histogram bin that took the value. Recorded
/// during training so eviction can decrement exactly what was incremented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafHit {
    pub leaf_id: u64,
    pub bins: Vec<(usize, u64)>,
}

impl LeafHit {
    pub fn is_placed(&self) -> bool {
        self.leaf_id != 0
    }

    pub fn bin_for(&self, attr: usize) -> Option<u64> {
        self.bins
            .iter()
            .find(|(a, _)| *a == attr)
            .map(|(_, id)| *id)
    }
}

/// A training or prediction record: typed attribute values in schema order
/// plus a label (classification) or a real target (regression).
///
/// While an example sits in the tree's window it also carries the ids of the
/// main-tree leaf and of any alternate-subtree leaves whose statistics
/// currently include it.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    values: Vec<AttributeValue>,
    target: Target,
    hit: LeafHit,
    alt_hits: Vec<LeafHit>,
}

impl Example {
    pub fn labeled(values: Vec<AttributeValue>, label: usize) -> Self {
        Self {
            values,
            target: Target::Label(label),
            hit: LeafHit::default(),
            alt_hits: Vec::new(),
        }
    }

    pub fn valued(values: Vec<AttributeValue>, value: f64) -> Self {
        Self {
            values,
            target: Target::Value(value),
            hit: LeafHit::default(),
            alt_hits: Vec::new(),
        }
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn value_at(&self, index: usize) -> Option<&AttributeValue> {
        self.values.get(index)
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn label(&self) -> Option<usize> {
        match self.target {
            Target::Label(l) => Some(l),
            Target::Value(_) => None,
        }
    }

    pub fn numeric_target(&self) -> Option<f64> {
        match self.target {
            Target::Value(x) => Some(x),
            Target::Label(_) => None,
        }
    }

    pub fn hit(&self) -> &LeafHit {
        &self.hit
    }

    pub fn alt_hits(&self) -> &[LeafHit] {
        &self.alt_hits
    }

    pub(crate) fn set_hit(&mut self, hit: LeafHit) {
        self.hit = hit;
    }

    pub(crate) fn push_alt_hit(&mut self, hit: LeafHit) {
        self.alt_hits.push(hit);
    }

    /// Content key with a proper mixing hash, used for membership in a node's
    /// seen set. Placement fields do not participate: two copies of the same
    /// record hash alike wherever they landed.
    pub fn key(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        for value in &self.values {
            match value {
                AttributeValue::Discrete(v) => {
                    0u8.hash(&mut hasher);
                    v.hash(&mut hasher);
                }
                AttributeValue::Numeric(x) => {
                    1u8.hash(&mut hasher);
                    x.to_bits().hash(&mut hasher);
                }
            }
        }
        match self.target {
            Target::Label(l) => {
                0u8.hash(&mut hasher);
                l.hash(&mut hasher);
            }
            Target::Value(x) => {
                1u8.hash(&mut hasher);
                x.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_example_accessors() {
        let e = Example::labeled(
            vec![AttributeValue::Discrete(1), AttributeValue::Numeric(0.5)],
            1,
        );
        assert_eq!(e.label(), Some(1));
        assert_eq!(e.numeric_target(), None);
        assert_eq!(e.value_at(0).unwrap().as_discrete(), Some(1));
        assert_eq!(e.value_at(1).unwrap().as_numeric(), Some(0.5));
        assert!(!e.hit().is_placed());
    }

    #[test]
    fn key_ignores_placement() {
        let mut a = Example::labeled(vec![AttributeValue::Discrete(0)], 1);
        let b = Example::labeled(vec![AttributeValue::Discrete(0)], 1);
        a.set_hit(LeafHit {
            leaf_id: 42,
            bins: vec![(0, 7)],
        });
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_distinguishes_content() {
        let a = Example::labeled(vec![AttributeValue::Discrete(0)], 1);
        let b = Example::labeled(vec![AttributeValue::Discrete(1)], 1);
        let c = Example::labeled(vec![AttributeValue::Discrete(0)], 0);
        assert_ne!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn hit_lookup_by_attribute() {
        let hit = LeafHit {
            leaf_id: 3,
            bins: vec![(0, 10), (2, 11)],
        };
        assert_eq!(hit.bin_for(2), Some(11));
        assert_eq!(hit.bin_for(1), None);
    }
}
