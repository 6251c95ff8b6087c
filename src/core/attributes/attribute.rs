use std::collections::HashMap;

/// Token vocabulary of a discrete attribute.
///
/// Maps tokens to dense indices and back; indices follow declaration order
/// and never change for the lifetime of the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();
        Self { tokens, index }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    Discrete(Vocabulary),
    Continuous,
}

/// One entry of an attribute schema: a named input (or target) attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    name: String,
    kind: AttrKind,
}

impl AttributeSpec {
    pub fn discrete<N, I, S>(name: N, tokens: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: AttrKind::Discrete(Vocabulary::from_tokens(tokens)),
        }
    }

    pub fn continuous<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            kind: AttrKind::Continuous,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttrKind {
        &self.kind
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.kind, AttrKind::Discrete(_))
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        match &self.kind {
            AttrKind::Discrete(v) => Some(v),
            AttrKind::Continuous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_maps_both_ways() {
        let v = Vocabulary::from_tokens(["sunny", "overcast", "rainy"]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.index_of("overcast"), Some(1));
        assert_eq!(v.token_at(2), Some("rainy"));
        assert_eq!(v.index_of("hail"), None);
        assert_eq!(v.token_at(3), None);
    }

    #[test]
    fn spec_kinds() {
        let d = AttributeSpec::discrete("outlook", ["sunny", "rainy"]);
        let c = AttributeSpec::continuous("temperature");
        assert!(d.is_discrete());
        assert!(!c.is_discrete());
        assert_eq!(d.vocabulary().unwrap().len(), 2);
        assert!(c.vocabulary().is_none());
        assert_eq!(c.name(), "temperature");
    }
}
