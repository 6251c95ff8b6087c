use crate::core::attributes::{AttrKind, AttributeSpec};
use crate::core::example::{AttributeValue, Example};
use crate::utils::file_parsing::{split_delimited, strip_surrounding_quotes};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("schema needs at least one input attribute and a target")]
    TooFewAttributes,

    #[error("expected {expected} attribute values, got {got}")]
    AttributeCount { expected: usize, got: usize },

    #[error("unknown token `{token}` for attribute `{attribute}`")]
    UnknownToken { attribute: String, token: String },

    #[error("attribute `{attribute}` expected a {expected} value, got `{got}`")]
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        got: String,
    },
}

/// Ordered description of every attribute an example carries.
///
/// The last entry is the target: discrete for classification, continuous for
/// regression. The schema is immutable once built; every example processed by
/// a tree must conform to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    relation: String,
    entries: Vec<AttributeSpec>,
}

impl AttributeSchema {
    pub fn new<N: Into<String>>(
        relation: N,
        entries: Vec<AttributeSpec>,
    ) -> Result<Self, SchemaError> {
        if entries.len() < 2 {
            return Err(SchemaError::TooFewAttributes);
        }
        Ok(Self {
            relation: relation.into(),
            entries,
        })
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn entries(&self) -> &[AttributeSpec] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&AttributeSpec> {
        self.entries.get(index)
    }

    /// Input attributes, i.e. everything except the target.
    pub fn inputs(&self) -> &[AttributeSpec] {
        &self.entries[..self.entries.len() - 1]
    }

    pub fn input_count(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn target(&self) -> &AttributeSpec {
        self.entries.last().expect("schema has a target")
    }

    pub fn is_classification(&self) -> bool {
        self.target().is_discrete()
    }

    /// Number of classes; zero for a regression target.
    pub fn n_classes(&self) -> usize {
        self.target().vocabulary().map_or(0, |v| v.len())
    }

    /// Inverse vocabulary lookup for a predicted label.
    pub fn label_token(&self, label: usize) -> Option<&str> {
        self.target().vocabulary().and_then(|v| v.token_at(label))
    }

    /// Interprets one delimiter-separated text line as an example. Discrete
    /// tokens are mapped through the vocabularies; unknown tokens are
    /// rejected and nothing is produced.
    pub fn parse_line(&self, line: &str, delimiter: char) -> Result<Example, SchemaError> {
        let fields = split_delimited(line, delimiter);
        if fields.len() != self.entries.len() {
            return Err(SchemaError::AttributeCount {
                expected: self.entries.len(),
                got: fields.len(),
            });
        }

        let mut values = Vec::with_capacity(self.input_count());
        for (spec, raw) in self.inputs().iter().zip(&fields) {
            values.push(self.parse_field(spec, raw)?);
        }

        let target_raw = fields.last().expect("field count checked above");
        match self.parse_field(self.target(), target_raw)? {
            AttributeValue::Discrete(label) => Ok(Example::labeled(values, label)),
            AttributeValue::Numeric(value) => Ok(Example::valued(values, value)),
        }
    }

    fn parse_field(&self, spec: &AttributeSpec, raw: &str) -> Result<AttributeValue, SchemaError> {
        let token = strip_surrounding_quotes(raw.trim());
        match spec.kind() {
            AttrKind::Discrete(vocab) => vocab
                .index_of(token)
                .map(AttributeValue::Discrete)
                .ok_or_else(|| SchemaError::UnknownToken {
                    attribute: spec.name().to_string(),
                    token: token.to_string(),
                }),
            AttrKind::Continuous => {
                let parsed = token.parse::<f64>().ok().filter(|x| x.is_finite());
                parsed
                    .map(AttributeValue::Numeric)
                    .ok_or_else(|| SchemaError::TypeMismatch {
                        attribute: spec.name().to_string(),
                        expected: "numeric",
                        got: token.to_string(),
                    })
            }
        }
    }

    /// Checks an already-built example against this schema without mutating
    /// anything: attribute count, value kinds, vocabulary ranges, and the
    /// target's kind.
    pub fn validate_example(&self, example: &Example) -> Result<(), SchemaError> {
        self.validate_inputs(example)?;
        match (self.is_classification(), example.label()) {
            (true, Some(label)) => {
                if label >= self.n_classes() {
                    return Err(SchemaError::UnknownToken {
                        attribute: self.target().name().to_string(),
                        token: format!("#{label}"),
                    });
                }
            }
            (true, None) => {
                return Err(SchemaError::TypeMismatch {
                    attribute: self.target().name().to_string(),
                    expected: "discrete",
                    got: "numeric".to_string(),
                });
            }
            (false, Some(_)) => {
                return Err(SchemaError::TypeMismatch {
                    attribute: self.target().name().to_string(),
                    expected: "numeric",
                    got: "discrete".to_string(),
                });
            }
            (false, None) => {}
        }
        Ok(())
    }

    /// Input-side half of [`validate_example`](Self::validate_example),
    /// enough for prediction where the target plays no part.
    pub fn validate_inputs(&self, example: &Example) -> Result<(), SchemaError> {
        if example.values().len() != self.input_count() {
            return Err(SchemaError::AttributeCount {
                expected: self.input_count(),
                got: example.values().len(),
            });
        }
        for (spec, value) in self.inputs().iter().zip(example.values()) {
            match (spec.kind(), value) {
                (AttrKind::Discrete(vocab), AttributeValue::Discrete(v)) => {
                    if *v >= vocab.len() {
                        return Err(SchemaError::UnknownToken {
                            attribute: spec.name().to_string(),
                            token: format!("#{v}"),
                        });
                    }
                }
                (AttrKind::Continuous, AttributeValue::Numeric(x)) => {
                    if !x.is_finite() {
                        return Err(SchemaError::TypeMismatch {
                            attribute: spec.name().to_string(),
                            expected: "numeric",
                            got: x.to_string(),
                        });
                    }
                }
                (AttrKind::Discrete(_), AttributeValue::Numeric(x)) => {
                    return Err(SchemaError::TypeMismatch {
                        attribute: spec.name().to_string(),
                        expected: "discrete",
                        got: x.to_string(),
                    });
                }
                (AttrKind::Continuous, AttributeValue::Discrete(v)) => {
                    return Err(SchemaError::TypeMismatch {
                        attribute: spec.name().to_string(),
                        expected: "numeric",
                        got: format!("#{v}"),
                    });
                }
            }
        }
        Ok(())
    }
}
