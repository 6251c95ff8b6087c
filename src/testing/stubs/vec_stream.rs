use crate::core::attributes::AttributeSchema;
use crate::core::example::{AttributeValue, Example};
use crate::streams::ExampleStream;
use crate::testing::dummies::schema_binary;
use std::io::Error;
use std::sync::Arc;

/// Finite in-memory stream replaying a fixed vector of examples.
pub struct VecStream {
    schema: Arc<AttributeSchema>,
    examples: Vec<Example>,
    position: usize,
}

impl VecStream {
    pub fn new(schema: Arc<AttributeSchema>, examples: Vec<Example>) -> Self {
        Self {
            schema,
            examples,
            position: 0,
        }
    }

    /// Binary-schema stream where the single input equals the label.
    pub fn binary_labels(labels: Vec<usize>) -> Self {
        let examples = labels
            .into_iter()
            .map(|label| Example::labeled(vec![AttributeValue::Discrete(label)], label))
            .collect();
        Self::new(schema_binary(), examples)
    }
}

impl ExampleStream for VecStream {
    fn schema(&self) -> &Arc<AttributeSchema> {
        &self.schema
    }

    fn has_more_examples(&self) -> bool {
        self.position < self.examples.len()
    }

    fn next_example(&mut self) -> Option<Example> {
        let example = self.examples.get(self.position).cloned()?;
        self.position += 1;
        Some(example)
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.position = 0;
        Ok(())
    }
}
