pub mod adaptive_tree;

use crate::core::example::{Example, Prediction};
use crate::learners::adaptive_tree::TreeError;
use std::any::Any;

/// An online learner: consumes examples one at a time and answers point
/// predictions at any moment in between.
pub trait Learner {
    /// Incorporates one example. Must fail without mutating state when the
    /// example does not conform to the learner's schema.
    fn process(&mut self, example: Example) -> Result<(), TreeError>;

    /// Point prediction for an example. Never fails on an untrained model.
    fn predict(&self, example: &Example) -> Result<Prediction, TreeError>;

    /// Concrete-type access for callers that need more than the trait, e.g.
    /// model export after an evaluation run.
    fn as_any(&self) -> &dyn Any;
}
