use crate::core::example::{Example, Prediction};
use crate::evaluation::Measurement;

/// Online evaluator fed with (example, prediction) pairs in stream order.
pub trait PerformanceEvaluator {
    /// Records one prediction against the example's true target.
    fn add_result(&mut self, example: &Example, prediction: Prediction);

    /// Current metric values, stable in name and order.
    fn measurements(&self) -> Vec<Measurement>;

    /// Looks a metric up by name.
    fn measurement(&self, name: &str) -> Option<f64> {
        self.measurements()
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }
}
