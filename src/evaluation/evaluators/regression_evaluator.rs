use crate::core::example::{Example, Prediction};
use crate::evaluation::Measurement;
use crate::evaluation::evaluators::PerformanceEvaluator;

/// Online regression evaluator tracking mean absolute and root mean squared
/// error.
#[derive(Default)]
pub struct RegressionEvaluator {
    count: u64,
    abs_error_sum: f64,
    squared_error_sum: f64,
}

impl RegressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mae(&self) -> f64 {
        if self.count > 0 {
            self.abs_error_sum / self.count as f64
        } else {
            f64::NAN
        }
    }

    pub fn rmse(&self) -> f64 {
        if self.count > 0 {
            (self.squared_error_sum / self.count as f64).sqrt()
        } else {
            f64::NAN
        }
    }
}

impl PerformanceEvaluator for RegressionEvaluator {
    fn add_result(&mut self, example: &Example, prediction: Prediction) {
        let (Some(truth), Some(predicted)) = (example.numeric_target(), prediction.as_value())
        else {
            return;
        };
        let error = predicted - truth;
        self.count += 1;
        self.abs_error_sum += error.abs();
        self.squared_error_sum += error * error;
    }

    fn measurements(&self) -> Vec<Measurement> {
        vec![
            Measurement::new("mae", self.mae()),
            Measurement::new("rmse", self.rmse()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::example::AttributeValue;

    fn example(y: f64) -> Example {
        Example::valued(vec![AttributeValue::Numeric(0.0)], y)
    }

    #[test]
    fn empty_evaluator_reports_nan() {
        let evaluator = RegressionEvaluator::new();
        assert!(evaluator.mae().is_nan());
        assert!(evaluator.rmse().is_nan());
    }

    #[test]
    fn errors_accumulate() {
        let mut evaluator = RegressionEvaluator::new();
        evaluator.add_result(&example(1.0), Prediction::Value(2.0));
        evaluator.add_result(&example(1.0), Prediction::Value(0.0));
        assert!((evaluator.mae() - 1.0).abs() < 1e-12);
        assert!((evaluator.rmse() - 1.0).abs() < 1e-12);

        evaluator.add_result(&example(0.0), Prediction::Value(4.0));
        assert!((evaluator.mae() - 2.0).abs() < 1e-12);
        assert!((evaluator.rmse() - (18.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn classification_predictions_are_ignored() {
        let mut evaluator = RegressionEvaluator::new();
        evaluator.add_result(&example(1.0), Prediction::Label(1));
        assert!(evaluator.mae().is_nan());
    }
}
