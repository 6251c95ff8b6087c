use crate::core::example::{Example, Prediction};
use crate::evaluation::Measurement;
use crate::evaluation::evaluators::PerformanceEvaluator;

/// Basic online classifier evaluator.
///
/// Tracks overall accuracy and the marginals of true and predicted classes
/// for Cohen's kappa. All updates are online and unbounded; marginal vectors
/// grow on demand when a label outside the initial range shows up.
pub struct ClassificationEvaluator {
    total: u64,
    correct: u64,
    true_counts: Vec<u64>,
    predicted_counts: Vec<u64>,
}

impl ClassificationEvaluator {
    pub fn new(num_classes: usize) -> Self {
        Self {
            total: 0,
            correct: 0,
            true_counts: vec![0; num_classes],
            predicted_counts: vec![0; num_classes],
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total > 0 {
            self.correct as f64 / self.total as f64
        } else {
            f64::NAN
        }
    }

    /// Cohen's kappa: agreement corrected for chance under the observed
    /// marginals.
    pub fn kappa(&self) -> f64 {
        if self.total == 0 {
            return f64::NAN;
        }
        let n = self.total as f64;
        let p0 = self.accuracy();
        let pe: f64 = self
            .true_counts
            .iter()
            .zip(&self.predicted_counts)
            .map(|(&t, &p)| (t as f64 / n) * (p as f64 / n))
            .sum();
        if (1.0 - pe).abs() < f64::EPSILON {
            return 0.0;
        }
        (p0 - pe) / (1.0 - pe)
    }

    fn bump(counts: &mut Vec<u64>, label: usize) {
        if label >= counts.len() {
            counts.resize(label + 1, 0);
        }
        counts[label] += 1;
    }
}

impl PerformanceEvaluator for ClassificationEvaluator {
    fn add_result(&mut self, example: &Example, prediction: Prediction) {
        let (Some(truth), Some(predicted)) = (example.label(), prediction.as_label()) else {
            return;
        };
        self.total += 1;
        if truth == predicted {
            self.correct += 1;
        }
        Self::bump(&mut self.true_counts, truth);
        Self::bump(&mut self.predicted_counts, predicted);
    }

    fn measurements(&self) -> Vec<Measurement> {
        vec![
            Measurement::new("accuracy", self.accuracy()),
            Measurement::new("kappa", self.kappa()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::example::AttributeValue;

    fn example(label: usize) -> Example {
        Example::labeled(vec![AttributeValue::Discrete(0)], label)
    }

    #[test]
    fn empty_evaluator_reports_nan() {
        let evaluator = ClassificationEvaluator::new(2);
        assert!(evaluator.accuracy().is_nan());
        assert!(evaluator.kappa().is_nan());
    }

    #[test]
    fn accuracy_counts_matches() {
        let mut evaluator = ClassificationEvaluator::new(2);
        evaluator.add_result(&example(1), Prediction::Label(1));
        evaluator.add_result(&example(0), Prediction::Label(1));
        evaluator.add_result(&example(0), Prediction::Label(0));
        evaluator.add_result(&example(1), Prediction::Label(1));
        assert!((evaluator.accuracy() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn kappa_is_zero_for_constant_predictor() {
        let mut evaluator = ClassificationEvaluator::new(2);
        for i in 0..100 {
            evaluator.add_result(&example(i % 2), Prediction::Label(1));
        }
        assert!(evaluator.kappa().abs() < 1e-12);
    }

    #[test]
    fn kappa_is_one_for_perfect_predictor() {
        let mut evaluator = ClassificationEvaluator::new(2);
        for i in 0..100 {
            evaluator.add_result(&example(i % 2), Prediction::Label(i % 2));
        }
        assert!((evaluator.kappa() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn regression_predictions_are_ignored() {
        let mut evaluator = ClassificationEvaluator::new(2);
        evaluator.add_result(&example(0), Prediction::Value(0.5));
        assert_eq!(evaluator.total, 0);
    }

    #[test]
    fn measurements_expose_both_metrics() {
        let mut evaluator = ClassificationEvaluator::new(2);
        evaluator.add_result(&example(0), Prediction::Label(0));
        let names: Vec<String> = evaluator
            .measurements()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["accuracy", "kappa"]);
        assert_eq!(evaluator.measurement("accuracy"), Some(1.0));
    }
}
