mod classification_evaluator;
mod performance_evaluator;
mod regression_evaluator;
mod window_accuracy;

pub use classification_evaluator::ClassificationEvaluator;
pub use performance_evaluator::PerformanceEvaluator;
pub use regression_evaluator::RegressionEvaluator;
pub use window_accuracy::WindowAccuracy;
