pub mod evaluators;
mod measurement;
mod preview;

pub use evaluators::{
    ClassificationEvaluator, PerformanceEvaluator, RegressionEvaluator, WindowAccuracy,
};
pub use measurement::Measurement;
pub use preview::{CurveFormat, LearningCurve, Snapshot};
