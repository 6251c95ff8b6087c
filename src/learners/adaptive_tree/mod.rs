pub mod config;
pub mod error;
pub mod export;
pub mod hoeffding_bound;
pub mod histogram;
pub mod node;
pub mod tree;

pub use config::{
    ConfigError, ExportFormat, LeafPrediction, NbSmoothing, SplitHeuristic, TaskType, TreeConfig,
};
pub use error::TreeError;
pub use tree::AdaptiveHoeffdingTree;
