use crate::core::attributes::SchemaError;
use crate::learners::adaptive_tree::config::ConfigError;
use thiserror::Error;

/// Recoverable failures of the tree's public surface. Schema violations fail
/// the call before any state is touched; invariant breaches inside the
/// engine are bugs and panic instead.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("example does not match schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("a {task} tree requires a {required} target attribute")]
    TaskMismatch {
        task: &'static str,
        required: &'static str,
    },

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}
