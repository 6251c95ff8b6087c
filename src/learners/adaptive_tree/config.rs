use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskType {
    Classification,
    Regression,
}

/// Split heuristic for classification; regression always uses
/// standard-deviation reduction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SplitHeuristic {
    InfoGain,
    GiniGain,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LeafPrediction {
    MajorityClass,
    NaiveBayes,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NbSmoothing {
    Laplace,
    MEstimate,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExportFormat {
    Xml,
    Json,
    Dot,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

/// Learning parameters of the adaptive tree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TreeConfig {
    #[schemars(description = "Learning task: classification or regression")]
    pub task: TaskType,

    #[schemars(description = "Split heuristic used for classification leaves")]
    pub heuristic: SplitHeuristic,

    #[schemars(description = "How classification leaves predict")]
    pub leaf_prediction: LeafPrediction,

    #[schemars(description = "Smoothing used by the naive-Bayes leaf predictor")]
    pub nb_smoothing: NbSmoothing,

    #[schemars(description = "Trust weight m of the m-estimate")]
    pub m_estimate_weight: f64,

    #[schemars(description = "Minimum examples between split evaluations at a leaf")]
    pub grace_period: u64,

    #[schemars(description = "Delta of the Hoeffding bound (1 - confidence)")]
    pub split_confidence: f64,

    #[schemars(description = "Tau: force a split whenever epsilon drops below it")]
    pub tie_breaking: f64,

    #[schemars(description = "Capacity of the example FIFO window")]
    pub window_size: usize,

    #[schemars(description = "Enable drift adaptation via alternate subtrees")]
    pub adaptive: bool,

    #[schemars(description = "Examples between drift checks")]
    pub drift_check: u64,

    #[schemars(description = "Fading factor of the prequential error")]
    pub fading_factor: f64,

    #[schemars(description = "Maximum bins per histogram")]
    pub bins_cap: usize,

    #[schemars(description = "Faded error above which a node spawns an alternate")]
    pub alt_creation_threshold: f64,

    #[schemars(description = "Maximum concurrent alternates per node")]
    pub max_alt_trees: usize,

    #[schemars(description = "An alternate must beat its host by this much to be promoted")]
    pub promotion_margin: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            task: TaskType::Classification,
            heuristic: SplitHeuristic::InfoGain,
            leaf_prediction: LeafPrediction::MajorityClass,
            nb_smoothing: NbSmoothing::Laplace,
            m_estimate_weight: 2.0,
            grace_period: 200,
            split_confidence: 1e-6,
            tie_breaking: 0.05,
            window_size: 10_000,
            adaptive: true,
            drift_check: 100,
            fading_factor: 0.9995,
            bins_cap: 100,
            alt_creation_threshold: 0.25,
            max_alt_trees: 2,
            promotion_margin: 0.01,
        }
    }
}

impl TreeConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: TreeConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(
            ok: bool,
            name: &'static str,
            requirement: &'static str,
            value: f64,
        ) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    name,
                    requirement,
                    value,
                })
            }
        }

        check(
            self.grace_period >= 1,
            "grace_period",
            ">= 1",
            self.grace_period as f64,
        )?;
        check(
            self.split_confidence > 0.0 && self.split_confidence < 1.0,
            "split_confidence",
            "in (0, 1)",
            self.split_confidence,
        )?;
        check(
            self.tie_breaking >= 0.0,
            "tie_breaking",
            ">= 0",
            self.tie_breaking,
        )?;
        check(
            self.window_size >= 1,
            "window_size",
            ">= 1",
            self.window_size as f64,
        )?;
        check(
            self.drift_check >= 1,
            "drift_check",
            ">= 1",
            self.drift_check as f64,
        )?;
        check(
            self.fading_factor > 0.0 && self.fading_factor < 1.0,
            "fading_factor",
            "in (0, 1)",
            self.fading_factor,
        )?;
        check(self.bins_cap >= 2, "bins_cap", ">= 2", self.bins_cap as f64)?;
        check(
            self.alt_creation_threshold > 0.0 && self.alt_creation_threshold < 1.0,
            "alt_creation_threshold",
            "in (0, 1)",
            self.alt_creation_threshold,
        )?;
        check(
            self.max_alt_trees >= 1,
            "max_alt_trees",
            ">= 1",
            self.max_alt_trees as f64,
        )?;
        check(
            self.promotion_margin >= 0.0,
            "promotion_margin",
            ">= 0",
            self.promotion_margin,
        )?;
        check(
            self.m_estimate_weight > 0.0,
            "m_estimate_weight",
            "> 0",
            self.m_estimate_weight,
        )?;
        Ok(())
    }
}
