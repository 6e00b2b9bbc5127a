//! Trial records and run-wide experiment configuration.
//!
//! A [`TrialRecord`] is one observation from a search run: the sampled
//! hyper-parameters, one model result per fold (or a single result when
//! cross-validation is off), the averaged reward, and the wall-clock seconds
//! the trial took. Records are produced by a feed source, pass through the
//! [`ExperimentStore`](crate::store::ExperimentStore) and accumulate inside
//! the [`TrialChart`](crate::chart::TrialChart).

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A hyper-parameter value, stored uniformly regardless of its source type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    /// A boolean parameter value.
    Bool(bool),
    /// An integer parameter value.
    Int(i64),
    /// A floating-point parameter value.
    Float(f64),
    /// A stringly-typed parameter value (categorical choices arrive as text).
    Text(String),
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// One feature-importance pair reported by a trained model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Importance {
    /// Feature name.
    pub name: String,
    /// Importance score; higher means more influential.
    pub importance: f64,
}

impl Importance {
    /// Creates a new feature-importance pair.
    #[must_use]
    pub fn new(name: impl Into<String>, importance: f64) -> Self {
        Self {
            name: name.into(),
            importance,
        }
    }
}

/// The result of one trained model inside a trial.
///
/// When cross-validation is on there is one entry per fold; otherwise a
/// single entry with `fold: None`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FoldModel {
    /// Fold index, or `None` when cross-validation is off.
    pub fold: Option<usize>,
    /// Reward achieved by this model.
    pub reward: f64,
    /// Feature importances, sorted by the producer.
    #[cfg_attr(feature = "serde", serde(default))]
    pub importances: Vec<Importance>,
}

impl FoldModel {
    /// Creates a model result for the given fold.
    #[must_use]
    pub fn new(fold: Option<usize>, reward: f64) -> Self {
        Self {
            fold,
            reward,
            importances: Vec::new(),
        }
    }

    /// Adds a feature-importance pair.
    #[must_use]
    pub fn with_importance(mut self, name: impl Into<String>, importance: f64) -> Self {
        self.importances.push(Importance::new(name, importance));
        self
    }
}

/// The direction in which the reward metric improves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Smaller rewards are better.
    Minimize,
    /// Larger rewards are better.
    Maximize,
}

/// Live early-stopping counters at the time a trial finished.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EarlyStoppingStatus {
    /// Best reward seen so far in the run.
    pub best_reward: f64,
    /// Consecutive trials without improvement.
    pub no_improvement_trials: u64,
    /// Seconds elapsed since the early-stopping clock started.
    pub elapsed_secs: u64,
}

/// The run's early-stopping configuration, fixed for the whole search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EarlyStoppingConfig {
    /// Stop once this reward is reached.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expected_reward: Option<f64>,
    /// Stop after this many trials without improvement.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_no_improvement_trials: Option<u64>,
    /// Stop after this many seconds of searching.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_elapsed_secs: Option<u64>,
    /// Which way the reward improves.
    pub direction: Direction,
}

/// Early-stopping state attached to a trial record: the live counters plus
/// the run-wide configuration they are measured against.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EarlyStoppingSnapshot {
    /// Counters at the time the trial finished.
    pub status: EarlyStoppingStatus,
    /// The limits the counters run against.
    pub config: EarlyStoppingConfig,
}

/// One observation from a training or tuning run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrialRecord {
    /// Monotonically increasing identifier, unique per run.
    pub trial_no: u64,
    /// Sampled hyper-parameters, opaque to the chart.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hyper_params: BTreeMap<String, ParamValue>,
    /// Per-fold model results; a single entry when cross-validation is off.
    #[cfg_attr(feature = "serde", serde(default))]
    pub models: Vec<FoldModel>,
    /// Mean reward across `models`.
    pub avg_reward: f64,
    /// Seconds spent on this trial.
    pub elapsed: u64,
    /// Label of the reward metric (e.g. `"auc"`).
    pub metric_name: String,
    /// Early-stopping state, when the run has an early-stopping policy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub early_stopping: Option<EarlyStoppingSnapshot>,
}

impl TrialRecord {
    /// Creates a record with no hyper-parameters and no model entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use trialview::record::{FoldModel, TrialRecord};
    ///
    /// let record = TrialRecord::new(1, 0.7, 100, "auc")
    ///     .with_model(FoldModel::new(None, 0.7));
    /// assert_eq!(record.trial_no, 1);
    /// assert_eq!(record.models.len(), 1);
    /// ```
    #[must_use]
    pub fn new(trial_no: u64, avg_reward: f64, elapsed: u64, metric_name: impl Into<String>) -> Self {
        Self {
            trial_no,
            hyper_params: BTreeMap::new(),
            models: Vec::new(),
            avg_reward,
            elapsed,
            metric_name: metric_name.into(),
            early_stopping: None,
        }
    }

    /// Adds one sampled hyper-parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.hyper_params.insert(name.into(), value);
        self
    }

    /// Adds one per-fold model result.
    #[must_use]
    pub fn with_model(mut self, model: FoldModel) -> Self {
        self.models.push(model);
        self
    }

    /// Replaces all model results at once.
    #[must_use]
    pub fn with_models(mut self, models: Vec<FoldModel>) -> Self {
        self.models = models;
        self
    }

    /// Attaches early-stopping state.
    #[must_use]
    pub fn with_early_stopping(mut self, snapshot: EarlyStoppingSnapshot) -> Self {
        self.early_stopping = Some(snapshot);
        self
    }

    /// Returns the top `limit` features by mean importance across all model
    /// entries, sorted descending.
    ///
    /// Features missing from some folds contribute only the folds that report
    /// them.
    #[must_use]
    pub fn top_importances(&self, limit: usize) -> Vec<Importance> {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for model in &self.models {
            for imp in &model.importances {
                let entry = sums.entry(imp.name.as_str()).or_insert((0.0, 0));
                entry.0 += imp.importance;
                entry.1 += 1;
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let mut averaged: Vec<Importance> = sums
            .into_iter()
            .map(|(name, (sum, count))| Importance::new(name, sum / count as f64))
            .collect();
        averaged.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(core::cmp::Ordering::Equal)
        });
        averaged.truncate(limit);
        averaged
    }
}

/// Run-wide settings fixed for the lifetime of a chart instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExperimentConfig {
    /// Whether cross-validation is in effect.
    pub cv: bool,
    /// Number of per-fold series to plot; meaningful only when `cv` is true.
    pub n_folds: usize,
}

impl ExperimentConfig {
    /// Configuration for a run without cross-validation.
    #[must_use]
    pub fn single_model() -> Self {
        Self { cv: false, n_folds: 0 }
    }

    /// Configuration for a cross-validated run with `n_folds` folds.
    #[must_use]
    pub fn cross_validated(n_folds: usize) -> Self {
        Self { cv: true, n_folds }
    }

    /// Checks that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFoldCount`] when cross-validation is enabled
    /// with zero folds.
    pub fn validate(&self) -> Result<()> {
        if self.cv && self.n_folds == 0 {
            return Err(Error::InvalidFoldCount);
        }
        Ok(())
    }

    /// Number of reward series this configuration plots: one per fold plus
    /// the average line under cross-validation, a single line otherwise.
    #[must_use]
    pub fn reward_series_count(&self) -> usize {
        if self.cv {
            self.n_folds + 1
        } else {
            1
        }
    }
}
