//! Trial feed sources and the timer pump that drives them.
//!
//! A [`TrialFeed`] produces trial records at some cadence: a live training
//! job, a replay of a recorded run, or the built-in [`SyntheticFeed`] that
//! simulates a search for demos and tests. [`pump`] ticks a feed on a fixed
//! interval and dispatches one [`Action::Update`] per tick — no queuing, no
//! backpressure; if a consumer falls behind, later updates simply overwrite
//! the store's latest record.

use core::time::Duration;
use std::collections::VecDeque;

use crate::record::{
    Direction, EarlyStoppingConfig, EarlyStoppingSnapshot, EarlyStoppingStatus, ExperimentConfig,
    FoldModel, ParamValue, TrialRecord,
};
use crate::store::{Action, ExperimentStore};

/// Reference cadence: one trial per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// A producer of trial records.
pub trait TrialFeed {
    /// The next record, or `None` when the feed is exhausted.
    fn next_trial(&mut self) -> Option<TrialRecord>;
}

/// Replays a recorded sequence of trial records in order.
#[derive(Clone, Debug, Default)]
pub struct ReplayFeed {
    records: VecDeque<TrialRecord>,
}

impl ReplayFeed {
    /// Creates a feed that yields `records` front to back.
    #[must_use]
    pub fn new(records: Vec<TrialRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Number of records left to replay.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl TrialFeed for ReplayFeed {
    fn next_trial(&mut self) -> Option<TrialRecord> {
        self.records.pop_front()
    }
}

/// Simulates a hyperparameter search: rewards that improve with noise,
/// plausible sampled parameters, per-fold models with feature importances,
/// and early-stopping counters once a few trials are in.
///
/// The feed never runs dry; bound it with `max_events` when pumping.
pub struct SyntheticFeed {
    rng: fastrand::Rng,
    config: ExperimentConfig,
    metric_name: String,
    next_trial_no: u64,
    best_reward: f64,
    no_improvement_streak: u64,
    start_elapsed: u64,
}

impl SyntheticFeed {
    const FEATURES: [&'static str; 6] = ["col_0", "col_1", "col_2", "col_3", "col_4", "col_5"];

    /// Creates a feed with an entropy-seeded generator.
    #[must_use]
    pub fn new(config: ExperimentConfig, metric_name: impl Into<String>) -> Self {
        Self::with_rng(config, metric_name, fastrand::Rng::new())
    }

    /// Creates a deterministic feed for reproducible demos and tests.
    #[must_use]
    pub fn with_seed(config: ExperimentConfig, metric_name: impl Into<String>, seed: u64) -> Self {
        Self::with_rng(config, metric_name, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(config: ExperimentConfig, metric_name: impl Into<String>, rng: fastrand::Rng) -> Self {
        Self {
            rng,
            config,
            metric_name: metric_name.into(),
            next_trial_no: 1,
            best_reward: 0.0,
            no_improvement_streak: 0,
            start_elapsed: 0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn base_reward(&mut self, trial_no: u64) -> f64 {
        // Saturating improvement curve with per-trial noise.
        let progress = 1.0 - (-(trial_no as f64) / 8.0).exp();
        0.6 + 0.3 * progress + self.rng.f64() * 0.04 - 0.02
    }

    fn sample_params(&mut self) -> Vec<(String, ParamValue)> {
        let depth = self.rng.i64(3..=10);
        let lr = 10f64.powf(-(1.0 + self.rng.f64() * 2.0));
        let boost_round = self.rng.i64(50..=500);
        let booster = if self.rng.bool() { "gbtree" } else { "dart" };
        vec![
            ("learning_rate".to_string(), ParamValue::Float((lr * 1e4).round() / 1e4)),
            ("max_depth".to_string(), ParamValue::Int(depth)),
            ("boost_round".to_string(), ParamValue::Int(boost_round)),
            ("booster".to_string(), ParamValue::Text(booster.to_string())),
        ]
    }

    fn sample_model(&mut self, fold: Option<usize>, reward: f64) -> FoldModel {
        let mut model = FoldModel::new(fold, reward);
        for feature in Self::FEATURES {
            model = model.with_importance(feature, self.rng.f64() * 100.0);
        }
        model
    }
}

impl TrialFeed for SyntheticFeed {
    fn next_trial(&mut self) -> Option<TrialRecord> {
        let trial_no = self.next_trial_no;
        self.next_trial_no += 1;

        let base = self.base_reward(trial_no);
        let elapsed = self.rng.u64(30..=180);
        self.start_elapsed += elapsed;

        let models: Vec<FoldModel> = if self.config.cv {
            (0..self.config.n_folds)
                .map(|fold| {
                    let jitter = self.rng.f64() * 0.04 - 0.02;
                    self.sample_model(Some(fold), base + jitter)
                })
                .collect()
        } else {
            vec![self.sample_model(None, base)]
        };

        #[allow(clippy::cast_precision_loss)]
        let avg_reward = models.iter().map(|m| m.reward).sum::<f64>() / models.len() as f64;
        if avg_reward > self.best_reward {
            self.best_reward = avg_reward;
            self.no_improvement_streak = 0;
        } else {
            self.no_improvement_streak += 1;
        }

        let mut record = TrialRecord::new(trial_no, avg_reward, elapsed, self.metric_name.clone())
            .with_models(models);
        for (name, value) in self.sample_params() {
            record = record.with_param(name, value);
        }

        if trial_no >= 3 {
            record = record.with_early_stopping(EarlyStoppingSnapshot {
                status: EarlyStoppingStatus {
                    best_reward: self.best_reward,
                    no_improvement_trials: self.no_improvement_streak,
                    elapsed_secs: self.start_elapsed,
                },
                config: EarlyStoppingConfig {
                    expected_reward: Some(0.95),
                    max_no_improvement_trials: Some(20),
                    max_elapsed_secs: None,
                    direction: Direction::Maximize,
                },
            });
        }

        Some(record)
    }
}

impl core::fmt::Debug for SyntheticFeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyntheticFeed")
            .field("config", &self.config)
            .field("next_trial_no", &self.next_trial_no)
            .field("best_reward", &self.best_reward)
            .finish()
    }
}

/// Drives a feed into a store on a fixed interval, blocking the caller.
///
/// Dispatches one update per tick until `max_events` records were sent or
/// the feed runs dry, and returns the number sent. Pass
/// `Duration::ZERO` to drain without sleeping (replays, tests).
pub fn pump<F: TrialFeed>(
    feed: &mut F,
    store: &ExperimentStore,
    interval: Duration,
    max_events: usize,
) -> usize {
    let mut sent = 0;
    while sent < max_events {
        let Some(record) = feed.next_trial() else { break };
        trace_debug!("feed tick: trial #{}", record.trial_no);
        store.dispatch(Action::Update(record));
        sent += 1;
        if sent < max_events && !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
    sent
}

/// Async variant of [`pump`] on a tokio interval.
///
/// One dispatch per tick; yields between ticks instead of blocking a
/// thread.
#[cfg(feature = "async")]
pub async fn pump_async<F: TrialFeed>(
    feed: &mut F,
    store: &ExperimentStore,
    interval: Duration,
    max_events: usize,
) -> usize {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    let mut sent = 0;
    while sent < max_events {
        ticker.tick().await;
        let Some(record) = feed.next_trial() else { break };
        trace_debug!("feed tick: trial #{}", record.trial_no);
        store.dispatch(Action::Update(record));
        sent += 1;
    }
    sent
}
