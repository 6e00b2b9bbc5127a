//! Series derivation: from accumulated trial history to chart options.
//!
//! Every function here recomputes its output from the full history. Nothing
//! is patched incrementally, so the render-time invariant — one axis label
//! and one value per series per accumulated trial — holds by construction.

use crate::error::{Error, Result};
use crate::options::{CategoryAxis, ChartOptions, Grid, Legend, Series, Toolbox, Tooltip};
use crate::record::{ExperimentConfig, TrialRecord};

/// Category-axis labels: `"#<trialNo>"` per record.
#[must_use]
pub fn trial_labels(history: &[TrialRecord]) -> Vec<String> {
    history.iter().map(|r| format!("#{}", r.trial_no)).collect()
}

/// Elapsed time per trial, in whole minutes.
///
/// Rounds to the nearest minute with ties away from zero (`f64::round`), so
/// 90 seconds plots as 2 minutes and 100 seconds as 2 minutes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_minutes(history: &[TrialRecord]) -> Vec<f64> {
    history.iter().map(|r| (r.elapsed as f64 / 60.0).round()).collect()
}

/// The reward series for the given configuration.
///
/// Without cross-validation: one line series of `models[0].reward`, named
/// after the metric. With cross-validation: one scatter series per fold
/// index reading `models[i].reward`, plus a line series of `avg_reward`.
/// All series are derived from `history` directly.
///
/// # Errors
///
/// Returns [`Error::FoldOutOfRange`] when any record carries fewer model
/// entries than the configuration demands — a data-contract violation that
/// fails the whole derivation rather than plotting gaps — and
/// [`Error::InvalidFoldCount`] for a cross-validation config with zero
/// folds.
pub fn reward_series(history: &[TrialRecord], config: &ExperimentConfig) -> Result<Vec<Series>> {
    config.validate()?;
    let metric = metric_label(history);

    if !config.cv {
        let mut data = Vec::with_capacity(history.len());
        for record in history {
            let model = record.models.first().ok_or(Error::FoldOutOfRange {
                trial_no: record.trial_no,
                fold: 0,
                available: 0,
            })?;
            data.push(model.reward);
        }
        return Ok(vec![Series::line(metric, data)]);
    }

    let mut series = Vec::with_capacity(config.n_folds + 1);
    for fold in 0..config.n_folds {
        let mut data = Vec::with_capacity(history.len());
        for record in history {
            let model = record.models.get(fold).ok_or(Error::FoldOutOfRange {
                trial_no: record.trial_no,
                fold,
                available: record.models.len(),
            })?;
            data.push(model.reward);
        }
        series.push(Series::scatter(format!("fold {fold}"), data));
    }
    series.push(Series::line(
        format!("avg {metric}"),
        history.iter().map(|r| r.avg_reward).collect(),
    ));
    Ok(series)
}

/// Builds the complete options structure for the given history.
///
/// The output carries the reward series, the elapsed-minutes bar series and
/// all four feature blocks; its legend lists every series name in plot
/// order.
///
/// # Errors
///
/// Propagates the errors of [`reward_series`].
pub fn build_options(history: &[TrialRecord], config: &ExperimentConfig) -> Result<ChartOptions> {
    let mut series = reward_series(history, config)?;
    series.push(Series::bar("elapsed", elapsed_minutes(history)));

    let options = ChartOptions {
        title: format!("{} by trial", metric_label(history)),
        x_axis: CategoryAxis {
            labels: trial_labels(history),
        },
        tooltip: Some(Tooltip::axis()),
        legend: Some(Legend {
            entries: series.iter().map(|s| s.name.clone()).collect(),
        }),
        grid: Some(Grid::default()),
        toolbox: Some(Toolbox::default()),
        series,
    };
    debug_assert!(options.is_consistent());
    Ok(options)
}

/// Metric label for titles and series names; falls back to `"reward"` while
/// the history is still empty.
fn metric_label(history: &[TrialRecord]) -> String {
    history
        .first()
        .map_or_else(|| "reward".to_string(), |r| r.metric_name.clone())
}
