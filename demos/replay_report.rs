//! Replays a small recorded run into a dark-themed chart document without
//! pacing, the way a stored search log would be rendered after the fact.

use core::time::Duration;

use trialview::prelude::*;

fn recorded_run() -> Vec<TrialRecord> {
    let rewards = [
        (1, [0.612, 0.655], 74),
        (2, [0.648, 0.691], 102),
        (3, [0.701, 0.688], 95),
        (4, [0.712, 0.734], 131),
        (5, [0.729, 0.741], 88),
    ];
    rewards
        .into_iter()
        .map(|(trial_no, folds, elapsed)| {
            let avg = (folds[0] + folds[1]) / 2.0;
            TrialRecord::new(trial_no, avg, elapsed, "auc")
                .with_param("max_depth", ParamValue::Int(6))
                .with_param("learning_rate", ParamValue::Float(0.05))
                .with_model(FoldModel::new(Some(0), folds[0]).with_importance("col_0", 41.0))
                .with_model(FoldModel::new(Some(1), folds[1]).with_importance("col_0", 38.5))
        })
        .collect()
}

fn main() {
    let config = ExperimentConfig::cross_validated(2);
    let store = ExperimentStore::new();
    let resize = ResizeEvents::new();

    let surface = HtmlSurface::bind("trial_report.html", Theme::Dark);
    let chart = TrialChart::mount(config, surface, ChartProps::new()).unwrap();
    let binding = ChartBinding::bind(chart, &store, &resize);

    let mut feed = ReplayFeed::new(recorded_run());
    let sent = pump(&mut feed, &store, Duration::ZERO, usize::MAX);

    println!("replayed {sent} trials into trial_report.html");
    if let Some(error) = binding.take_last_error() {
        eprintln!("replay hit an error: {error}");
    }
    drop(binding);
}
