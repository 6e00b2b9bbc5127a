//! Async feed-pump tests.
//!
//! These tests are only compiled when the `async` feature is enabled.

#![cfg(feature = "async")]

use core::time::Duration;

use trialview::chart::{ChartBinding, ChartProps, TrialChart};
use trialview::feed::{pump_async, ReplayFeed, SyntheticFeed};
use trialview::record::{ExperimentConfig, FoldModel, TrialRecord};
use trialview::store::ExperimentStore;
use trialview::surface::RecordingSurface;
use trialview::ResizeEvents;

#[tokio::test(start_paused = true)]
async fn pump_async_dispatches_one_update_per_tick() {
    let store = ExperimentStore::new();
    let mut feed = SyntheticFeed::with_seed(ExperimentConfig::single_model(), "auc", 42);

    let sent = pump_async(&mut feed, &store, Duration::from_secs(1), 10).await;
    assert_eq!(sent, 10);
    assert_eq!(store.latest().map(|r| r.trial_no), Some(10));
}

#[tokio::test(start_paused = true)]
async fn pump_async_stops_on_exhausted_feed() {
    let store = ExperimentStore::new();
    let records = vec![
        TrialRecord::new(1, 0.6, 30, "auc").with_model(FoldModel::new(None, 0.6)),
        TrialRecord::new(2, 0.7, 35, "auc").with_model(FoldModel::new(None, 0.7)),
    ];
    let mut feed = ReplayFeed::new(records);

    let sent = pump_async(&mut feed, &store, Duration::from_millis(100), 50).await;
    assert_eq!(sent, 2);
}

#[tokio::test(start_paused = true)]
async fn pump_async_drives_a_bound_chart() {
    let config = ExperimentConfig::cross_validated(2);
    let store = ExperimentStore::new();
    let resize = ResizeEvents::new();
    let surface = RecordingSurface::new();
    let log = surface.log();

    let chart = TrialChart::mount(config, surface, ChartProps::new()).unwrap();
    let binding = ChartBinding::bind(chart, &store, &resize);

    let mut feed = SyntheticFeed::with_seed(config, "auc", 7);
    pump_async(&mut feed, &store, Duration::from_secs(1), 6).await;

    assert_eq!(binding.chart().lock().len(), 6);
    assert_eq!(log.apply_count(), 7);
}
