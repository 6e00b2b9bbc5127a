use trialview::chart::{ChartProps, TrialChart};
use trialview::record::{ExperimentConfig, FoldModel, TrialRecord};
use trialview::surface::{Capability, ClickEvent, LoadingOptions, RecordingSurface, SurfaceCall};
use trialview::Error;

fn record(trial_no: u64, reward: f64, elapsed: u64) -> TrialRecord {
    TrialRecord::new(trial_no, reward, elapsed, "auc").with_model(FoldModel::new(None, reward))
}

fn cv_record(trial_no: u64, rewards: &[f64], avg: f64) -> TrialRecord {
    let models = rewards
        .iter()
        .enumerate()
        .map(|(fold, &reward)| FoldModel::new(Some(fold), reward))
        .collect();
    TrialRecord::new(trial_no, avg, 60, "auc").with_models(models)
}

#[test]
fn accumulation_is_monotonic() {
    let surface = RecordingSurface::new();
    let mut chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    for trial_no in 1..=25 {
        assert!(chart.observe(&record(trial_no, 0.7, 60)).unwrap());
        assert_eq!(chart.len(), usize::try_from(trial_no).unwrap());
    }
}

#[test]
fn series_lengths_always_match_history() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let mut chart =
        TrialChart::mount(ExperimentConfig::cross_validated(3), surface, ChartProps::new())
            .unwrap();

    for trial_no in 1..=10 {
        chart
            .observe(&cv_record(trial_no, &[0.6, 0.7, 0.8], 0.7))
            .unwrap();

        let options = log.last_options().unwrap();
        assert!(options.is_consistent());
        assert_eq!(options.x_axis.labels.len(), chart.len());
        // 3 fold scatters + average line + elapsed bar.
        assert_eq!(options.series.len(), 5);
        for series in &options.series {
            assert_eq!(series.data.len(), chart.len());
        }
    }
}

#[test]
fn repeated_trial_no_is_a_no_op() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let mut chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    assert!(chart.observe(&record(1, 0.7, 60)).unwrap());
    let applies_after_first = log.apply_count();

    assert!(!chart.observe(&record(1, 0.7, 60)).unwrap());
    assert_eq!(chart.len(), 1);
    assert_eq!(log.apply_count(), applies_after_first);
}

#[test]
fn mount_applies_empty_options() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    assert_eq!(log.apply_count(), 1);
    let options = log.last_options().unwrap();
    assert!(options.x_axis.labels.is_empty());
    assert!(options.series.iter().all(|s| s.data.is_empty()));
    assert!(chart.is_empty());
}

#[test]
fn mount_rejects_zero_fold_cv() {
    let err = TrialChart::mount(
        ExperimentConfig::cross_validated(0),
        RecordingSurface::new(),
        ChartProps::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidFoldCount));
}

#[test]
fn short_record_halts_that_update_only() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let mut chart =
        TrialChart::mount(ExperimentConfig::cross_validated(3), surface, ChartProps::new())
            .unwrap();

    chart
        .observe(&cv_record(1, &[0.6, 0.7, 0.8], 0.7))
        .unwrap();
    let applies_before = log.apply_count();

    // Only two model entries for a 3-fold config: configuration violation.
    let err = chart.observe(&cv_record(2, &[0.6, 0.7], 0.65)).unwrap_err();
    assert!(matches!(
        err,
        Error::FoldOutOfRange {
            trial_no: 2,
            fold: 2,
            available: 2
        }
    ));

    // The bad record was not appended and nothing was rendered for it.
    assert_eq!(chart.len(), 1);
    assert_eq!(log.apply_count(), applies_before);

    // The pipeline keeps working afterwards.
    chart
        .observe(&cv_record(3, &[0.7, 0.8, 0.9], 0.8))
        .unwrap();
    assert_eq!(chart.len(), 2);
}

#[test]
fn unmount_releases_surface_and_stops_updates() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let mut chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    chart.observe(&record(1, 0.7, 60)).unwrap();
    chart.unmount();
    assert!(!chart.is_mounted());
    assert_eq!(log.dispose_count(), 1);

    let applies = log.apply_count();
    let resizes = log.resize_count();
    assert!(matches!(chart.observe(&record(2, 0.8, 60)), Err(Error::NotMounted)));
    assert!(matches!(chart.handle_resize(), Err(Error::NotMounted)));
    assert_eq!(log.apply_count(), applies);
    assert_eq!(log.resize_count(), resizes);

    // Idempotent.
    chart.unmount();
    assert_eq!(log.dispose_count(), 1);
}

#[test]
fn drop_disposes_surface() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    drop(chart);
    assert_eq!(log.dispose_count(), 1);
}

#[test]
fn failing_dispose_is_swallowed_and_recorded() {
    let mut surface = RecordingSurface::new();
    surface.fail_dispose();
    let mut chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    chart.unmount();
    assert!(!chart.is_mounted());
    assert!(chart.teardown_warning().is_some());
}

#[test]
fn loading_shown_at_mount_hidden_on_first_trial() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let mut chart = TrialChart::mount(
        ExperimentConfig::single_model(),
        surface,
        ChartProps::new().show_loading(LoadingOptions::default()),
    )
    .unwrap();

    assert!(log
        .calls()
        .iter()
        .any(|call| matches!(call, SurfaceCall::ShowLoading(_))));
    assert!(!log.calls().iter().any(|call| matches!(call, SurfaceCall::HideLoading)));

    chart.observe(&record(1, 0.7, 60)).unwrap();
    assert!(log.calls().iter().any(|call| matches!(call, SurfaceCall::HideLoading)));
}

#[test]
fn mount_registers_all_capabilities() {
    let surface = RecordingSurface::new();
    let log = surface.log();
    let _chart =
        TrialChart::mount(ExperimentConfig::single_model(), surface, ChartProps::new()).unwrap();

    let registered: Vec<Capability> = log
        .calls()
        .iter()
        .filter_map(|call| match call {
            SurfaceCall::Register(capabilities) => Some(capabilities.clone()),
            _ => None,
        })
        .flatten()
        .collect();
    for capability in Capability::ALL {
        assert!(registered.contains(&capability), "{capability:?} not registered");
    }
}

#[test]
fn click_handler_receives_surface_clicks() {
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let clicks = Arc::new(AtomicUsize::new(0));
    let surface = RecordingSurface::new();
    let mut chart = TrialChart::mount(
        ExperimentConfig::single_model(),
        surface,
        ChartProps::new().on_click({
            let clicks = Arc::clone(&clicks);
            move |_| {
                clicks.fetch_add(1, Ordering::SeqCst);
            }
        }),
    )
    .unwrap();

    chart.observe(&record(1, 0.7, 60)).unwrap();
    chart.surface_mut().unwrap().emit_click(&ClickEvent {
        series: "auc".to_string(),
        data_index: 0,
        value: 0.7,
    });
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}
