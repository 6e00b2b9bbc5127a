//! Simulates a live search at one trial per second and renders it into
//! `trial_dashboard.html`. Open the file in a browser and reload to watch
//! the chart grow.

use trialview::prelude::*;

fn main() {
    let config = ExperimentConfig::cross_validated(3);
    let store = ExperimentStore::new();
    let resize = ResizeEvents::new();

    let surface = HtmlSurface::bind("trial_dashboard.html", Theme::Default);
    let chart = TrialChart::mount(
        config,
        surface,
        ChartProps::new()
            .show_loading(LoadingOptions::default())
            .on_click(|event| println!("clicked {} at point {}", event.series, event.data_index)),
    )
    .unwrap();
    let binding = ChartBinding::bind(chart, &store, &resize);

    let mut feed = SyntheticFeed::new(config, "auc");
    let sent = pump(&mut feed, &store, DEFAULT_INTERVAL, 15);

    let best = store.latest().map_or(0.0, |r| {
        r.early_stopping.map_or(r.avg_reward, |es| es.status.best_reward)
    });
    println!("charted {sent} trials, best auc {best:.4}");
    println!("report: trial_dashboard.html");
    drop(binding);
}
