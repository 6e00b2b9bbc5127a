//! The trial chart component.
//!
//! A [`TrialChart`] owns the accumulating list of every trial record seen so
//! far, derives chart-ready series from that list on each arrival, and
//! pushes a freshly built [`ChartOptions`](crate::options::ChartOptions) to
//! its rendering surface as a full replacement. [`ChartBinding`] wires a
//! chart to an [`ExperimentStore`](crate::store::ExperimentStore) and a
//! resize source through RAII subscriptions.
//!
//! # Lifecycle
//!
//! ```text
//! mount -> observe* (one per new trial_no) -> unmount
//! ```
//!
//! `unmount` runs on every teardown path — explicitly, or from `Drop` — and
//! releases the surface even when `dispose` itself fails.

pub mod series;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::events::{ResizeEvents, Subscription};
use crate::record::{ExperimentConfig, TrialRecord};
use crate::store::ExperimentStore;
use crate::surface::{ApplyMode, Capability, ClickHandler, LoadingOptions, RenderingSurface};

/// Mount-time presentation properties.
///
/// Built fluently:
///
/// ```
/// use trialview::chart::ChartProps;
///
/// let props = ChartProps::new()
///     .show_loading(Default::default())
///     .on_click(|event| println!("clicked {}", event.series));
/// ```
#[derive(Default)]
pub struct ChartProps {
    show_loading: bool,
    loading: LoadingOptions,
    on_click: Option<ClickHandler>,
}

impl ChartProps {
    /// Properties with no loading indicator and no click handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a loading indicator from mount until the first trial renders.
    #[must_use]
    pub fn show_loading(mut self, options: LoadingOptions) -> Self {
        self.show_loading = true;
        self.loading = options;
        self
    }

    /// Installs a click handler for plotted data points.
    #[must_use]
    pub fn on_click(
        mut self,
        handler: impl FnMut(&crate::surface::ClickEvent) + Send + 'static,
    ) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }
}

impl core::fmt::Debug for ChartProps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChartProps")
            .field("show_loading", &self.show_loading)
            .field("has_click_handler", &self.on_click.is_some())
            .finish()
    }
}

/// Plots per-trial reward and elapsed time as records stream in.
///
/// The chart reacts only to records whose `trial_no` differs from the last
/// one it saw; repeats are a no-op. Its history is append-only and fully
/// re-derived into options on every accepted record.
pub struct TrialChart<S: RenderingSurface> {
    config: ExperimentConfig,
    history: Vec<TrialRecord>,
    last_trial_no: Option<u64>,
    surface: Option<S>,
    awaiting_first: bool,
    teardown_warning: Option<String>,
}

impl<S: RenderingSurface> TrialChart<S> {
    /// Mounts a chart onto a surface it takes exclusive ownership of.
    ///
    /// Registers the chart's capabilities, installs the click handler,
    /// shows the loading indicator when asked, and applies the initial
    /// (empty) options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFoldCount`] for an inconsistent
    /// configuration, or any error the surface raises while mounting.
    pub fn mount(config: ExperimentConfig, mut surface: S, props: ChartProps) -> Result<Self> {
        config.validate()?;
        surface.ensure_capabilities(&Capability::ALL)?;
        surface.set_click_handler(props.on_click);
        if props.show_loading {
            surface.show_loading(&props.loading)?;
        }

        let options = series::build_options(&[], &config)?;
        surface.apply(&options, ApplyMode::REPLACE)?;
        trace_info!("chart mounted (cv: {}, folds: {})", config.cv, config.n_folds);

        Ok(Self {
            config,
            history: Vec::new(),
            last_trial_no: None,
            surface: Some(surface),
            awaiting_first: props.show_loading,
            teardown_warning: None,
        })
    }

    /// Feeds one trial record into the chart.
    ///
    /// Returns `Ok(true)` when the record was appended and rendered, and
    /// `Ok(false)` for a record repeating the last seen `trial_no` (no
    /// update — the sole precondition for reacting is a changed trial
    /// number).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMounted`] after `unmount`, and derivation or
    /// surface errors otherwise. On error the record is *not* appended:
    /// that render pass is abandoned and the chart stays consistent with
    /// what the surface last showed.
    pub fn observe(&mut self, record: &TrialRecord) -> Result<bool> {
        let surface = self.surface.as_mut().ok_or(Error::NotMounted)?;
        if self.last_trial_no == Some(record.trial_no) {
            trace_debug!("trial #{} already rendered, skipping", record.trial_no);
            return Ok(false);
        }

        self.history.push(record.clone());
        let options = match series::build_options(&self.history, &self.config) {
            Ok(options) => options,
            Err(error) => {
                self.history.pop();
                return Err(error);
            }
        };

        if self.awaiting_first {
            if let Err(error) = surface.hide_loading() {
                self.history.pop();
                return Err(error);
            }
        }
        if let Err(error) = surface.apply(&options, ApplyMode::REPLACE) {
            self.history.pop();
            return Err(error);
        }

        self.awaiting_first = false;
        self.last_trial_no = Some(record.trial_no);
        trace_debug!("rendered trial #{} ({} total)", record.trial_no, self.history.len());
        Ok(true)
    }

    /// Re-lays-out the surface; call when the drawable region changed size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMounted`] after `unmount`, or the surface's
    /// resize error.
    pub fn handle_resize(&mut self) -> Result<()> {
        self.surface.as_mut().ok_or(Error::NotMounted)?.resize()
    }

    /// Every record seen so far, in arrival order.
    #[must_use]
    pub fn history(&self) -> &[TrialRecord] {
        &self.history
    }

    /// Number of accumulated records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True before the first record arrives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The run-wide configuration this chart was mounted with.
    #[must_use]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// True until `unmount` (or `Drop`) releases the surface.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Direct access to the mounted surface, e.g. to feed synthetic clicks
    /// in tests.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// The warning captured if the surface failed to dispose cleanly.
    #[must_use]
    pub fn teardown_warning(&self) -> Option<&str> {
        self.teardown_warning.as_deref()
    }

    /// Releases the surface. Idempotent.
    ///
    /// A dispose failure is logged and recorded as a warning, never
    /// propagated — teardown must complete on every path.
    pub fn unmount(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            if let Err(error) = surface.dispose() {
                trace_warn!("surface dispose failed during unmount: {error}");
                self.teardown_warning = Some(error.to_string());
            }
            trace_info!("chart unmounted");
        }
    }
}

impl<S: RenderingSurface> Drop for TrialChart<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<S: RenderingSurface> core::fmt::Debug for TrialChart<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrialChart")
            .field("config", &self.config)
            .field("history_len", &self.history.len())
            .field("last_trial_no", &self.last_trial_no)
            .field("mounted", &self.surface.is_some())
            .finish()
    }
}

/// Wires a [`TrialChart`] to a store and a resize source.
///
/// Store updates drive [`TrialChart::observe`]; resize notifications drive
/// [`TrialChart::handle_resize`]. Both registrations are RAII: dropping the
/// binding unsubscribes from both sources and unmounts the chart, so no
/// listener outlives the component.
pub struct ChartBinding<S: RenderingSurface> {
    chart: Arc<Mutex<TrialChart<S>>>,
    last_error: Arc<Mutex<Option<Error>>>,
    _updates: Subscription,
    _resize: Subscription,
}

impl<S: RenderingSurface + Send + 'static> ChartBinding<S> {
    /// Subscribes the chart to `store` updates and `resize` notifications.
    ///
    /// An error raised while reacting to an update (a short record under
    /// cross-validation, a surface failure) halts that update only: it is
    /// logged, retained for [`ChartBinding::take_last_error`], and the
    /// pipeline keeps running.
    pub fn bind(chart: TrialChart<S>, store: &ExperimentStore, resize: &ResizeEvents) -> Self {
        let chart = Arc::new(Mutex::new(chart));
        let last_error: Arc<Mutex<Option<Error>>> = Arc::new(Mutex::new(None));

        let updates = store.subscribe({
            let chart = Arc::clone(&chart);
            let last_error = Arc::clone(&last_error);
            move |record: &TrialRecord| {
                if let Err(error) = chart.lock().observe(record) {
                    trace_warn!("dropping update for trial #{}: {error}", record.trial_no);
                    *last_error.lock() = Some(error);
                }
            }
        });

        let resize_subscription = resize.subscribe({
            let chart = Arc::clone(&chart);
            let last_error = Arc::clone(&last_error);
            move || {
                if let Err(error) = chart.lock().handle_resize() {
                    trace_warn!("resize relayout failed: {error}");
                    *last_error.lock() = Some(error);
                }
            }
        });

        Self {
            chart,
            last_error,
            _updates: updates,
            _resize: resize_subscription,
        }
    }

    /// The bound chart, shared with the subscription callbacks.
    #[must_use]
    pub fn chart(&self) -> &Arc<Mutex<TrialChart<S>>> {
        &self.chart
    }

    /// Takes the most recent update/resize error, if one occurred.
    #[must_use]
    pub fn take_last_error(&self) -> Option<Error> {
        self.last_error.lock().take()
    }

    /// Unmounts the chart without waiting for the binding to drop.
    pub fn unmount(&self) {
        self.chart.lock().unmount();
    }
}

impl<S: RenderingSurface> core::fmt::Debug for ChartBinding<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChartBinding")
            .field("has_error", &self.last_error.lock().is_some())
            .finish()
    }
}
