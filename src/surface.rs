//! The rendering-surface contract.
//!
//! A [`RenderingSurface`] is whatever actually draws: a charting engine
//! bound to a screen region, an HTML file writer, or a test spy. The chart
//! component depends on nothing beyond this trait; it takes the surface *by
//! value* at mount, so exclusive ownership of the drawable region is
//! enforced by the type system rather than by convention.
//!
//! # Implementations in this crate
//!
//! | Surface | Target | Notes |
//! |---------|--------|-------|
//! | [`HtmlSurface`](crate::HtmlSurface) | self-contained Plotly HTML file | re-rendered on every apply |
//! | [`RecordingSurface`] | none (headless) | records every call for assertions |

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::options::ChartOptions;

/// A chart-engine feature module.
///
/// Surfaces load capabilities once, idempotently, before first use; applying
/// options that exercise an unregistered capability is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Capability {
    /// Line series.
    Line,
    /// Bar series.
    Bar,
    /// Scatter series.
    Scatter,
    /// Plot grid.
    Grid,
    /// Hover tooltips.
    Tooltip,
    /// Toolbox buttons (save-as-image and friends).
    Toolbox,
    /// Series legend.
    Legend,
}

impl Capability {
    /// Every capability the trial chart uses.
    pub const ALL: [Self; 7] = [
        Self::Line,
        Self::Bar,
        Self::Scatter,
        Self::Grid,
        Self::Tooltip,
        Self::Toolbox,
        Self::Legend,
    ];
}

/// How an `apply` call merges with the previously applied options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyMode {
    /// Merge into the previous options instead of replacing them.
    pub merge: bool,
    /// Skip update animations.
    pub silent: bool,
}

impl ApplyMode {
    /// Non-animated, non-merging full replacement — the only mode the trial
    /// chart ever uses.
    pub const REPLACE: Self = Self {
        merge: false,
        silent: false,
    };
}

/// Appearance of the loading indicator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadingOptions {
    /// Text shown next to the spinner.
    pub text: String,
    /// Spinner color, as a CSS color string.
    pub color: String,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            text: "loading…".to_string(),
            color: "#3498db".to_string(),
        }
    }
}

/// A click on a plotted data point.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickEvent {
    /// Name of the clicked series.
    pub series: String,
    /// Index of the clicked point within the series.
    pub data_index: usize,
    /// Value of the clicked point.
    pub value: f64,
}

/// Callback invoked for each [`ClickEvent`].
pub type ClickHandler = Box<dyn FnMut(&ClickEvent) + Send>;

/// A drawing target for [`ChartOptions`].
///
/// The contract mirrors a declarative charting engine: register feature
/// modules, replace the rendered options wholesale, relayout on resize,
/// toggle a loading indicator, and release the region on `dispose`. All
/// operations after `dispose` fail with [`Error::SurfaceDisposed`].
pub trait RenderingSurface {
    /// Registers chart-engine feature modules. Idempotent; registering a
    /// capability twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceDisposed`] after `dispose`.
    fn ensure_capabilities(&mut self, capabilities: &[Capability]) -> Result<()>;

    /// Replaces the rendered options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapability`] when `options` exercise a
    /// capability that was never registered, or
    /// [`Error::SurfaceDisposed`] after `dispose`.
    fn apply(&mut self, options: &ChartOptions, mode: ApplyMode) -> Result<()>;

    /// Re-lays-out the surface after its region changed size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceDisposed`] after `dispose`.
    fn resize(&mut self) -> Result<()>;

    /// Shows the loading indicator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceDisposed`] after `dispose`.
    fn show_loading(&mut self, options: &LoadingOptions) -> Result<()>;

    /// Hides the loading indicator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SurfaceDisposed`] after `dispose`.
    fn hide_loading(&mut self) -> Result<()>;

    /// Installs (or clears) the click handler.
    fn set_click_handler(&mut self, handler: Option<ClickHandler>);

    /// Releases the drawable region and any engine buffers bound to it.
    ///
    /// # Errors
    ///
    /// Implementation-specific; callers on teardown paths log and continue.
    fn dispose(&mut self) -> Result<()>;
}

/// One recorded surface invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    /// `ensure_capabilities` with the requested set.
    Register(Vec<Capability>),
    /// `apply` with a full copy of the options.
    Apply(ChartOptions, ApplyMode),
    /// `resize`.
    Resize,
    /// `show_loading`.
    ShowLoading(LoadingOptions),
    /// `hide_loading`.
    HideLoading,
    /// `dispose`.
    Dispose,
}

/// Shared, cloneable view of a [`RecordingSurface`]'s call log.
///
/// Keep a clone before handing the surface to a chart; the log stays
/// readable after the surface itself has been consumed.
#[derive(Clone, Default)]
pub struct SurfaceLog {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl SurfaceLog {
    fn push(&self, call: SurfaceCall) {
        self.calls.lock().push(call);
    }

    /// A copy of every recorded call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    /// Number of `apply` calls recorded so far.
    #[must_use]
    pub fn apply_count(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Apply(..)))
    }

    /// Number of `resize` calls recorded so far.
    #[must_use]
    pub fn resize_count(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Resize))
    }

    /// Number of `dispose` calls recorded so far.
    #[must_use]
    pub fn dispose_count(&self) -> usize {
        self.count(|call| matches!(call, SurfaceCall::Dispose))
    }

    /// The options passed to the most recent `apply`, if any.
    #[must_use]
    pub fn last_options(&self) -> Option<ChartOptions> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            SurfaceCall::Apply(options, _) => Some(options.clone()),
            _ => None,
        })
    }

    fn count(&self, predicate: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }
}

impl core::fmt::Debug for SurfaceLog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SurfaceLog")
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

/// A headless surface that records every call.
///
/// Built for tests — the spy behind the teardown and update-count
/// assertions — but usable anywhere a chart should run without drawing.
/// `fail_dispose` turns the next `dispose` into an error to exercise
/// teardown-warning paths.
#[derive(Default)]
pub struct RecordingSurface {
    log: SurfaceLog,
    capabilities: HashSet<Capability>,
    handler: Option<ClickHandler>,
    disposed: bool,
    fail_dispose: bool,
}

impl RecordingSurface {
    /// Creates a surface with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared handle onto this surface's call log.
    #[must_use]
    pub fn log(&self) -> SurfaceLog {
        self.log.clone()
    }

    /// Makes every subsequent `dispose` fail.
    pub fn fail_dispose(&mut self) {
        self.fail_dispose = true;
    }

    /// Feeds a synthetic click into the installed handler, as the real
    /// engine would on a pointer event.
    pub fn emit_click(&mut self, event: &ClickEvent) {
        if let Some(handler) = &mut self.handler {
            handler(event);
        }
    }

    fn guard(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::SurfaceDisposed);
        }
        Ok(())
    }
}

impl RenderingSurface for RecordingSurface {
    fn ensure_capabilities(&mut self, capabilities: &[Capability]) -> Result<()> {
        self.guard()?;
        self.capabilities.extend(capabilities.iter().copied());
        self.log.push(SurfaceCall::Register(capabilities.to_vec()));
        Ok(())
    }

    fn apply(&mut self, options: &ChartOptions, mode: ApplyMode) -> Result<()> {
        self.guard()?;
        for capability in options.required_capabilities() {
            if !self.capabilities.contains(&capability) {
                return Err(Error::MissingCapability(capability));
            }
        }
        self.log.push(SurfaceCall::Apply(options.clone(), mode));
        Ok(())
    }

    fn resize(&mut self) -> Result<()> {
        self.guard()?;
        self.log.push(SurfaceCall::Resize);
        Ok(())
    }

    fn show_loading(&mut self, options: &LoadingOptions) -> Result<()> {
        self.guard()?;
        self.log.push(SurfaceCall::ShowLoading(options.clone()));
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<()> {
        self.guard()?;
        self.log.push(SurfaceCall::HideLoading);
        Ok(())
    }

    fn set_click_handler(&mut self, handler: Option<ClickHandler>) {
        self.handler = handler;
    }

    fn dispose(&mut self) -> Result<()> {
        self.disposed = true;
        if self.fail_dispose {
            return Err(Error::SurfaceDisposed);
        }
        self.log.push(SurfaceCall::Dispose);
        Ok(())
    }
}

impl core::fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("capabilities", &self.capabilities)
            .field("disposed", &self.disposed)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
