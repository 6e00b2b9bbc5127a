#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]

//! Streaming trial-progress charts for hyperparameter search runs. Trial
//! records flow from a feed source through a minimal dispatch/subscribe
//! store into a chart component that accumulates every record seen so far,
//! re-derives its series on each arrival, and replaces the rendered options
//! on a pluggable surface — with zero required feature flags for the common
//! case.
//!
//! # Getting Started
//!
//! Drive a simulated search into an HTML chart:
//!
//! ```no_run
//! use trialview::prelude::*;
//!
//! let config = ExperimentConfig::cross_validated(3);
//! let store = ExperimentStore::new();
//! let resize = ResizeEvents::new();
//!
//! let surface = HtmlSurface::bind("trials.html", Theme::Default);
//! let chart = TrialChart::mount(config, surface, ChartProps::new()).unwrap();
//! let binding = ChartBinding::bind(chart, &store, &resize);
//!
//! let mut feed = SyntheticFeed::new(config, "auc");
//! pump(&mut feed, &store, DEFAULT_INTERVAL, 20);
//! drop(binding); // unsubscribes and releases the surface
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`TrialRecord`] | One observation from a search run: hyper-parameters, per-fold rewards, elapsed seconds. |
//! | [`ExperimentStore`] | Holds only the most recent record; fans accepted updates out to subscribers synchronously. |
//! | [`TrialChart`] | Accumulates every record, derives series, replaces the rendered options on each new `trial_no`. |
//! | [`RenderingSurface`](surface::RenderingSurface) | Where options land — [`HtmlSurface`], a real engine binding, or the [`RecordingSurface`](surface::RecordingSurface) spy. |
//! | [`TrialFeed`](feed::TrialFeed) | A producer of records: live run, [`ReplayFeed`](feed::ReplayFeed), or [`SyntheticFeed`](feed::SyntheticFeed). |
//!
//! # Pipeline
//!
//! ```text
//! feed -> dispatch(Update) -> store -> subscribers -> chart.observe()
//!                                            |            |
//!                                      latest record   append + derive + apply
//! ```
//!
//! Everything on that path runs synchronously within one dispatch: no
//! queuing, no interleaving of updates. The chart reacts only when the
//! incoming `trial_no` differs from the last one it rendered.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public data types, [`Action::from_json`] wire decoding | off |
//! | `async` | [`pump_async`](feed::pump_async) — feed pump on a tokio interval | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key pipeline points | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod chart;
mod error;
mod events;
pub mod feed;
pub mod options;
pub mod record;
pub mod store;
pub mod surface;
mod visualization;

pub use chart::{ChartBinding, ChartProps, TrialChart};
pub use error::{Error, Result};
pub use events::{ResizeEvents, Subscription};
pub use feed::{DEFAULT_INTERVAL, SyntheticFeed, TrialFeed, pump};
pub use options::ChartOptions;
pub use record::{ExperimentConfig, TrialRecord};
pub use store::{Action, ExperimentStore};
pub use surface::RenderingSurface;
pub use visualization::{HtmlSurface, Theme, ThemePalette};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use trialview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chart::{ChartBinding, ChartProps, TrialChart};
    pub use crate::error::{Error, Result};
    pub use crate::events::{ResizeEvents, Subscription};
    #[cfg(feature = "async")]
    pub use crate::feed::pump_async;
    pub use crate::feed::{DEFAULT_INTERVAL, ReplayFeed, SyntheticFeed, TrialFeed, pump};
    pub use crate::options::{ChartOptions, Series, SeriesKind, YAxisSlot};
    pub use crate::record::{
        Direction, ExperimentConfig, FoldModel, Importance, ParamValue, TrialRecord,
    };
    pub use crate::store::{Action, ExperimentStore, StopCondition, StopReason};
    pub use crate::surface::{
        ApplyMode, Capability, ClickEvent, LoadingOptions, RecordingSurface, RenderingSurface,
        SurfaceCall, SurfaceLog,
    };
    pub use crate::visualization::{HtmlSurface, Theme, ThemePalette};
}
