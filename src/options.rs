//! Declarative chart options.
//!
//! [`ChartOptions`] is the full description of what the chart should look
//! like after an update: category axis labels, the reward series (line or
//! scatter), the elapsed-minutes bar series, and the feature blocks
//! (tooltip, legend, grid, toolbox). It is rebuilt from scratch from the
//! accumulated trial history on every update and pushed to the rendering
//! surface as a whole — never patched incrementally.

use crate::surface::Capability;

/// How a series is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SeriesKind {
    /// Connected line with point markers.
    Line,
    /// Vertical bars.
    Bar,
    /// Unconnected point markers.
    Scatter,
}

impl SeriesKind {
    /// The surface capability this kind requires.
    #[must_use]
    pub fn capability(self) -> Capability {
        match self {
            Self::Line => Capability::Line,
            Self::Bar => Capability::Bar,
            Self::Scatter => Capability::Scatter,
        }
    }
}

/// Which value axis a series is plotted against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum YAxisSlot {
    /// Left axis: the reward metric.
    Reward,
    /// Right axis: elapsed minutes.
    Elapsed,
}

/// One plotted series.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Series {
    /// Draw style.
    pub kind: SeriesKind,
    /// Legend label.
    pub name: String,
    /// One value per trial, in history order.
    pub data: Vec<f64>,
    /// Which value axis the data belongs to.
    pub y_axis: YAxisSlot,
}

impl Series {
    /// A reward-axis line series.
    #[must_use]
    pub fn line(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            kind: SeriesKind::Line,
            name: name.into(),
            data,
            y_axis: YAxisSlot::Reward,
        }
    }

    /// A reward-axis scatter series.
    #[must_use]
    pub fn scatter(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            kind: SeriesKind::Scatter,
            name: name.into(),
            data,
            y_axis: YAxisSlot::Reward,
        }
    }

    /// An elapsed-axis bar series.
    #[must_use]
    pub fn bar(name: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            kind: SeriesKind::Bar,
            name: name.into(),
            data,
            y_axis: YAxisSlot::Elapsed,
        }
    }
}

/// The category axis: one `"#<trialNo>"` label per accumulated trial.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CategoryAxis {
    /// Axis labels, in history order.
    pub labels: Vec<String>,
}

/// Tooltip feature block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Tooltip {
    /// Show values for the whole hovered category rather than a single
    /// point.
    pub axis_trigger: bool,
}

impl Tooltip {
    /// Tooltip following the hovered trial column.
    #[must_use]
    pub fn axis() -> Self {
        Self { axis_trigger: true }
    }
}

/// Legend feature block.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Legend {
    /// Entries, one per series, in series order.
    pub entries: Vec<String>,
}

/// Grid feature block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Grid {
    /// Reserve room for axis labels inside the plot rectangle.
    pub contain_labels: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self { contain_labels: true }
    }
}

/// Toolbox feature block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Toolbox {
    /// Offer a save-as-image button.
    pub save_as_image: bool,
}

impl Default for Toolbox {
    fn default() -> Self {
        Self { save_as_image: true }
    }
}

/// A complete, immutable-per-render chart description.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChartOptions {
    /// Chart title, derived from the reward metric.
    pub title: String,
    /// Category axis over trial numbers.
    pub x_axis: CategoryAxis,
    /// Tooltip block, when the tooltip capability is wanted.
    pub tooltip: Option<Tooltip>,
    /// Legend block, when the legend capability is wanted.
    pub legend: Option<Legend>,
    /// Grid block, when the grid capability is wanted.
    pub grid: Option<Grid>,
    /// Toolbox block, when the toolbox capability is wanted.
    pub toolbox: Option<Toolbox>,
    /// All plotted series.
    pub series: Vec<Series>,
}

impl ChartOptions {
    /// True when every series has exactly one value per axis label.
    ///
    /// This is the render-time invariant: series lengths and the category
    /// axis always match the accumulated history.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let n = self.x_axis.labels.len();
        self.series.iter().all(|s| s.data.len() == n)
    }

    /// Capabilities this options structure exercises.
    #[must_use]
    pub fn required_capabilities(&self) -> Vec<Capability> {
        let mut needed = Vec::new();
        for series in &self.series {
            let capability = series.kind.capability();
            if !needed.contains(&capability) {
                needed.push(capability);
            }
        }
        if self.tooltip.is_some() {
            needed.push(Capability::Tooltip);
        }
        if self.legend.is_some() {
            needed.push(Capability::Legend);
        }
        if self.grid.is_some() {
            needed.push(Capability::Grid);
        }
        if self.toolbox.is_some() {
            needed.push(Capability::Toolbox);
        }
        needed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_checks_every_series() {
        let options = ChartOptions {
            title: "auc by trial".to_string(),
            x_axis: CategoryAxis {
                labels: vec!["#1".to_string(), "#2".to_string()],
            },
            series: vec![
                Series::line("auc", vec![0.7, 0.8]),
                Series::bar("elapsed", vec![2.0, 3.0]),
            ],
            ..ChartOptions::default()
        };
        assert!(options.is_consistent());

        let mut broken = options;
        broken.series[1].data.pop();
        assert!(!broken.is_consistent());
    }

    #[test]
    fn required_capabilities_cover_series_and_blocks() {
        let options = ChartOptions {
            tooltip: Some(Tooltip::axis()),
            legend: Some(Legend::default()),
            series: vec![Series::scatter("fold 0", vec![])],
            ..ChartOptions::default()
        };
        let needed = options.required_capabilities();
        assert!(needed.contains(&Capability::Scatter));
        assert!(needed.contains(&Capability::Tooltip));
        assert!(needed.contains(&Capability::Legend));
        assert!(!needed.contains(&Capability::Bar));
    }
}
