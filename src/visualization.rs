//! HTML rendering surface.
//!
//! [`HtmlSurface`] implements the surface contract against a self-contained
//! HTML file with embedded [Plotly.js](https://plotly.com/javascript/)
//! traces: every `apply` re-renders the current options into one document
//! and writes it to the bound path. The output opens in any browser; an
//! internet connection is needed on first load to fetch `Plotly.js` from a
//! CDN.
//!
//! The file path plays the role of the drawable region: binding takes the
//! path, `dispose` releases it. `resize` is a no-op (the document lays
//! itself out responsively) and click handlers are accepted but inert,
//! since a static file cannot call back into the process.

use core::fmt::Write as _;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::options::{ChartOptions, Series, SeriesKind, YAxisSlot};
use crate::surface::{ApplyMode, Capability, ClickHandler, LoadingOptions, RenderingSurface};

/// Colors used when rendering the chart document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    /// Page background.
    pub background: String,
    /// Chart panel background.
    pub panel: String,
    /// Text color.
    pub text: String,
    /// Accent color for the subtitle and loading overlay.
    pub accent: String,
}

/// Visual theme for the rendered document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    /// Light background, dark text.
    #[default]
    Default,
    /// Dark background, light text.
    Dark,
    /// Caller-provided palette.
    Custom(ThemePalette),
}

impl Theme {
    fn palette(&self) -> ThemePalette {
        match self {
            Self::Default => ThemePalette {
                background: "#f5f6fa".to_string(),
                panel: "#ffffff".to_string(),
                text: "#2c3e50".to_string(),
                accent: "#7f8c8d".to_string(),
            },
            Self::Dark => ThemePalette {
                background: "#1e272e".to_string(),
                panel: "#2f3640".to_string(),
                text: "#f5f6fa".to_string(),
                accent: "#95a5a6".to_string(),
            },
            Self::Custom(palette) => palette.clone(),
        }
    }
}

/// A rendering surface that writes a Plotly HTML document.
///
/// # Example
///
/// ```no_run
/// use trialview::chart::{ChartProps, TrialChart};
/// use trialview::record::ExperimentConfig;
/// use trialview::{HtmlSurface, Theme};
///
/// let surface = HtmlSurface::bind("trials.html", Theme::Dark);
/// let chart = TrialChart::mount(
///     ExperimentConfig::cross_validated(3),
///     surface,
///     ChartProps::new(),
/// )
/// .unwrap();
/// # drop(chart);
/// ```
pub struct HtmlSurface {
    path: PathBuf,
    palette: ThemePalette,
    capabilities: HashSet<Capability>,
    loading: Option<LoadingOptions>,
    handler: Option<ClickHandler>,
    disposed: bool,
}

impl HtmlSurface {
    /// Binds an output path as this surface's drawable region.
    #[must_use]
    pub fn bind(path: impl Into<PathBuf>, theme: Theme) -> Self {
        Self {
            path: path.into(),
            palette: theme.palette(),
            capabilities: HashSet::new(),
            loading: None,
            handler: None,
            disposed: false,
        }
    }

    /// The bound output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::SurfaceDisposed);
        }
        Ok(())
    }

    fn render(&self, options: &ChartOptions) -> String {
        let mut html = String::with_capacity(8192);
        let palette = &self.palette;
        let n = options.x_axis.labels.len();

        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
         background: {background}; color: {text}; padding: 24px; }}
  h1 {{ text-align: center; margin-bottom: 8px; font-size: 1.8em; }}
  .subtitle {{ text-align: center; color: {accent}; margin-bottom: 24px; }}
  .chart {{ background: {panel}; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.08);
            margin-bottom: 24px; padding: 16px; position: relative; }}
  .loading {{ position: absolute; inset: 0; display: flex; align-items: center;
              justify-content: center; color: {accent}; font-size: 1.2em;
              background: {panel}; opacity: 0.85; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">{n} trials</p>
<div class="chart">{loading}<div id="trials"></div></div>
"#,
            title = escape_html(&options.title),
            background = palette.background,
            text = palette.text,
            accent = palette.accent,
            panel = palette.panel,
            loading = self
                .loading
                .as_ref()
                .map(|opts| format!(
                    r#"<div class="loading" style="color: {}">{}</div>"#,
                    opts.color,
                    escape_html(&opts.text)
                ))
                .unwrap_or_default(),
        );

        self.write_plot_script(&mut html, options);
        html.push_str("</body>\n</html>\n");
        html
    }

    fn write_plot_script(&self, html: &mut String, options: &ChartOptions) {
        let labels: Vec<String> = options
            .x_axis
            .labels
            .iter()
            .map(|label| format!("\"{}\"", escape_js(label)))
            .collect();
        let labels = labels.join(",");

        let mut traces = String::new();
        for series in &options.series {
            write_trace(&mut traces, series, &labels, options.legend.is_some());
        }

        let hovermode = match options.tooltip {
            Some(tooltip) if tooltip.axis_trigger => "\"x unified\"",
            Some(_) => "\"closest\"",
            None => "false",
        };
        let show_legend = options.legend.is_some();
        let display_modebar = options.toolbox.is_some_and(|t| t.save_as_image);
        let reward_title = options
            .series
            .iter()
            .find(|s| s.y_axis == YAxisSlot::Reward)
            .map_or_else(|| "reward".to_string(), |s| s.name.clone());

        let _ = write!(
            html,
            r#"<script>
Plotly.newPlot("trials", [{traces}],
  {{ xaxis: {{ type: "category", categoryorder: "array", categoryarray: [{labels}] }},
     yaxis: {{ title: "{reward_title}" }},
     yaxis2: {{ title: "elapsed [min]", overlaying: "y", side: "right", rangemode: "tozero" }},
     paper_bgcolor: "{panel}", plot_bgcolor: "{panel}",
     font: {{ color: "{text}" }},
     hovermode: {hovermode}, showlegend: {show_legend},
     legend: {{ x: 1, xanchor: "right", y: 1 }}, margin: {{ t: 10 }} }},
   {{ responsive: true, displayModeBar: {display_modebar} }});
</script>
"#,
            reward_title = escape_js(&reward_title),
            panel = self.palette.panel,
            text = self.palette.text,
        );
    }
}

fn write_trace(traces: &mut String, series: &Series, labels: &str, legend: bool) {
    let (trace_type, mode) = match series.kind {
        SeriesKind::Line => ("scatter", r#"mode: "lines+markers","#),
        SeriesKind::Scatter => ("scatter", r#"mode: "markers","#),
        SeriesKind::Bar => ("bar", ""),
    };
    let y_axis = match series.y_axis {
        YAxisSlot::Reward => "y",
        YAxisSlot::Elapsed => "y2",
    };
    let _ = write!(
        traces,
        r#"{{ x: [{labels}], y: {data:?}, type: "{trace_type}", {mode}
       name: "{name}", yaxis: "{y_axis}", showlegend: {legend} }},"#,
        data = &series.data,
        name = escape_js(&series.name),
    );
}

impl RenderingSurface for HtmlSurface {
    fn ensure_capabilities(&mut self, capabilities: &[Capability]) -> Result<()> {
        self.guard()?;
        self.capabilities.extend(capabilities.iter().copied());
        Ok(())
    }

    fn apply(&mut self, options: &ChartOptions, _mode: ApplyMode) -> Result<()> {
        // A fresh document replaces the old one wholesale, so merge/silent
        // make no difference to a static target.
        self.guard()?;
        for capability in options.required_capabilities() {
            if !self.capabilities.contains(&capability) {
                return Err(Error::MissingCapability(capability));
            }
        }
        let html = self.render(options);
        std::fs::write(&self.path, html)?;
        trace_debug!("wrote chart document to {}", self.path.display());
        Ok(())
    }

    fn resize(&mut self) -> Result<()> {
        self.guard()
    }

    fn show_loading(&mut self, options: &LoadingOptions) -> Result<()> {
        self.guard()?;
        self.loading = Some(options.clone());
        Ok(())
    }

    fn hide_loading(&mut self) -> Result<()> {
        self.guard()?;
        self.loading = None;
        Ok(())
    }

    fn set_click_handler(&mut self, handler: Option<ClickHandler>) {
        // Stored for contract parity; a static document never emits clicks.
        self.handler = handler;
    }

    fn dispose(&mut self) -> Result<()> {
        self.disposed = true;
        self.handler = None;
        Ok(())
    }
}

impl core::fmt::Debug for HtmlSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HtmlSurface")
            .field("path", &self.path)
            .field("capabilities", &self.capabilities.len())
            .field("has_handler", &self.handler.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(escape_js("fold \"0\""), "fold \\\"0\\\"");
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn render_includes_series_and_labels() {
        let mut surface = HtmlSurface::bind("unused.html", Theme::Default);
        surface.ensure_capabilities(&Capability::ALL).unwrap();

        let options = ChartOptions {
            title: "auc by trial".to_string(),
            x_axis: crate::options::CategoryAxis {
                labels: vec!["#1".to_string(), "#2".to_string()],
            },
            tooltip: Some(crate::options::Tooltip::axis()),
            legend: Some(crate::options::Legend {
                entries: vec!["auc".to_string(), "elapsed".to_string()],
            }),
            grid: Some(crate::options::Grid::default()),
            toolbox: Some(crate::options::Toolbox::default()),
            series: vec![
                Series::line("auc", vec![0.7, 0.8]),
                Series::bar("elapsed", vec![2.0, 3.0]),
            ],
        };

        let html = surface.render(&options);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("auc by trial"));
        assert!(html.contains("2 trials"));
        assert!(html.contains("\"#1\",\"#2\""));
        assert!(html.contains(r#"type: "bar""#));
        assert!(html.contains("yaxis2"));
        assert!(html.contains(r#"hovermode: "x unified""#));
    }

    #[test]
    fn loading_overlay_rendered_until_hidden() {
        let mut surface = HtmlSurface::bind("unused.html", Theme::Dark);
        surface.ensure_capabilities(&Capability::ALL).unwrap();
        surface.show_loading(&LoadingOptions::default()).unwrap();

        let options = ChartOptions::default();
        assert!(surface.render(&options).contains("class=\"loading\""));

        surface.hide_loading().unwrap();
        assert!(!surface.render(&options).contains("class=\"loading\""));
    }

    #[test]
    fn disposed_surface_rejects_apply() {
        let mut surface = HtmlSurface::bind("unused.html", Theme::Default);
        surface.dispose().unwrap();
        let err = surface
            .apply(&ChartOptions::default(), ApplyMode::REPLACE)
            .unwrap_err();
        assert!(matches!(err, Error::SurfaceDisposed));
    }
}
