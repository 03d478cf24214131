//! Rendering collaborator: turns a registered view into image bytes.

use std::collections::HashMap;
use std::fmt::Write;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::analyzers::types::MergedRecord;
use crate::error::SnapshotError;

/// Produces an image of a named visual region.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn rasterize(&self, view: &str) -> Result<Bytes, SnapshotError>;

    /// File extension of the produced image, without the dot.
    fn extension(&self) -> &'static str;
}

/// Contents of one comparison chart.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub title: String,
    pub first_label: String,
    pub second_label: String,
    pub series: Vec<MergedRecord>,
}

const HEIGHT: f64 = 480.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 90.0;
const MARGIN_SIDE: f64 = 50.0;
const GROUP_WIDTH: f64 = 90.0;
const BAR_WIDTH: f64 = 32.0;
const FIRST_FILL: &str = "#8884d8";
const SECOND_FILL: &str = "#82ca9d";

/// Draws registered comparison series as grouped SVG bar charts.
#[derive(Debug, Default)]
pub struct SvgChartRenderer {
    views: HashMap<String, ChartView>,
}

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the chart shown under `view`.
    pub fn register(&mut self, view: impl Into<String>, chart: ChartView) {
        self.views.insert(view.into(), chart);
    }

    fn draw(chart: &ChartView) -> Result<String, std::fmt::Error> {
        let n = chart.series.len() as f64;
        let width = MARGIN_SIDE * 2.0 + GROUP_WIDTH * n;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = HEIGHT - MARGIN_BOTTOM;

        let max = chart
            .series
            .iter()
            .flat_map(|r| [r.first, r.second])
            .fold(0.0_f64, f64::max);
        let scale = if max > 0.0 { plot_height / max } else { 0.0 };

        let mut svg = String::new();
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{HEIGHT}""#
        )?;
        writeln!(
            svg,
            r#" viewBox="0 0 {width} {HEIGHT}" font-family="sans-serif">"#
        )?;
        writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            svg,
            r#"<text x="{}" y="28" text-anchor="middle" font-size="18">{}</text>"#,
            width / 2.0,
            escape(&chart.title)
        )?;
        writeln!(
            svg,
            r##"<line x1="{MARGIN_SIDE}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="#333"/>"##,
            width - MARGIN_SIDE
        )?;

        for (i, record) in chart.series.iter().enumerate() {
            let group_x = MARGIN_SIDE + GROUP_WIDTH * i as f64;
            let bars = [
                (record.first, FIRST_FILL, 0.0),
                (record.second, SECOND_FILL, BAR_WIDTH),
            ];
            for (value, fill, offset) in bars {
                let h = (value * scale).max(0.0);
                let x = group_x + (GROUP_WIDTH - 2.0 * BAR_WIDTH) / 2.0 + offset;
                writeln!(
                    svg,
                    r#"<rect x="{x}" y="{}" width="{BAR_WIDTH}" height="{h}" fill="{fill}"/>"#,
                    baseline - h
                )?;
                writeln!(
                    svg,
                    r#"<text x="{}" y="{}" text-anchor="middle" font-size="10">{value}</text>"#,
                    x + BAR_WIDTH / 2.0,
                    baseline - h - 4.0
                )?;
            }
            writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" font-size="11">{}</text>"#,
                group_x + GROUP_WIDTH / 2.0,
                baseline + 18.0,
                escape(&record.field)
            )?;
        }

        let legend_y = HEIGHT - 30.0;
        for (i, (label, fill)) in [
            (&chart.first_label, FIRST_FILL),
            (&chart.second_label, SECOND_FILL),
        ]
        .into_iter()
        .enumerate()
        {
            let x = MARGIN_SIDE + 220.0 * i as f64;
            writeln!(
                svg,
                r#"<rect x="{x}" y="{}" width="12" height="12" fill="{fill}"/>"#,
                legend_y - 10.0
            )?;
            writeln!(
                svg,
                r#"<text x="{}" y="{legend_y}" font-size="12">{}</text>"#,
                x + 18.0,
                escape(label)
            )?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}

#[async_trait]
impl Renderer for SvgChartRenderer {
    async fn rasterize(&self, view: &str) -> Result<Bytes, SnapshotError> {
        let chart = self
            .views
            .get(view)
            .ok_or_else(|| SnapshotError::RegionNotFound {
                view: view.to_string(),
            })?;

        if chart.series.is_empty() {
            return Err(SnapshotError::RenderFailed {
                reason: format!("view `{view}` has no fields to draw"),
            });
        }

        let svg = Self::draw(chart).map_err(|e| SnapshotError::RenderFailed {
            reason: e.to_string(),
        })?;
        debug!(view, bytes = svg.len(), "Chart rendered");
        Ok(Bytes::from(svg))
    }

    fn extension(&self) -> &'static str {
        "svg"
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
