//! Chart capability.
//!
//! The controllers only shape data; drawing goes through [`ChartRenderer`],
//! which hands back a disposable [`ChartHandle`] per canvas.
//! [`TextChartRenderer`] draws horizontal bars for the terminal.

use crate::errors::AppError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Canvas {
    Country,
    Device,
    Hourly,
    Referrer,
}

impl Canvas {
    pub const ALL: [Canvas; 4] = [
        Canvas::Country,
        Canvas::Device,
        Canvas::Hourly,
        Canvas::Referrer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Canvas::Country => "Clicks by Country",
            Canvas::Device => "Clicks by Device",
            Canvas::Hourly => "Clicks by Hour",
            Canvas::Referrer => "Top Referrers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Donut,
    Pie,
    Line,
    Bar,
}

impl ChartKind {
    pub fn is_proportional(self) -> bool {
        matches!(self, ChartKind::Donut | ChartKind::Pie)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

impl Series {
    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<(Vec<String>, Vec<u64>)> for Series {
    fn from((labels, values): (Vec<String>, Vec<u64>)) -> Self {
        Series { labels, values }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartOptions {
    /// One entry per point; empty hides the legend.
    pub legend: Vec<String>,
    /// One entry per point; empty falls back to the renderer default.
    pub tooltips: Vec<String>,
    pub cutout_percent: Option<u8>,
    pub fill: bool,
}

pub trait ChartHandle: fmt::Debug + Send {
    /// Releases the drawing. Called before a canvas is reused.
    fn dispose(&mut self);

    /// Text snapshot, for renderers that draw to a terminal.
    fn text(&self) -> Option<String> {
        None
    }
}

pub trait ChartRenderer: Send {
    fn render(
        &mut self,
        canvas: Canvas,
        kind: ChartKind,
        series: &Series,
        options: &ChartOptions,
    ) -> Result<Box<dyn ChartHandle>, AppError>;
}

#[derive(Debug, Clone)]
pub struct TextChartRenderer {
    width: usize,
}

impl TextChartRenderer {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1) }
    }

    fn bar(&self, value: u64, scale: u64) -> String {
        if scale == 0 {
            return String::new();
        }
        let cells = (value as f64 / scale as f64 * self.width as f64).round() as usize;
        "█".repeat(cells.min(self.width))
    }
}

impl Default for TextChartRenderer {
    fn default() -> Self {
        Self::new(30)
    }
}

impl ChartRenderer for TextChartRenderer {
    fn render(
        &mut self,
        canvas: Canvas,
        kind: ChartKind,
        series: &Series,
        options: &ChartOptions,
    ) -> Result<Box<dyn ChartHandle>, AppError> {
        if series.labels.len() != series.values.len() {
            return Err(AppError::render(format!(
                "{}: {} labels for {} values",
                canvas.title(),
                series.labels.len(),
                series.values.len()
            )));
        }

        let scale = if kind.is_proportional() {
            series.total()
        } else {
            series.values.iter().copied().max().unwrap_or(0)
        };
        let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(series.len());
        for (i, (label, value)) in series.labels.iter().zip(&series.values).enumerate() {
            let bar = self.bar(*value, scale);
            let detail = options
                .tooltips
                .get(i)
                .cloned()
                .unwrap_or_else(|| value.to_string());
            lines.push(format!("{label:>label_width$} │{bar:<w$} {detail}", w = self.width));
        }

        Ok(Box::new(TextChart {
            lines,
            disposed: false,
        }))
    }
}

#[derive(Debug)]
pub struct TextChart {
    lines: Vec<String>,
    disposed: bool,
}

impl ChartHandle for TextChart {
    fn dispose(&mut self) {
        self.lines.clear();
        self.disposed = true;
    }

    fn text(&self) -> Option<String> {
        (!self.disposed).then(|| self.lines.join("\n"))
    }
}
