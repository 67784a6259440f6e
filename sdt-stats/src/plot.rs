//! Presentation hook for ROC curves.
//!
//! [`RocPlot`] carries the sorted rate sequences exactly as
//! [`RocAggregator::sorted_roc_points`](crate::roc::RocAggregator::sorted_roc_points)
//! returned them, together with the chance diagonal. Any [`RocRenderer`] can
//! draw it; [`SvgRenderer`] writes a standalone SVG document.

use std::fmt::Write as _;
use std::io::Write;

use sdt_core::{Result, SdtError};

/// Chance-level reference line, from `(0, 0)` to `(1, 1)`.
pub const REFERENCE_LINE: [(f64, f64); 2] = [(0.0, 0.0), (1.0, 1.0)];

/// Borrowed ROC curve ready for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RocPlot<'a> {
    false_alarm_rates: &'a [f64],
    hit_rates: &'a [f64],
}

impl<'a> RocPlot<'a> {
    /// Pair up the two rate sequences.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequences are empty or differ in length.
    pub fn new(false_alarm_rates: &'a [f64], hit_rates: &'a [f64]) -> Result<Self> {
        if false_alarm_rates.is_empty() {
            return Err(SdtError::InvalidInput("RocPlot: empty input".into()));
        }
        if false_alarm_rates.len() != hit_rates.len() {
            return Err(SdtError::InvalidInput(format!(
                "RocPlot: false_alarm_rates length {} != hit_rates length {}",
                false_alarm_rates.len(),
                hit_rates.len()
            )));
        }
        Ok(Self {
            false_alarm_rates,
            hit_rates,
        })
    }

    pub fn false_alarm_rates(&self) -> &'a [f64] {
        self.false_alarm_rates
    }

    pub fn hit_rates(&self) -> &'a [f64] {
        self.hit_rates
    }

    /// `(false_alarm_rate, hit_rate)` pairs in curve order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.false_alarm_rates
            .iter()
            .copied()
            .zip(self.hit_rates.iter().copied())
    }

    /// The chance diagonal drawn alongside the curve.
    pub fn reference_line(&self) -> [(f64, f64); 2] {
        REFERENCE_LINE
    }
}

/// A consumer that draws ROC curves.
pub trait RocRenderer {
    /// Draw `plot`. With `show` set the chart is emitted immediately,
    /// otherwise the renderer may hold it until asked.
    fn render(&mut self, plot: &RocPlot<'_>, show: bool) -> Result<()>;
}

// ── SVG ────────────────────────────────────────────────────────────────────

/// Layout settings for [`SvgRenderer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SvgStyle {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Space between canvas edge and plot area, in pixels.
    pub margin: u32,
    /// Chart title.
    pub title: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
            margin: 48,
            title: "ROC Curve".into(),
        }
    }
}

impl SvgStyle {
    fn validate(&self) -> Result<()> {
        let inner = 2 * u64::from(self.margin);
        if u64::from(self.width) <= inner || u64::from(self.height) <= inner {
            return Err(SdtError::InvalidInput(format!(
                "SvgStyle: {}x{} canvas leaves no plot area with margin {}",
                self.width, self.height, self.margin
            )));
        }
        Ok(())
    }
}

/// Render `plot` as a standalone SVG document.
pub fn render_svg(plot: &RocPlot<'_>, style: &SvgStyle) -> String {
    let w = f64::from(style.width);
    let h = f64::from(style.height);
    let m = f64::from(style.margin);
    let px = |x: f64| m + x * (w - 2.0 * m);
    let py = |y: f64| h - m - y * (h - 2.0 * m);

    let mut curve = String::new();
    for (i, (x, y)) in plot.points().enumerate() {
        if i > 0 {
            curve.push(' ');
        }
        let _ = write!(curve, "{:.3},{:.3}", px(x), py(y));
    }

    let [(x0, y0), (x1, y1)] = plot.reference_line();
    let title = escape_xml(&style.title);

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = style.width,
        h = style.height,
    );
    let _ = write!(svg, "<title>{}</title>", title);
    let _ = write!(
        svg,
        "<rect x=\"{m}\" y=\"{m}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"none\" stroke=\"black\" />",
        w - 2.0 * m,
        h - 2.0 * m,
    );
    let _ = write!(
        svg,
        "<line x1=\"{:.3}\" y1=\"{:.3}\" x2=\"{:.3}\" y2=\"{:.3}\" stroke=\"black\" stroke-dasharray=\"4 4\" />",
        px(x0),
        py(y0),
        px(x1),
        py(y1),
    );
    let _ = write!(
        svg,
        "<polyline fill=\"none\" stroke=\"steelblue\" stroke-width=\"2\" points=\"{}\" />",
        curve
    );
    let _ = write!(
        svg,
        "<text x=\"{:.3}\" y=\"{:.3}\" text-anchor=\"middle\">{}</text>",
        w / 2.0,
        m / 2.0,
        title
    );
    let _ = write!(
        svg,
        "<text x=\"{:.3}\" y=\"{:.3}\" text-anchor=\"middle\">False Alarm Rate</text>",
        w / 2.0,
        h - m / 4.0
    );
    let _ = write!(
        svg,
        "<text transform=\"translate({:.3},{:.3}) rotate(-90)\" text-anchor=\"middle\">Hit Rate</text>",
        m / 3.0,
        h / 2.0
    );
    let _ = write!(
        svg,
        "<text x=\"{:.3}\" y=\"{:.3}\" fill=\"steelblue\">ROC Curve</text>\
         <text x=\"{:.3}\" y=\"{:.3}\">Random Guess</text>",
        px(0.6),
        py(0.2),
        px(0.6),
        py(0.1)
    );
    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Writes ROC curves as SVG documents to a sink.
///
/// `render(.., true)` writes at once; `render(.., false)` queues the
/// document until [`flush`](Self::flush).
#[derive(Debug)]
pub struct SvgRenderer<W: Write> {
    out: W,
    style: SvgStyle,
    pending: Vec<String>,
}

impl<W: Write> SvgRenderer<W> {
    /// Renderer with the default [`SvgStyle`].
    pub fn new(out: W) -> Self {
        Self {
            out,
            style: SvgStyle::default(),
            pending: Vec::new(),
        }
    }

    /// Renderer with a custom style.
    ///
    /// # Errors
    ///
    /// Returns an error if the margins leave no room for the plot area.
    pub fn with_style(out: W, style: SvgStyle) -> Result<Self> {
        style.validate()?;
        Ok(Self {
            out,
            style,
            pending: Vec::new(),
        })
    }

    pub fn style(&self) -> &SvgStyle {
        &self.style
    }

    /// Documents rendered with `show == false` and not yet written.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Write all queued documents, returning how many were written.
    pub fn flush(&mut self) -> Result<usize> {
        let n = self.pending.len();
        for doc in self.pending.drain(..) {
            self.out.write_all(doc.as_bytes())?;
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(n)
    }

    /// Recover the sink. Queued documents are dropped.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RocRenderer for SvgRenderer<W> {
    fn render(&mut self, plot: &RocPlot<'_>, show: bool) -> Result<()> {
        self.pending.push(render_svg(plot, &self.style));
        if show {
            self.flush()?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
