use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::html::escape_html;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 320.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 48.0;

const PALETTE: [&str; 4] = ["#2a5d4c", "#8bc34a", "#4fc3f7", "#e07a5f"];

/// A pre-rendered chart, already base64-encoded for inline embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    pub title: String,
    pub mime_type: String,
    pub base64_data: String,
}

impl ChartImage {
    pub fn from_bytes(title: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            title: title.into(),
            mime_type: mime_type.into(),
            base64_data: STANDARD.encode(bytes),
        }
    }

    pub fn svg(title: impl Into<String>, svg: &str) -> Self {
        Self::from_bytes(title, "image/svg+xml", svg.as_bytes())
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_data)
    }
}

#[derive(Debug, Clone)]
pub struct LineSeries<'a> {
    pub label: &'a str,
    pub values: Vec<f64>,
}

impl<'a> LineSeries<'a> {
    pub fn new(label: &'a str, values: Vec<f64>) -> Self {
        Self { label, values }
    }
}

/// Renders one or more series sharing an x axis as a standalone SVG document.
///
/// All series share a single y scale. A flat range is drawn at mid-height.
pub fn line_chart_svg(title: &str, dates: &[NaiveDate], series: &[LineSeries<'_>]) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let finite = || series.iter().flat_map(|s| s.values.iter().copied()).filter(|v| v.is_finite());
    let min = finite().fold(f64::INFINITY, f64::min);
    let max = finite().fold(f64::NEG_INFINITY, f64::max);
    let has_data = min.is_finite() && max.is_finite();

    let y_of = |v: f64| -> f64 {
        if !has_data || max - min < f64::EPSILON {
            MARGIN_TOP + plot_h / 2.0
        } else {
            MARGIN_TOP + plot_h * (1.0 - (v - min) / (max - min))
        }
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    );
    let _ = write!(svg, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
    let _ = write!(
        svg,
        r##"<text x="{}" y="24" font-size="16" fill="#2a5d4c">{}</text>"##,
        MARGIN_LEFT,
        escape_html(title)
    );
    let _ = write!(
        svg,
        r##"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="#cccccc"/>"##
    );

    if has_data {
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" text-anchor="end" fill="#555555">{:.2}</text>"##,
            MARGIN_LEFT - 6.0,
            MARGIN_TOP + 4.0,
            max
        );
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" text-anchor="end" fill="#555555">{:.2}</text>"##,
            MARGIN_LEFT - 6.0,
            MARGIN_TOP + plot_h,
            min
        );
    }

    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        let _ = write!(
            svg,
            r##"<text x="{MARGIN_LEFT}" y="{}" fill="#555555">{first}</text>"##,
            HEIGHT - MARGIN_BOTTOM + 18.0
        );
        let _ = write!(
            svg,
            r##"<text x="{}" y="{}" text-anchor="end" fill="#555555">{last}</text>"##,
            WIDTH - MARGIN_RIGHT,
            HEIGHT - MARGIN_BOTTOM + 18.0
        );
    }

    for (idx, s) in series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        let n = s.values.len();
        let step = if n > 1 { plot_w / (n - 1) as f64 } else { 0.0 };
        let points: Vec<String> = s
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, v)| format!("{:.1},{:.1}", MARGIN_LEFT + step * i as f64, y_of(*v)))
            .collect();
        if !points.is_empty() {
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{color}" stroke-width="2" points="{}"/>"#,
                points.join(" ")
            );
        }
        let legend_x = MARGIN_LEFT + 140.0 * idx as f64;
        let legend_y = HEIGHT - 10.0;
        let _ = write!(
            svg,
            r#"<rect x="{legend_x}" y="{}" width="10" height="10" fill="{color}"/><text x="{}" y="{legend_y}">{}</text>"#,
            legend_y - 9.0,
            legend_x + 14.0,
            escape_html(s.label)
        );
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        (0..n).map(|i| start + chrono::Duration::days(30 * i as i64)).collect()
    }

    #[test]
    fn draws_one_polyline_per_series() {
        let svg = line_chart_svg(
            "Weather",
            &dates(3),
            &[
                LineSeries::new("Temperature", vec![1.0, 2.0, 3.0]),
                LineSeries::new("Rainfall", vec![3.0, 2.0, 1.0]),
            ],
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("2025-01-31"));
    }

    #[test]
    fn flat_series_is_drawn_at_mid_height() {
        let svg = line_chart_svg("Flat", &dates(2), &[LineSeries::new("x", vec![5.0, 5.0])]);
        let mid = MARGIN_TOP + (HEIGHT - MARGIN_TOP - MARGIN_BOTTOM) / 2.0;
        assert!(svg.contains(&format!("{:.1},{:.1}", MARGIN_LEFT, mid)));
    }

    #[test]
    fn empty_input_still_renders_a_frame() {
        let svg = line_chart_svg("Nothing", &[], &[]);
        assert!(svg.contains("Nothing"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn chart_image_builds_a_data_uri() {
        let img = ChartImage::svg("t", "<svg/>");
        assert_eq!(img.mime_type, "image/svg+xml");
        assert_eq!(img.data_uri(), "data:image/svg+xml;base64,PHN2Zy8+");
    }

    #[test]
    fn titles_are_escaped() {
        let svg = line_chart_svg("A & B <C>", &[], &[]);
        assert!(svg.contains("A &amp; B &lt;C&gt;"));
    }
}
