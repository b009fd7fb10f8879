pub mod chart;
pub mod html;

pub use chart::{line_chart_svg, ChartImage, LineSeries};
pub use html::{render_report_html, report_filename, ReportParams};
