use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::chart::ChartImage;
use crate::domain::opportunity::Opportunity;
use crate::domain::params::{TimeRange, UserType};
use crate::domain::region::Region;

pub const BRAND: &str = "Sauda Food Insights LLC";

const STYLE: &str = "body{font-family:sans-serif;background:#f9f8e8;color:#222;margin:0;padding:24px;}\
h1,h2,h3{color:#2a5d4c;}\
.meta{color:#555;font-size:0.9em;}\
.card{background:#fff;border-left:4px solid #8bc34a;padding:12px 16px;margin:12px 0;}\
table{width:100%;border-collapse:collapse;}\
th,td{border:1px solid #ddd;padding:8px;text-align:left;}\
th{background:#2a5d4c;color:#fff;}\
figure{margin:16px 0;}\
img{max-width:100%;border:1px solid #ddd;background:#fff;}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportParams {
    pub commodity: String,
    pub region: Region,
    pub user_type: UserType,
    pub time_range: TimeRange,
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `{commodity}_{title}_report.html` with whitespace removed.
///
/// Quotes, backslashes, path separators and control characters are dropped too, so the name can
/// be used verbatim in a quoted `Content-Disposition` filename.
pub fn report_filename(commodity: &str, title: &str) -> String {
    format!("{commodity}_{title}_report.html")
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control() && !matches!(*c, '"' | '\\' | '/'))
        .collect()
}

/// Renders a self-contained report. Output depends only on the arguments.
pub fn render_report_html(
    opportunity: &Opportunity,
    params: &ReportParams,
    analysis: &[String],
    charts: &[ChartImage],
    generated_at: DateTime<Utc>,
) -> String {
    let e = escape_html;
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} - {}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        e(BRAND),
        e(&opportunity.title)
    );
    let _ = writeln!(html, "<h1>{}</h1>", e(BRAND));
    let _ = writeln!(html, "<h2>Market Opportunity Report: {}</h2>", e(&opportunity.title));
    let _ = writeln!(
        html,
        "<p class=\"meta\">Generated at {}</p>",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    html.push_str("<h3>Selected Parameters</h3>\n<table>\n");
    for (k, v) in [
        ("Commodity", params.commodity.as_str()),
        ("Region", params.region.name()),
        ("User Type", params.user_type.as_str()),
        ("Time Range", params.time_range.as_str()),
    ] {
        let _ = writeln!(html, "<tr><th>{}</th><td>{}</td></tr>", e(k), e(v));
    }
    html.push_str("</table>\n");

    html.push_str("<h3>Opportunity Summary</h3>\n<div class=\"card\">\n");
    let _ = writeln!(html, "<p>{}</p>", e(&opportunity.description));
    let _ = writeln!(html, "<p><strong>Rationale:</strong> {}</p>", e(&opportunity.rationale));
    let _ = writeln!(
        html,
        "<p><strong>Potential Impact:</strong> {}</p>",
        e(&opportunity.potential_impact)
    );
    let _ = writeln!(html, "<p><strong>Timeline:</strong> {}</p>", e(&opportunity.timeline));
    let _ = writeln!(html, "<p><strong>Risk Level:</strong> {}</p>", opportunity.risk_level);
    html.push_str("</div>\n");

    if !analysis.is_empty() {
        html.push_str("<h3>Market Analysis</h3>\n<ul>\n");
        for sentence in analysis {
            let _ = writeln!(html, "<li>{}</li>", e(sentence));
        }
        html.push_str("</ul>\n");
    }

    if !charts.is_empty() {
        html.push_str("<h3>Charts</h3>\n");
        for chart in charts {
            let _ = writeln!(
                html,
                "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
                e(&chart.data_uri()),
                e(&chart.title),
                e(&chart.title)
            );
        }
    }

    html.push_str("<h3>Contacts</h3>\n<table>\n<tr><th>Name</th><th>Company</th><th>Position</th><th>Location</th><th>Email</th><th>Phone</th></tr>\n");
    for c in &opportunity.contacts {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            e(&c.name),
            e(&c.company),
            e(&c.position),
            e(&c.location),
            e(&c.email),
            e(&c.phone)
        );
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::generate_market_opportunities;
    use chrono::TimeZone;

    fn params() -> ReportParams {
        ReportParams {
            commodity: "Wheat".to_string(),
            region: Region::Asia,
            user_type: UserType::Buyer,
            time_range: TimeRange::TwoYears,
        }
    }

    fn opportunity() -> Opportunity {
        generate_market_opportunities("Wheat", Region::Asia, UserType::Buyer)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn identical_inputs_render_identical_bytes() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        let charts = vec![ChartImage::svg("Prices", "<svg/>")];
        let analysis = vec!["Wheat prices show a stable trend.".to_string()];
        let a = render_report_html(&opportunity(), &params(), &analysis, &charts, at);
        let b = render_report_html(&opportunity(), &params(), &analysis, &charts, at);
        assert_eq!(a, b);
        assert!(a.contains("Generated at 2026-10-18 09:30:00 UTC"));
    }

    #[test]
    fn embeds_charts_inline_and_lists_contacts() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let o = opportunity();
        let html = render_report_html(&o, &params(), &[], &[ChartImage::svg("Prices", "<svg/>")], at);
        assert!(html.contains("src=\"data:image/svg+xml;base64,PHN2Zy8+\""));
        assert!(!html.contains("http://") && !html.contains("https://"));
        for c in &o.contacts {
            assert!(html.contains(&escape_html(&c.email)));
        }
        assert!(!html.contains("Market Analysis"));
    }

    #[test]
    fn user_text_is_escaped() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut o = opportunity();
        o.title = "<script>alert(1)</script>".to_string();
        let html = render_report_html(&o, &params(), &[], &[], at);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn filename_strips_spaces() {
        assert_eq!(
            report_filename("Wheat", "Source Wheat from Brazil"),
            "Wheat_SourceWheatfromBrazil_report.html"
        );
    }

    #[test]
    fn filename_drops_header_unsafe_characters() {
        assert_eq!(
            report_filename("Red \"Hard\" Wheat", "Export a/b to C\\D\u{7}"),
            "RedHardWheat_ExportabtoCD_report.html"
        );
    }
}
