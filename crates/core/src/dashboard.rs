use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::crop_health::{summarize_crop_health, CropHealthThresholds};
use crate::analysis::price::{summarize_price, PriceThresholds};
use crate::analysis::trade_flow::{summarize_trade_flow, TradeFlowThresholds};
use crate::analysis::weather::{summarize_weather, WeatherThresholds};
use crate::domain::commodity::Commodity;
use crate::domain::opportunity::Opportunity;
use crate::domain::params::{AnalysisToggles, TimeRange, UserType};
use crate::domain::region::Region;
use crate::domain::series::{
    CropHealthSeries, PriceSeries, Sourced, TradeFlowSeries, WeatherSeries,
};
use crate::ingest::service::MarketDataService;
use crate::narrative::generate_market_opportunities;
use crate::report::{line_chart_svg, render_report_html, report_filename, ChartImage, LineSeries, ReportParams};

#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub commodity: Commodity,
    pub region: Region,
    pub user_type: UserType,
    pub time_range: TimeRange,
    pub toggles: AnalysisToggles,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub params: ReportParams,
    pub generated_at: DateTime<Utc>,
    pub prices: Option<Sourced<PriceSeries>>,
    pub weather: Option<Sourced<WeatherSeries>>,
    pub crop_health: Option<Sourced<CropHealthSeries>>,
    pub trade_flow: Option<Sourced<TradeFlowSeries>>,
    pub analysis: Vec<String>,
    pub opportunities: Vec<Opportunity>,
    /// Non-fatal notes for the caller, such as which sections used synthetic data.
    pub warnings: Vec<String>,
}

pub async fn build_dashboard(
    service: &MarketDataService,
    req: &DashboardRequest,
    now: DateTime<Utc>,
) -> anyhow::Result<Dashboard> {
    let commodity = &req.commodity;
    let mut analysis = Vec::new();
    let mut warnings = Vec::new();

    let prices = if req.toggles.price {
        let s = service.price_history(commodity, req.time_range, now).await?;
        analysis.push(summarize_price(
            &commodity.name,
            &s.data,
            req.user_type,
            &PriceThresholds::default(),
        ));
        note_origin(&mut warnings, "price", &s);
        Some(s)
    } else {
        None
    };

    let weather = if req.toggles.weather {
        let s = service.weather(req.region, now).await?;
        analysis.push(summarize_weather(
            req.region,
            &s.data,
            req.user_type,
            &WeatherThresholds::default(),
        ));
        note_origin(&mut warnings, "weather", &s);
        Some(s)
    } else {
        None
    };

    let crop_health = if req.toggles.crop_health {
        let s = service.crop_health(req.region, commodity, now).await?;
        analysis.push(summarize_crop_health(
            &commodity.name,
            req.region,
            &s.data,
            req.user_type,
            &CropHealthThresholds::default(),
        ));
        note_origin(&mut warnings, "crop health", &s);
        Some(s)
    } else {
        None
    };

    let trade_flow = if req.toggles.trade_flow {
        let s = service.trade_flow(commodity, req.region, now).await?;
        analysis.push(summarize_trade_flow(
            &commodity.name,
            &s.data,
            req.user_type,
            &TradeFlowThresholds::default(),
        ));
        note_origin(&mut warnings, "trade flow", &s);
        Some(s)
    } else {
        None
    };

    let opportunities = generate_market_opportunities(&commodity.name, req.region, req.user_type);

    tracing::info!(
        commodity = %commodity.name,
        region = %req.region,
        user_type = %req.user_type,
        sections = analysis.len(),
        opportunities = opportunities.len(),
        synthetic_sections = warnings.len(),
        "dashboard built"
    );

    Ok(Dashboard {
        params: ReportParams {
            commodity: commodity.name.clone(),
            region: req.region,
            user_type: req.user_type,
            time_range: req.time_range,
        },
        generated_at: now,
        prices,
        weather,
        crop_health,
        trade_flow,
        analysis,
        opportunities,
        warnings,
    })
}

fn note_origin<T>(warnings: &mut Vec<String>, section: &str, s: &Sourced<T>) {
    if s.is_synthetic() {
        warnings.push(format!(
            "{section} data is simulated because the live source was unavailable"
        ));
    }
}

/// Line charts for every section present in the dashboard.
pub fn dashboard_charts(dashboard: &Dashboard) -> Vec<ChartImage> {
    let commodity = &dashboard.params.commodity;
    let region = dashboard.params.region;
    let mut charts = Vec::new();

    if let Some(p) = &dashboard.prices {
        let title = format!("{commodity} price (close)");
        let dates: Vec<_> = p.data.iter().map(|x| x.date).collect();
        let svg = line_chart_svg(
            &title,
            &dates,
            &[LineSeries::new("Close", p.data.iter().map(|x| x.close).collect())],
        );
        charts.push(ChartImage::svg(title, &svg));
    }
    if let Some(w) = &dashboard.weather {
        let dates: Vec<_> = w.data.iter().map(|x| x.date).collect();
        let title = format!("{region} temperature (°C)");
        let svg = line_chart_svg(
            &title,
            &dates,
            &[LineSeries::new("Temperature", w.data.iter().map(|x| x.temperature).collect())],
        );
        charts.push(ChartImage::svg(title, &svg));

        let title = format!("{region} rainfall (mm)");
        let svg = line_chart_svg(
            &title,
            &dates,
            &[LineSeries::new("Rainfall", w.data.iter().map(|x| x.rainfall).collect())],
        );
        charts.push(ChartImage::svg(title, &svg));
    }
    if let Some(c) = &dashboard.crop_health {
        let dates: Vec<_> = c.data.iter().map(|x| x.date).collect();
        let title = format!("{commodity} crop indices in {region}");
        let svg = line_chart_svg(
            &title,
            &dates,
            &[
                LineSeries::new("NDVI", c.data.iter().map(|x| x.ndvi).collect()),
                LineSeries::new("Soil moisture", c.data.iter().map(|x| x.soil_moisture).collect()),
            ],
        );
        charts.push(ChartImage::svg(title, &svg));

        let title = format!("{commodity} crop stress in {region}");
        let svg = line_chart_svg(
            &title,
            &dates,
            &[LineSeries::new("Crop stress", c.data.iter().map(|x| x.crop_stress).collect())],
        );
        charts.push(ChartImage::svg(title, &svg));
    }
    if let Some(t) = &dashboard.trade_flow {
        let dates: Vec<_> = t.data.iter().map(|x| x.date).collect();
        let title = format!("{commodity} trade volume");
        let svg = line_chart_svg(
            &title,
            &dates,
            &[LineSeries::new("Volume", t.data.iter().map(|x| x.volume).collect())],
        );
        charts.push(ChartImage::svg(title, &svg));
    }

    charts
}

/// Renders the report for opportunity `index`. Returns `(filename, html)`.
pub fn render_dashboard_report(
    dashboard: &Dashboard,
    index: usize,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<(String, String)> {
    let opportunity = dashboard.opportunities.get(index).with_context(|| {
        format!(
            "opportunity index {index} out of range (have {})",
            dashboard.opportunities.len()
        )
    })?;

    let charts = dashboard_charts(dashboard);
    let html = render_report_html(
        opportunity,
        &dashboard.params,
        &dashboard.analysis,
        &charts,
        generated_at,
    );
    let filename = report_filename(&dashboard.params.commodity, &opportunity.title);
    Ok((filename, html))
}
