use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sauda_core::dashboard::{build_dashboard, render_dashboard_report, Dashboard, DashboardRequest};
use sauda_core::domain::commodity::CommodityCatalog;
use sauda_core::domain::opportunity::Opportunity;
use sauda_core::domain::params::{AnalysisToggles, TimeRange, UserType};
use sauda_core::domain::region::Region;
use sauda_core::ingest::provider::{HttpMarketDataSource, MarketDataSource, OfflineSource};
use sauda_core::ingest::service::MarketDataService;
use sauda_core::narrative::generate_market_opportunities;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sauda_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source: Box<dyn MarketDataSource> = match HttpMarketDataSource::from_settings(&settings) {
        Ok(source) => Box::new(source),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "http client setup failed; serving simulated data only");
            Box::new(OfflineSource)
        }
    };

    let state = AppState {
        service: Arc::new(MarketDataService::from_settings(source, &settings)),
        catalog: Arc::new(CommodityCatalog::from_custom(
            settings.custom_commodities.as_deref(),
        )),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/dashboard", get(get_dashboard))
        .route("/opportunities", get(get_opportunities))
        .route("/report", get(get_report))
        .route("/cache/invalidate", post(invalidate_cache))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: Arc<MarketDataService>,
    catalog: Arc<CommodityCatalog>,
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    commodity: String,
    region: String,
    user_type: String,
    time_range: Option<String>,
    price: Option<bool>,
    weather: Option<bool>,
    crop_health: Option<bool>,
    trade_flow: Option<bool>,
    opportunity: Option<usize>,
}

impl DashboardQuery {
    fn to_request(&self, catalog: &CommodityCatalog) -> anyhow::Result<DashboardRequest> {
        let defaults = AnalysisToggles::default();
        Ok(DashboardRequest {
            commodity: catalog.require(&self.commodity)?.clone(),
            region: self.region.parse()?,
            user_type: self.user_type.parse()?,
            time_range: match &self.time_range {
                Some(s) => s.parse()?,
                None => TimeRange::default(),
            },
            toggles: AnalysisToggles {
                price: self.price.unwrap_or(defaults.price),
                weather: self.weather.unwrap_or(defaults.weather),
                crop_health: self.crop_health.unwrap_or(defaults.crop_health),
                trade_flow: self.trade_flow.unwrap_or(defaults.trade_flow),
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpportunitiesQuery {
    commodity: String,
    region: String,
    user_type: String,
}

fn bad_request(e: anyhow::Error) -> (StatusCode, String) {
    tracing::debug!(error = %e, "rejecting request");
    (StatusCode::BAD_REQUEST, format!("{e:#}"))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal error".to_string(),
    )
}

async fn load_dashboard(
    state: &AppState,
    q: &DashboardQuery,
) -> Result<Dashboard, (StatusCode, String)> {
    let req = q.to_request(&state.catalog).map_err(bad_request)?;
    build_dashboard(&state.service, &req, chrono::Utc::now())
        .await
        .map_err(internal)
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, (StatusCode, String)> {
    let dashboard = load_dashboard(&state, &q).await?;
    Ok(Json(dashboard))
}

async fn get_opportunities(
    State(state): State<AppState>,
    Query(q): Query<OpportunitiesQuery>,
) -> Result<Json<Vec<Opportunity>>, (StatusCode, String)> {
    let commodity = state.catalog.require(&q.commodity).map_err(bad_request)?;
    let region: Region = q.region.parse().map_err(bad_request)?;
    let user_type: UserType = q.user_type.parse().map_err(bad_request)?;
    Ok(Json(generate_market_opportunities(
        &commodity.name,
        region,
        user_type,
    )))
}

async fn get_report(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let dashboard = load_dashboard(&state, &q).await?;
    let index = q.opportunity.unwrap_or(0);
    if index >= dashboard.opportunities.len() {
        return Err((
            StatusCode::NOT_FOUND,
            format!("no opportunity at index {index}"),
        ));
    }

    let (filename, html) =
        render_dashboard_report(&dashboard, index, chrono::Utc::now()).map_err(internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        html,
    ))
}

fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

async fn invalidate_cache(State(state): State<AppState>) -> StatusCode {
    state.service.invalidate_cache();
    StatusCode::NO_CONTENT
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &sauda_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(commodity: &str, region: &str, user_type: &str) -> DashboardQuery {
        DashboardQuery {
            commodity: commodity.to_string(),
            region: region.to_string(),
            user_type: user_type.to_string(),
            time_range: None,
            price: Some(false),
            weather: None,
            crop_health: None,
            trade_flow: None,
            opportunity: None,
        }
    }

    #[test]
    fn query_maps_to_request_with_defaults() {
        let req = query("coffee", "europe", "seller")
            .to_request(&CommodityCatalog::default())
            .unwrap();
        assert_eq!(req.commodity.ticker, "KC=F");
        assert_eq!(req.region, Region::Europe);
        assert_eq!(req.user_type, UserType::Seller);
        assert_eq!(req.time_range, TimeRange::TwoYears);
        assert!(!req.toggles.price && req.toggles.weather);
    }

    #[test]
    fn quoted_commodity_names_yield_a_valid_header() {
        let filename = sauda_core::report::report_filename("Red \"Hard\" Wheat", "Export Wheat to Kenya");
        let value = content_disposition(&filename);
        assert_eq!(
            value,
            "attachment; filename=\"RedHardWheat_ExportWheattoKenya_report.html\""
        );
        assert!(axum::http::HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn unknown_values_are_rejected() {
        let catalog = CommodityCatalog::default();
        assert!(query("Unobtainium", "Asia", "Buyer").to_request(&catalog).is_err());
        assert!(query("Wheat", "Mars", "Buyer").to_request(&catalog).is_err());
        assert!(query("Wheat", "Asia", "Broker").to_request(&catalog).is_err());
    }
}
