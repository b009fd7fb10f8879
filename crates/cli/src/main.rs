use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sauda_core::dashboard::{build_dashboard, render_dashboard_report, DashboardRequest};
use sauda_core::domain::commodity::CommodityCatalog;
use sauda_core::domain::params::{AnalysisToggles, TimeRange, UserType};
use sauda_core::domain::region::Region;
use sauda_core::ingest::provider::{HttpMarketDataSource, MarketDataSource, OfflineSource};
use sauda_core::ingest::service::MarketDataService;

#[derive(Debug, Parser)]
#[command(name = "sauda_cli", about = "Build a market opportunity report as a standalone HTML file")]
struct Args {
    /// Commodity name or ticker from the catalog (e.g. Wheat, ZC=F).
    #[arg(long, default_value = "Wheat")]
    commodity: String,

    /// Home region; opportunities are sought in the other regions.
    #[arg(long, default_value = "North America")]
    region: String,

    /// Buyer or Seller.
    #[arg(long, default_value = "Buyer")]
    user_type: String,

    /// Price history window: 1y, 2y or 5y.
    #[arg(long, default_value = "2y")]
    time_range: String,

    /// Which generated opportunity to report on (0-based).
    #[arg(long, default_value_t = 0)]
    opportunity: usize,

    /// Directory the HTML report is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip live providers and use simulated data throughout.
    #[arg(long)]
    offline: bool,

    #[arg(long)]
    skip_price: bool,

    #[arg(long)]
    skip_weather: bool,

    #[arg(long)]
    skip_crop_health: bool,

    #[arg(long)]
    skip_trade_flow: bool,

    /// Print the opportunity list instead of writing a report.
    #[arg(long)]
    list: bool,
}

impl Args {
    fn toggles(&self) -> AnalysisToggles {
        AnalysisToggles {
            price: !self.skip_price,
            weather: !self.skip_weather,
            crop_health: !self.skip_crop_health,
            trade_flow: !self.skip_trade_flow,
        }
    }
}

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

    let args = Args::parse();

    let result = run(&args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "report run failed");
    }
    result
}

async fn run(args: &Args, settings: &sauda_core::config::Settings) -> anyhow::Result<()> {
    let catalog = CommodityCatalog::from_custom(settings.custom_commodities.as_deref());
    let commodity = catalog.require(&args.commodity)?.clone();
    let region: Region = args.region.parse()?;
    let user_type: UserType = args.user_type.parse()?;
    let time_range: TimeRange = args.time_range.parse()?;

    let service = MarketDataService::from_settings(data_source(args.offline, settings), settings);

    let req = DashboardRequest {
        commodity,
        region,
        user_type,
        time_range,
        toggles: args.toggles(),
    };

    let now = chrono::Utc::now();
    let dashboard = build_dashboard(&service, &req, now).await?;
    for warning in &dashboard.warnings {
        tracing::warn!(provider = service.provider_name(), "{warning}");
    }

    if args.list {
        for (idx, o) in dashboard.opportunities.iter().enumerate() {
            println!(
                "[{idx}] {} | {} | {} | risk {}",
                o.title, o.potential_impact, o.timeline, o.risk_level
            );
        }
        return Ok(());
    }

    let (filename, html) = render_dashboard_report(&dashboard, args.opportunity, now)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
    let path = args.out_dir.join(&filename);
    std::fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), commodity = %req.commodity.name, %region, %user_type, "report written");
    Ok(())
}

fn data_source(offline: bool, settings: &sauda_core::config::Settings) -> Box<dyn MarketDataSource> {
    if offline {
        return Box::new(OfflineSource);
    }
    match HttpMarketDataSource::from_settings(settings) {
        Ok(source) => Box::new(source),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::warn!(error = %e, "http client setup failed; using simulated data only");
            Box::new(OfflineSource)
        }
    }
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

    #[test]
    fn skip_flags_turn_sections_off() {
        let args = Args::parse_from(["sauda_cli", "--skip-weather", "--skip-trade-flow"]);
        let t = args.toggles();
        assert!(t.price && t.crop_health);
        assert!(!t.weather && !t.trade_flow);
    }

    #[test]
    fn offline_flag_selects_the_offline_source() {
        let settings = sauda_core::config::Settings::default();
        assert_eq!(data_source(true, &settings).provider_name(), "offline");
        assert_eq!(data_source(false, &settings).provider_name(), "external_http_json");
    }

    #[test]
    fn defaults_parse_into_valid_parameters() {
        let args = Args::parse_from(["sauda_cli"]);
        assert!(args.region.parse::<Region>().is_ok());
        assert!(args.user_type.parse::<UserType>().is_ok());
        assert!(args.time_range.parse::<TimeRange>().is_ok());
        assert!(CommodityCatalog::default().find(&args.commodity).is_some());
    }
}
